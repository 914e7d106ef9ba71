//! `RecipeBook`: a crafting domain described as data.
//!
//! A book lists items, tools, an initial inventory, a goal inventory and
//! recipes (`Produces`, `Requires`, `Consumes`, `Time`). From it the
//! harness builds:
//!
//! - one declarative operator `op_<recipe>` per recipe (spaces in recipe
//!   names become underscores);
//! - one `produce_<item>` task per produced item, whose methods (one per
//!   recipe producing it) are ordered by recipe time, fastest first, and
//!   by position in the book on equal times. Each method expands to
//!   `have_enough` for every required item, then for every consumed item
//!   in crafting order, then the recipe's operator;
//! - the stock `have_enough` / `produce` methods from [`crate::stock`].
//!
//! Recipes must produce exactly one kind of item. Every map in a book
//! keeps the order it was written in: goals are pursued one after the
//! other in that order, and a different order can change whether a plan
//! exists.

use std::collections::BTreeSet;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;
use trellis_kernel::domain::{Domain, RegistryError};
use trellis_kernel::method::method_fn;
use trellis_kernel::operators::resource::{ResourceOperator, ResourceRule};
use trellis_kernel::proof::canon::{canonical_json_bytes, CanonError};
use trellis_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};
use trellis_kernel::state::world_state::{WorldState, TIME};
use trellis_kernel::task::{Task, PRIMITIVE_PREFIX};

use crate::stock::{have_enough, produce_task_name, register_stock_methods, HAVE_ENOUGH};

/// Consumed ingredients are gathered in this order unless the book says
/// otherwise: refined goods before the raw materials they are made from.
const DEFAULT_CRAFTING_ORDER: [&str; 7] = ["ingot", "coal", "ore", "cobble", "stick", "plank", "wood"];

fn default_crafting_order() -> Vec<String> {
    DEFAULT_CRAFTING_ORDER.iter().map(ToString::to_string).collect()
}

#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("recipe book is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("recipe {recipe} produces nothing")]
    EmptyProduces { recipe: String },
    #[error("recipe {recipe} produces more than one item")]
    MultipleProducts { recipe: String },
    #[error("{context} names unknown item {item}")]
    UnknownItem { context: String, item: String },
    #[error("item name {item} is reserved")]
    ReservedName { item: String },
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Canon(#[from] CanonError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Recipe {
    pub produces: IndexMap<String, u64>,
    #[serde(default)]
    pub requires: IndexMap<String, u64>,
    #[serde(default)]
    pub consumes: IndexMap<String, u64>,
    pub time: u64,
}

impl Recipe {
    /// The single `(item, quantity)` this recipe produces.
    #[must_use]
    pub fn product(&self) -> Option<(&str, u64)> {
        self.produces.iter().next().map(|(item, &n)| (item.as_str(), n))
    }

    fn rule(&self) -> ResourceRule {
        let mut rule = ResourceRule::new(self.time);
        for (item, &n) in &self.requires {
            rule = rule.requires(item, n);
        }
        for (item, &n) in &self.consumes {
            rule = rule.consumes(item, n);
        }
        for (item, &n) in &self.produces {
            rule = rule.produces(item, n);
        }
        rule
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct RecipeBook {
    pub items: Vec<String>,
    pub tools: Vec<String>,
    #[serde(default)]
    pub initial: IndexMap<String, u64>,
    #[serde(default)]
    pub goal: IndexMap<String, u64>,
    pub recipes: IndexMap<String, Recipe>,
    #[serde(default = "default_crafting_order")]
    pub crafting_order: Vec<String>,
}

impl RecipeBook {
    /// Parse and validate a book.
    ///
    /// # Errors
    ///
    /// [`RecipeError::Parse`] on malformed JSON or an unknown key, or a
    /// validation error.
    pub fn from_json_str(json: &str) -> Result<Self, RecipeError> {
        let book: Self = serde_json::from_str(json)?;
        book.validate()?;
        Ok(book)
    }

    /// Read, parse and validate a book file.
    ///
    /// # Errors
    ///
    /// [`RecipeError::Io`] if the file cannot be read, then as
    /// [`RecipeBook::from_json_str`].
    pub fn load(path: &Path) -> Result<Self, RecipeError> {
        let json = std::fs::read_to_string(path).map_err(|source| RecipeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Check every recipe produces one item and every name is declared.
    ///
    /// # Errors
    ///
    /// The first problem found, in book order.
    pub fn validate(&self) -> Result<(), RecipeError> {
        let known: BTreeSet<&str> = self.items.iter().chain(&self.tools).map(String::as_str).collect();
        if known.contains(TIME) {
            return Err(RecipeError::ReservedName { item: TIME.into() });
        }
        let check = |context: &str, item: &str| {
            if known.contains(item) {
                Ok(())
            } else {
                Err(RecipeError::UnknownItem {
                    context: context.to_string(),
                    item: item.to_string(),
                })
            }
        };

        for (name, recipe) in &self.recipes {
            match recipe.produces.len() {
                0 => return Err(RecipeError::EmptyProduces { recipe: name.clone() }),
                1 => {}
                _ => return Err(RecipeError::MultipleProducts { recipe: name.clone() }),
            }
            let context = format!("recipe {name}");
            for item in recipe
                .produces
                .keys()
                .chain(recipe.requires.keys())
                .chain(recipe.consumes.keys())
            {
                check(&context, item.as_str())?;
            }
        }
        for item in self.initial.keys() {
            check("Initial", item.as_str())?;
        }
        for item in self.goal.keys() {
            check("Goal", item.as_str())?;
        }
        Ok(())
    }

    #[must_use]
    pub fn is_tool(&self, item: &str) -> bool {
        self.tools.iter().any(|t| t == item)
    }

    /// Operator name for a recipe: `op_` plus the name with spaces
    /// replaced by underscores.
    #[must_use]
    pub fn operator_name(recipe: &str) -> String {
        format!("{PRIMITIVE_PREFIX}{}", recipe.replace(' ', "_"))
    }

    /// `have_enough` demands a recipe expands to, in order: requirements
    /// as written, then consumed items in crafting order, then any consumed
    /// items the crafting order does not list, as written.
    #[must_use]
    pub fn demands(&self, recipe: &Recipe) -> Vec<(String, u64)> {
        let mut demands: Vec<(String, u64)> = recipe
            .requires
            .iter()
            .map(|(item, &n)| (item.clone(), n))
            .collect();
        for item in &self.crafting_order {
            if let Some(&n) = recipe.consumes.get(item) {
                demands.push((item.clone(), n));
            }
        }
        for (item, &n) in &recipe.consumes {
            if !self.crafting_order.contains(item) {
                demands.push((item.clone(), n));
            }
        }
        demands
    }

    /// Build the planning domain.
    ///
    /// # Errors
    ///
    /// [`RecipeError::Registry`] if two recipes map to the same operator
    /// name, or a validation error.
    pub fn build_domain(&self) -> Result<Domain, RecipeError> {
        self.validate()?;
        let mut domain = Domain::new("recipes");

        for (name, recipe) in &self.recipes {
            let op = Self::operator_name(name);
            domain.register_operator(&op, ResourceOperator::new(&op, recipe.rule()).shared())?;
        }

        // Stable: recipes with equal (item, time) keep book order.
        let mut ordered: Vec<(&str, u64, &str, &Recipe)> = self
            .recipes
            .iter()
            .filter_map(|(name, recipe)| {
                recipe
                    .product()
                    .map(|(item, _)| (item, recipe.time, name.as_str(), recipe))
            })
            .collect();
        ordered.sort_by_key(|&(item, time, _, _)| (item, time));

        let mut products: Vec<&str> = Vec::new();
        for (item, _, name, recipe) in ordered {
            let demands = self.demands(recipe);
            let op = Self::operator_name(name);
            let mut emits = vec![op.clone()];
            if !demands.is_empty() {
                emits.push(HAVE_ENOUGH.to_string());
            }
            let method = method_fn(&name.replace(' ', "_"), move |_, task| {
                let agent = task.agent();
                let mut subtasks: Vec<Task> = demands
                    .iter()
                    .map(|(needed, n)| have_enough(agent, needed, *n))
                    .collect();
                subtasks.push(Task::new(&op, agent));
                Some(subtasks)
            })
            .emitting(emits)
            .shared();
            domain.append_methods(&produce_task_name(item), vec![method])?;
            if products.last() != Some(&item) {
                products.push(item);
            }
        }

        register_stock_methods(&mut domain, products)?;
        debug!(
            recipes = self.recipes.len(),
            tasks = domain.task_names().count(),
            "recipe domain built"
        );
        Ok(domain)
    }

    /// Every item and tool declared at zero, then the initial inventory,
    /// then the time budget.
    #[must_use]
    pub fn initial_state(&self, agent: &str, time: u64) -> WorldState {
        let mut state = WorldState::new();
        for item in self.items.iter().chain(&self.tools) {
            state.declare(item, agent);
        }
        for (item, &n) in &self.initial {
            state.set_count(item, agent, n);
        }
        state.set_count(TIME, agent, time);
        state
    }

    /// One `have_enough` goal per goal item, in book order.
    #[must_use]
    pub fn goals(&self, agent: &str) -> Vec<Task> {
        self.goal
            .iter()
            .map(|(item, &n)| have_enough(agent, item, n))
            .collect()
    }

    /// Content digest of the book. Maps are hashed as ordered pairs, so
    /// reordering goals or recipes changes the digest.
    ///
    /// # Errors
    ///
    /// [`RecipeError::Canon`] if canonical serialization fails.
    pub fn digest(&self) -> Result<ContentHash, RecipeError> {
        let recipes: Vec<Value> = self
            .recipes
            .iter()
            .map(|(name, recipe)| {
                json!([name, {
                    "produces": pairs(&recipe.produces),
                    "requires": pairs(&recipe.requires),
                    "consumes": pairs(&recipe.consumes),
                    "time": recipe.time,
                }])
            })
            .collect();
        let value = json!({
            "items": self.items,
            "tools": self.tools,
            "initial": pairs(&self.initial),
            "goal": pairs(&self.goal),
            "recipes": recipes,
            "crafting_order": self.crafting_order,
        });
        let bytes = canonical_json_bytes(&value)?;
        Ok(canonical_hash(HashDomain::RecipeBook, &bytes))
    }
}

fn pairs(map: &IndexMap<String, u64>) -> Value {
    Value::Array(map.iter().map(|(item, n)| json!([item, n])).collect())
}
