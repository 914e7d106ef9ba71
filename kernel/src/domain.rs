//! `Domain`: the registry binding task names to methods and primitive names
//! to operators.
//!
//! Built once before search, then frozen behind an `Arc` and shared
//! read-only by every search that uses it. Overwrites are never silent:
//! registering a name twice is an error, and appending or replacing is a
//! separate, explicit call.
//!
//! Compound task names map to an ordered method list; order is the only
//! tie-breaker the search uses. Primitive names (`op_` prefix) map to one
//! operator or, when explicitly overloaded, to an ordered list of variants
//! the search backtracks across.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::method::Method;
use crate::operators::operator::Operator;
use crate::proof::canon::{canonical_json_bytes, CanonError};
use crate::proof::hash::{canonical_hash, ContentHash, HashDomain};
use crate::task::{is_primitive_name, Task};

/// Configuration-time registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("task name must not be empty")]
    EmptyTaskName,
    #[error("method list for {task} is empty")]
    EmptyMethodList { task: String },
    #[error("methods for {task} already registered; use append_methods or replace_methods")]
    DuplicateTask { task: String },
    #[error("operator {name} already registered; use register_operator_variant to overload")]
    DuplicateOperator { name: String },
    #[error("operator name {name} lacks the op_ prefix")]
    OperatorNamingViolation { name: String },
    #[error("compound task name {task} uses the op_ prefix reserved for operators")]
    CompoundNamingViolation { task: String },
    #[error("operator registered as {registered} reports its name as {declared}")]
    OperatorNameMismatch { registered: String, declared: String },
    #[error("task {task} (referenced by {referenced_by}) has no methods or operator")]
    UnknownTask { task: String, referenced_by: String },
    #[error("registry canonicalization failed: {0}")]
    Canon(#[from] CanonError),
}

/// The method and operator tables of one planning domain.
#[derive(Default)]
pub struct Domain {
    name: String,
    methods: BTreeMap<String, Vec<Arc<dyn Method>>>,
    operators: BTreeMap<String, Vec<Arc<dyn Operator>>>,
}

impl std::fmt::Debug for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let methods: BTreeMap<&str, Vec<&str>> = self
            .methods
            .iter()
            .map(|(task, list)| (task.as_str(), list.iter().map(|m| m.name()).collect()))
            .collect();
        let operators: BTreeMap<&str, usize> = self
            .operators
            .iter()
            .map(|(name, variants)| (name.as_str(), variants.len()))
            .collect();
        f.debug_struct("Domain")
            .field("name", &self.name)
            .field("methods", &methods)
            .field("operators", &operators)
            .finish()
    }
}

impl Domain {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Domain name (diagnostic).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register the ordered method list for a compound task.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateTask`] if the task already has methods;
    /// naming and empty-list errors as for every registration.
    pub fn register_methods(
        &mut self,
        task: &str,
        methods: Vec<Arc<dyn Method>>,
    ) -> Result<(), RegistryError> {
        check_compound(task, &methods)?;
        if self.methods.contains_key(task) {
            return Err(RegistryError::DuplicateTask {
                task: task.to_string(),
            });
        }
        debug!(domain = %self.name, task, count = methods.len(), "methods registered");
        self.methods.insert(task.to_string(), methods);
        Ok(())
    }

    /// Append methods after any already registered for `task`.
    ///
    /// # Errors
    ///
    /// Naming and empty-list errors.
    pub fn append_methods(
        &mut self,
        task: &str,
        methods: Vec<Arc<dyn Method>>,
    ) -> Result<(), RegistryError> {
        check_compound(task, &methods)?;
        debug!(domain = %self.name, task, count = methods.len(), "methods appended");
        self.methods
            .entry(task.to_string())
            .or_default()
            .extend(methods);
        Ok(())
    }

    /// Replace the method list for `task`, returning the previous one.
    ///
    /// # Errors
    ///
    /// Naming and empty-list errors.
    pub fn replace_methods(
        &mut self,
        task: &str,
        methods: Vec<Arc<dyn Method>>,
    ) -> Result<Option<Vec<Arc<dyn Method>>>, RegistryError> {
        check_compound(task, &methods)?;
        debug!(domain = %self.name, task, count = methods.len(), "methods replaced");
        Ok(self.methods.insert(task.to_string(), methods))
    }

    /// Register the operator for a primitive name.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateOperator`] if `name` is already bound.
    pub fn register_operator(
        &mut self,
        name: &str,
        operator: Arc<dyn Operator>,
    ) -> Result<(), RegistryError> {
        check_primitive(name, operator.as_ref())?;
        if self.operators.contains_key(name) {
            return Err(RegistryError::DuplicateOperator {
                name: name.to_string(),
            });
        }
        debug!(domain = %self.name, operator = name, "operator registered");
        self.operators.insert(name.to_string(), vec![operator]);
        Ok(())
    }

    /// Add an alternative operator for a primitive name. Variants are tried
    /// in registration order.
    ///
    /// # Errors
    ///
    /// Naming errors only.
    pub fn register_operator_variant(
        &mut self,
        name: &str,
        operator: Arc<dyn Operator>,
    ) -> Result<(), RegistryError> {
        check_primitive(name, operator.as_ref())?;
        let variants = self.operators.entry(name.to_string()).or_default();
        variants.push(operator);
        debug!(domain = %self.name, operator = name, variants = variants.len(), "operator variant registered");
        Ok(())
    }

    /// Methods for a compound task, in declared order.
    #[must_use]
    pub fn methods(&self, task: &str) -> Option<&[Arc<dyn Method>]> {
        self.methods.get(task).map(Vec::as_slice)
    }

    /// Operator variants for a primitive name, in registration order.
    #[must_use]
    pub fn operators(&self, name: &str) -> Option<&[Arc<dyn Operator>]> {
        self.operators.get(name).map(Vec::as_slice)
    }

    /// Whether `name` resolves to anything.
    #[must_use]
    pub fn knows(&self, name: &str) -> bool {
        self.methods.contains_key(name) || self.operators.contains_key(name)
    }

    /// Sorted compound task names.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    /// Sorted primitive names.
    pub fn operator_names(&self) -> impl Iterator<Item = &str> {
        self.operators.keys().map(String::as_str)
    }

    /// Fail fast if any goal, or any name a registered method declares it
    /// may emit, resolves to nothing.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownTask`] naming the first unresolved task in
    /// goal order, then sorted method order.
    pub fn validate(&self, goals: &[Task]) -> Result<(), RegistryError> {
        for goal in goals {
            if !self.knows(goal.name()) {
                return Err(RegistryError::UnknownTask {
                    task: goal.name().to_string(),
                    referenced_by: "goal".to_string(),
                });
            }
        }
        for (task, methods) in &self.methods {
            for method in methods {
                if let Some(missing) = method.emits().into_iter().find(|n| !self.knows(n)) {
                    return Err(RegistryError::UnknownTask {
                        task: missing,
                        referenced_by: format!("{task}/{}", method.name()),
                    });
                }
            }
        }
        Ok(())
    }

    /// Content digest of the registry's names and order.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Canon`] if canonical serialization fails.
    pub fn digest(&self) -> Result<ContentHash, RegistryError> {
        let methods: serde_json::Map<String, serde_json::Value> = self
            .methods
            .iter()
            .map(|(task, list)| {
                let names: Vec<serde_json::Value> =
                    list.iter().map(|m| serde_json::Value::from(m.name())).collect();
                (task.clone(), serde_json::Value::Array(names))
            })
            .collect();
        let operators: serde_json::Map<String, serde_json::Value> = self
            .operators
            .iter()
            .map(|(name, variants)| {
                let count = u64::try_from(variants.len()).unwrap_or(u64::MAX);
                (name.clone(), serde_json::Value::from(count))
            })
            .collect();
        let value = serde_json::json!({
            "methods": methods,
            "name": self.name,
            "operators": operators,
        });
        let bytes = canonical_json_bytes(&value)?;
        Ok(canonical_hash(HashDomain::DomainRegistry, &bytes))
    }

    /// Freeze for sharing across searches.
    #[must_use]
    pub fn freeze(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// All names the registry resolves, sorted.
    #[must_use]
    pub fn known_names(&self) -> BTreeSet<&str> {
        self.task_names().chain(self.operator_names()).collect()
    }
}

fn check_compound(task: &str, methods: &[Arc<dyn Method>]) -> Result<(), RegistryError> {
    if task.is_empty() {
        return Err(RegistryError::EmptyTaskName);
    }
    if is_primitive_name(task) {
        return Err(RegistryError::CompoundNamingViolation {
            task: task.to_string(),
        });
    }
    if methods.is_empty() {
        return Err(RegistryError::EmptyMethodList {
            task: task.to_string(),
        });
    }
    Ok(())
}

fn check_primitive(name: &str, operator: &dyn Operator) -> Result<(), RegistryError> {
    if name.is_empty() {
        return Err(RegistryError::EmptyTaskName);
    }
    if !is_primitive_name(name) {
        return Err(RegistryError::OperatorNamingViolation {
            name: name.to_string(),
        });
    }
    if operator.name() != name {
        return Err(RegistryError::OperatorNameMismatch {
            registered: name.to_string(),
            declared: operator.name().to_string(),
        });
    }
    Ok(())
}
