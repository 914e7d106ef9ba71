//! `RecipeWorld`: a [`RecipeBook`] as a planning world.

use std::sync::Arc;

use trellis_kernel::domain::Domain;
use trellis_kernel::state::world_state::WorldState;
use trellis_kernel::task::Task;
use trellis_search::prune::PruneHook;

use crate::config::PrunerSettings;
use crate::contract::{PlanningWorld, WorldError};
use crate::pruner::CraftingPruner;
use crate::recipe::RecipeBook;

#[derive(Debug, Clone)]
pub struct RecipeWorld {
    book: RecipeBook,
}

impl RecipeWorld {
    #[must_use]
    pub fn new(book: RecipeBook) -> Self {
        Self { book }
    }

    #[must_use]
    pub fn book(&self) -> &RecipeBook {
        &self.book
    }
}

impl PlanningWorld for RecipeWorld {
    fn world_id(&self) -> &str {
        "recipes"
    }

    fn domain(&self) -> Result<Domain, WorldError> {
        Ok(self.book.build_domain()?)
    }

    fn initial_state(&self, agent: &str, time: u64) -> WorldState {
        self.book.initial_state(agent, time)
    }

    fn goals(&self, agent: &str) -> Vec<Task> {
        self.book.goals(agent)
    }

    fn pruning_hook(&self, settings: &PrunerSettings) -> Arc<dyn PruneHook> {
        Arc::new(CraftingPruner::from_settings(&self.book, settings))
    }
}
