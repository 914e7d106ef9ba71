//! World contract: the minimal trait a planning world must implement.
//!
//! Worlds provide domain data: the method and operator tables, an initial
//! state, goals and, optionally, the pruning predicate their recursion
//! needs. Worlds may NOT run searches or choose budgets; those are runner
//! concerns.

use std::sync::Arc;

use thiserror::Error;
use trellis_kernel::domain::{Domain, RegistryError};
use trellis_kernel::state::world_state::WorldState;
use trellis_kernel::task::Task;
use trellis_search::prune::{NeverPrune, PruneHook};

use crate::config::PrunerSettings;
use crate::recipe::RecipeError;

/// Typed failure building a world's domain.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Recipe(#[from] RecipeError),
}

pub trait PlanningWorld {
    /// Unique world identifier (e.g., `"wood_chop"`).
    fn world_id(&self) -> &str;

    /// Build the world's registry.
    ///
    /// # Errors
    ///
    /// [`WorldError`] if the world's tables are inconsistent.
    fn domain(&self) -> Result<Domain, WorldError>;

    /// The initial state for `agent` with `time` budget.
    fn initial_state(&self, agent: &str, time: u64) -> WorldState;

    /// The goal tasks for `agent`.
    fn goals(&self, agent: &str) -> Vec<Task>;

    /// The world's pruning predicate. Defaults to never pruning.
    fn pruning_hook(&self, settings: &PrunerSettings) -> Arc<dyn PruneHook> {
        let _ = settings;
        Arc::new(NeverPrune)
    }
}
