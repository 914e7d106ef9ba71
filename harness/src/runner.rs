//! Harness runner: builds a world's domain, plans, and reports.
//!
//! The runner uses ONLY public kernel and search APIs. It owns the
//! orchestration a world may not do itself: budgets, verbosity and the
//! content digests that make two runs comparable.
//!
//! # Pipeline
//!
//! ```text
//! world.domain() → validate(goals) → freeze()
//!   → world.pruning_hook(config.pruner) → Planner::plan()
//!   → plan digest + registry digest + state fingerprints → PlanReport
//! ```

use std::sync::Arc;

use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};
use trellis_kernel::domain::RegistryError;
use trellis_kernel::proof::canon::CanonError;
use trellis_kernel::proof::hash::ContentHash;
use trellis_search::error::PlanningFailure;
use trellis_search::outcome::PlanOutcome;
use trellis_search::planner::Planner;

use crate::config::{ConfigError, PlannerConfig};
use crate::contract::{PlanningWorld, WorldError};
use crate::recipe::RecipeBook;
use crate::worlds::recipe_world::RecipeWorld;

/// Error during a harness run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("world {world}: {source}")]
    World { world: String, source: WorldError },
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Canon(#[from] CanonError),
    #[error(transparent)]
    Planning(#[from] PlanningFailure),
}

impl RunError {
    /// The planning failure, if that is what stopped the run.
    #[must_use]
    pub fn planning_failure(&self) -> Option<&PlanningFailure> {
        match self {
            Self::Planning(failure) => Some(failure),
            _ => None,
        }
    }
}

/// A solved run and the digests that identify it.
#[derive(Debug, Clone)]
pub struct PlanReport {
    pub world_id: String,
    pub outcome: PlanOutcome,
    pub plan_digest: ContentHash,
    pub registry_digest: ContentHash,
    pub initial_fingerprint: ContentHash,
    pub final_fingerprint: ContentHash,
}

impl PlanReport {
    /// JSON summary: digests, the plan as task strings, final state and
    /// statistics. Events are not included.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let stats = &self.outcome.stats;
        json!({
            "world_id": self.world_id,
            "plan": self.outcome.plan.tasks().map(ToString::to_string).collect::<Vec<_>>(),
            "plan_digest": self.plan_digest.as_str(),
            "registry_digest": self.registry_digest.as_str(),
            "initial_fingerprint": self.initial_fingerprint.as_str(),
            "final_fingerprint": self.final_fingerprint.as_str(),
            "final_state": self.outcome.final_state.to_json(),
            "stats": {
                "dispatches": stats.dispatches,
                "decompositions": stats.decompositions,
                "method_failures": stats.method_failures,
                "operator_applications": stats.operator_applications,
                "operator_failures": stats.operator_failures,
                "prunes": stats.prunes,
                "depth_cutoffs": stats.depth_cutoffs,
                "lookup_misses": stats.lookup_misses,
                "backtracks": stats.backtracks,
                "max_depth": stats.max_depth,
                "max_choice_points": stats.max_choice_points,
            },
        })
    }
}

/// Plan `world` under `config`.
///
/// # Errors
///
/// [`RunError`] if the world's domain cannot be built or fails
/// validation against its goals, the config holds an invalid policy, no
/// plan is found, or a digest cannot be computed.
pub fn run_world(world: &dyn PlanningWorld, config: &PlannerConfig) -> Result<PlanReport, RunError> {
    let world_id = world.world_id().to_string();
    let domain = world.domain().map_err(|source| RunError::World {
        world: world_id.clone(),
        source,
    })?;
    let initial = world.initial_state(&config.agent, config.time);
    let goals = world.goals(&config.agent);
    domain.validate(&goals)?;
    let registry_digest = domain.digest()?;

    let mut planner = Planner::new(Arc::new(domain))
        .with_policy(config.plan_policy()?)
        .map_err(ConfigError::from)?;
    planner.set_shared_pruning_hook(world.pruning_hook(&config.pruner));

    let outcome = match planner.plan(&initial, &goals, config.verbosity()) {
        Ok(outcome) => outcome,
        Err(failure) => {
            warn!(world = %world_id, reason = %failure.reason, "no plan");
            return Err(failure.into());
        }
    };
    info!(world = %world_id, steps = outcome.plan.len(), "plan ready");

    Ok(PlanReport {
        plan_digest: outcome.plan.digest()?,
        registry_digest,
        initial_fingerprint: initial.fingerprint()?,
        final_fingerprint: outcome.final_state.fingerprint()?,
        world_id,
        outcome,
    })
}

/// Plan a recipe book's goal under `config`, pruned by a
/// [`crate::pruner::CraftingPruner`] built from `config.pruner`.
///
/// # Errors
///
/// As [`run_world`].
pub fn run_recipe_plan(book: &RecipeBook, config: &PlannerConfig) -> Result<PlanReport, RunError> {
    run_world(&RecipeWorld::new(book.clone()), config)
}
