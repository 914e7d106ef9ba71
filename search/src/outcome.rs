//! Successful search results and the statistics every search reports.

use trellis_kernel::plan::Plan;
use trellis_kernel::state::world_state::WorldState;

use crate::event::SearchEvent;

/// Counters gathered during one search, success or failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Tasks taken off the agenda.
    pub dispatches: u64,
    /// Methods that expanded a task.
    pub decompositions: u64,
    /// Methods that declined.
    pub method_failures: u64,
    /// Operator variants that applied.
    pub operator_applications: u64,
    /// Operator variants whose preconditions failed.
    pub operator_failures: u64,
    /// Dispatches rejected by the pruning hook.
    pub prunes: u64,
    /// Dispatches cut off by the policy depth ceiling.
    pub depth_cutoffs: u64,
    /// Task names with no registration.
    pub lookup_misses: u64,
    /// Choice points resumed.
    pub backtracks: u64,
    /// Deepest dispatch.
    pub max_depth: usize,
    /// Largest number of pending choice points.
    pub max_choice_points: usize,
}

impl std::fmt::Display for SearchStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} dispatches, {} backtracks, {} prunes, {} operator applications, max depth {}",
            self.dispatches,
            self.backtracks,
            self.prunes,
            self.operator_applications,
            self.max_depth
        )
    }
}

/// A plan and what the search did to find it.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub plan: Plan,
    /// State after the last step; the initial state for an empty plan.
    pub final_state: WorldState,
    pub stats: SearchStats,
    /// Audit log; empty unless the search ran at trace verbosity.
    pub events: Vec<SearchEvent>,
}
