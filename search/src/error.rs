//! Planning failure.
//!
//! Every search that does not find a plan returns [`PlanningFailure`]:
//! the reason it stopped plus the statistics gathered so far. No partial
//! plan is ever returned.

use thiserror::Error;

use crate::outcome::SearchStats;
use crate::policy::PolicyError;

/// Which domain callback panicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanicStage {
    Method { task: String, method: String },
    Operator { operator: String, variant: usize },
    PruneHook { task: String },
}

impl std::fmt::Display for PanicStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Method { task, method } => write!(f, "method {method} of {task}"),
            Self::Operator { operator, variant } => write!(f, "operator {operator}#{variant}"),
            Self::PruneHook { task } => write!(f, "pruning hook at {task}"),
        }
    }
}

/// Why the search stopped without a plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    /// Every alternative was tried.
    #[error("search space exhausted")]
    Exhausted,
    /// `max_steps` dispatches were made.
    #[error("step budget of {limit} exceeded")]
    StepBudgetExceeded { limit: u64 },
    /// The wall-clock deadline passed.
    #[error("deadline exceeded")]
    DeadlineExceeded,
    /// A domain callback panicked; the search was abandoned.
    #[error("domain callback panicked: {stage}")]
    DomainPanic { stage: PanicStage },
    /// The policy was rejected before any dispatch.
    #[error("invalid policy: {0}")]
    InvalidPolicy(#[from] PolicyError),
}

/// No plan was found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("planning failed: {reason}")]
pub struct PlanningFailure {
    pub reason: FailureReason,
    pub stats: SearchStats,
}

impl PlanningFailure {
    #[must_use]
    pub fn new(reason: FailureReason, stats: SearchStats) -> Self {
        Self { reason, stats }
    }

    /// Whether the search ran out of alternatives (as opposed to budget,
    /// time or a broken domain).
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.reason == FailureReason::Exhausted
    }
}
