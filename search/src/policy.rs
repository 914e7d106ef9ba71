//! Search policy: budgets and verbosity.

use std::time::Duration;

use thiserror::Error;

/// Stopping conditions beyond the pruning hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanPolicy {
    /// Built-in depth ceiling, independent of any hook. A dispatch at this
    /// depth or deeper is cut off and backtracked.
    pub max_depth: usize,
    /// Hard cap on task dispatches.
    pub max_steps: u64,
    /// Wall-clock limit. Off by default: a deadline makes results depend
    /// on machine speed.
    pub deadline: Option<Duration>,
}

impl PlanPolicy {
    /// Reject budgets that could never admit a dispatch.
    ///
    /// # Errors
    ///
    /// Returns the first zero budget found.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.max_depth == 0 {
            return Err(PolicyError::ZeroDepth);
        }
        if self.max_steps == 0 {
            return Err(PolicyError::ZeroStepBudget);
        }
        if self.deadline == Some(Duration::ZERO) {
            return Err(PolicyError::ZeroDeadline);
        }
        Ok(())
    }
}

impl Default for PlanPolicy {
    fn default() -> Self {
        Self {
            max_depth: 1000,
            max_steps: 1_000_000,
            deadline: None,
        }
    }
}

/// Invalid policy configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("max_depth must be at least 1")]
    ZeroDepth,
    #[error("max_steps must be at least 1")]
    ZeroStepBudget,
    #[error("deadline must be positive when set")]
    ZeroDeadline,
}

/// How much a search reports about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// No log events.
    #[default]
    Silent,
    /// `info!` at start and end.
    Summary,
    /// `debug!` per dispatch and backtrack, plus the event log in the
    /// outcome.
    Trace,
}

impl Verbosity {
    #[must_use]
    pub fn summary(self) -> bool {
        self >= Self::Summary
    }

    #[must_use]
    pub fn trace(self) -> bool {
        self >= Self::Trace
    }
}
