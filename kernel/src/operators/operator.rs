//! The operator contract and its typed failure.

use std::sync::Arc;

use thiserror::Error;

use crate::operators::resource::ResourceRule;
use crate::state::world_state::WorldState;
use crate::task::Task;

/// Typed failure for operator application. The input state is never
/// modified when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperatorFailure {
    /// A required (not consumed) resource is below its declared minimum.
    #[error("{attribute}: requires {required}, have {available}")]
    RequirementNotMet {
        attribute: String,
        required: u64,
        available: u64,
    },
    /// A consumed resource is below the amount the operator would take.
    #[error("{attribute}: consumes {needed}, have {available}")]
    InsufficientResource {
        attribute: String,
        needed: u64,
        available: u64,
    },
    /// The time budget is below the operator's cost.
    #[error("time: costs {needed}, have {available}")]
    InsufficientTime { needed: u64, available: u64 },
    /// A domain-specific precondition (custom operators).
    #[error("precondition not met: {detail}")]
    PreconditionNotMet { detail: String },
    /// Producing would overflow the attribute's counter.
    #[error("{attribute}: production overflows")]
    ProductionOverflow { attribute: String },
    /// The operator's effects did not match its declared rule.
    #[error("effect contract violated by {operator}: {detail}")]
    EffectContractViolation { operator: String, detail: String },
}

impl OperatorFailure {
    /// Whether this is an ordinary planning outcome (a precondition) rather
    /// than a broken operator.
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::RequirementNotMet { .. }
                | Self::InsufficientResource { .. }
                | Self::InsufficientTime { .. }
                | Self::PreconditionNotMet { .. }
        )
    }
}

/// A primitive state transition: precondition check, consumption,
/// production, and time debit as one atomic step.
///
/// # Contract
///
/// - `apply` borrows the state; on failure nothing observable changed.
/// - On success it returns a new state with the full effect applied.
/// - Operators that declare a [`ResourceRule`] through [`Operator::rule`]
///   have their effects checked against it by [`super::apply::apply`].
pub trait Operator: Send + Sync {
    /// The primitive task name this operator executes.
    fn name(&self) -> &str;

    /// Execute against `state` for `task`.
    ///
    /// # Errors
    ///
    /// Returns [`OperatorFailure`] when a precondition fails.
    fn apply(&self, state: &WorldState, task: &Task) -> Result<WorldState, OperatorFailure>;

    /// The declarative rule, if this operator has one.
    fn rule(&self) -> Option<&ResourceRule> {
        None
    }
}

type ApplyFn = dyn Fn(&WorldState, &Task) -> Result<WorldState, OperatorFailure> + Send + Sync;

/// An [`Operator`] backed by a closure, for effects a [`ResourceRule`]
/// cannot express (flags, derived quantities).
pub struct FnOperator {
    name: String,
    apply: Box<ApplyFn>,
}

impl FnOperator {
    /// Finish building, as the shared handle the registry stores.
    #[must_use]
    pub fn shared(self) -> Arc<dyn Operator> {
        Arc::new(self)
    }
}

impl std::fmt::Debug for FnOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnOperator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Operator for FnOperator {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, state: &WorldState, task: &Task) -> Result<WorldState, OperatorFailure> {
        (self.apply)(state, task)
    }
}

/// Build a closure-backed operator. The closure receives the borrowed
/// state and must clone it (`state.snapshot()`) before writing.
#[must_use]
pub fn operator_fn<F>(name: &str, f: F) -> FnOperator
where
    F: Fn(&WorldState, &Task) -> Result<WorldState, OperatorFailure> + Send + Sync + 'static,
{
    FnOperator {
        name: name.to_string(),
        apply: Box::new(f),
    }
}
