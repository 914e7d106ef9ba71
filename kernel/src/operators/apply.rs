//! `apply()`: run one operator against a state, atomically.
//!
//! The single entry point the search uses to execute a primitive task.
//!
//! Two-phase check:
//! 1. Execute: the operator reads the borrowed state and either returns a
//!    new state or a typed failure. The input state is never written.
//! 2. Post-apply validation: for operators that declare a
//!    [`ResourceRule`], the produced state must differ from the input by
//!    exactly the rule's net effect for the task's agent, and nowhere else.

use tracing::trace;

use crate::operators::operator::{Operator, OperatorFailure};
use crate::operators::resource::ResourceRule;
use crate::state::world_state::WorldState;
use crate::task::Task;

/// Result type for apply.
pub type ApplyResult = Result<WorldState, OperatorFailure>;

/// Apply `operator` to `state` for `task`.
///
/// # Errors
///
/// Returns [`OperatorFailure`] when a precondition fails, or
/// [`OperatorFailure::EffectContractViolation`] when a rule-declaring
/// operator produced effects other than the ones it declared.
pub fn apply(state: &WorldState, task: &Task, operator: &dyn Operator) -> ApplyResult {
    // Phase 1: execute.
    let next = match operator.apply(state, task) {
        Ok(next) => next,
        Err(failure) => {
            trace!(operator = operator.name(), task = %task, %failure, "operator rejected");
            return Err(failure);
        }
    };

    // Phase 2: validate declared effects.
    if let Some(rule) = operator.rule() {
        validate_effect(state, &next, task.agent(), operator.name(), rule)?;
    }

    Ok(next)
}

/// Check that `after` is `before` plus exactly `rule`'s net effect.
fn validate_effect(
    before: &WorldState,
    after: &WorldState,
    agent: &str,
    operator: &str,
    rule: &ResourceRule,
) -> Result<(), OperatorFailure> {
    let net = rule.net_effect();

    for (&attribute, &delta) in &net {
        let expected = i128::from(before.count(attribute, agent)) + delta;
        let actual = i128::from(after.count(attribute, agent));
        if expected != actual {
            return Err(OperatorFailure::EffectContractViolation {
                operator: operator.to_string(),
                detail: format!("{attribute}.{agent}: expected {expected}, got {actual}"),
            });
        }
    }

    if let Some(stray) = before
        .diff(after)
        .into_iter()
        .find(|c| c.agent != agent || !net.contains_key(c.attribute.as_str()))
    {
        return Err(OperatorFailure::EffectContractViolation {
            operator: operator.to_string(),
            detail: format!(
                "undeclared change {}.{}: {} -> {}",
                stray.attribute, stray.agent, stray.before, stray.after
            ),
        });
    }

    Ok(())
}
