//! Plans: the ordered grounded primitive tasks a search produced.

use crate::proof::canon::{canonical_json_bytes, CanonError};
use crate::proof::hash::{canonical_hash, ContentHash, HashDomain};
use crate::state::world_state::WorldState;
use crate::task::Task;

/// One executed primitive task and the state it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    pub task: Task,
    pub state_after: WorldState,
}

/// Ordered sequence of plan steps. Empty is a valid plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    steps: Vec<PlanStep>,
}

impl Plan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step.
    pub fn push(&mut self, task: Task, state_after: WorldState) {
        self.steps.push(PlanStep { task, state_after });
    }

    /// Drop steps beyond `len`. Used when the search resumes a choice point.
    pub fn truncate(&mut self, len: usize) {
        self.steps.truncate(len);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    #[must_use]
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// The grounded tasks in order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.steps.iter().map(|s| &s.task)
    }

    /// Task names in order; handy for assertions and log lines.
    #[must_use]
    pub fn task_names(&self) -> Vec<&str> {
        self.tasks().map(Task::name).collect()
    }

    /// State after the last step, if any.
    #[must_use]
    pub fn last_state(&self) -> Option<&WorldState> {
        self.steps.last().map(|s| &s.state_after)
    }

    /// Canonical digest over the tasks and each step's resulting state.
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if canonical serialization fails.
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        let steps: Vec<serde_json::Value> = self
            .steps
            .iter()
            .map(|s| {
                serde_json::json!({
                    "state_after": s.state_after.to_json(),
                    "task": s.task.to_json(),
                })
            })
            .collect();
        let bytes = canonical_json_bytes(&serde_json::Value::Array(steps))?;
        Ok(canonical_hash(HashDomain::Plan, &bytes))
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[")?;
        for (i, task) in self.tasks().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{task}")?;
        }
        f.write_str("]")
    }
}
