//! `SearchEvent`: the ordered audit log of a traced search.
//!
//! Recorded only at [`crate::policy::Verbosity::Trace`]. The log is the
//! decision surface of the search: replaying it explains every dispatch,
//! every rejected alternative and every backtrack in order.

use trellis_kernel::operators::operator::OperatorFailure;
use trellis_kernel::task::Task;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// A task was taken off the agenda.
    Dispatch { step: u64, depth: usize, task: Task },
    /// The pruning hook rejected the task.
    Pruned { depth: usize, task: Task },
    /// The depth ceiling cut the task off.
    DepthCutoff { depth: usize, task: Task },
    /// No methods or operators are registered for the task name.
    LookupMiss { task: Task },
    /// A method declined (returned no decomposition).
    MethodDeclined { task: Task, method: String },
    /// A method expanded the task.
    Decomposed {
        task: Task,
        method: String,
        subtasks: Vec<Task>,
    },
    /// An operator variant rejected the task.
    OperatorRejected {
        task: Task,
        variant: usize,
        failure: OperatorFailure,
    },
    /// An operator variant applied; the plan grew to `plan_len`.
    Applied {
        task: Task,
        variant: usize,
        plan_len: usize,
    },
    /// A choice point was resumed.
    Backtrack {
        task: Task,
        depth: usize,
        plan_len: usize,
    },
    /// The agenda emptied.
    Solved { plan_len: usize },
}

impl std::fmt::Display for SearchEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dispatch { step, depth, task } => {
                write!(f, "step {step} depth {depth}: {task}")
            }
            Self::Pruned { depth, task } => write!(f, "pruned {task} at depth {depth}"),
            Self::DepthCutoff { depth, task } => write!(f, "depth cutoff {task} at {depth}"),
            Self::LookupMiss { task } => write!(f, "nothing registered for {task}"),
            Self::MethodDeclined { task, method } => write!(f, "{method} declined {task}"),
            Self::Decomposed {
                task,
                method,
                subtasks,
            } => {
                write!(f, "{method} expanded {task} into [")?;
                for (i, sub) in subtasks.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{sub}")?;
                }
                f.write_str("]")
            }
            Self::OperatorRejected {
                task,
                variant,
                failure,
            } => write!(f, "{task} variant {variant} rejected: {failure}"),
            Self::Applied {
                task,
                variant,
                plan_len,
            } => write!(f, "applied {task} variant {variant}, plan length {plan_len}"),
            Self::Backtrack {
                task,
                depth,
                plan_len,
            } => write!(f, "backtrack to {task} at depth {depth}, plan length {plan_len}"),
            Self::Solved { plan_len } => write!(f, "solved with {plan_len} steps"),
        }
    }
}
