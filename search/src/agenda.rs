//! `Agenda`: the persistent list of outstanding tasks.
//!
//! A cons list behind `Arc`: popping the front and prepending sub-tasks
//! share the tail with every choice point that saved it, so saving an
//! agenda is O(1) and backtracking never copies task lists.

use std::sync::Arc;

use trellis_kernel::task::Task;

struct Node {
    task: Task,
    next: Option<Arc<Node>>,
}

/// Outstanding tasks, front first.
#[derive(Clone, Default)]
pub struct Agenda {
    head: Option<Arc<Node>>,
    len: usize,
}

impl Agenda {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an agenda holding `tasks` in order.
    #[must_use]
    pub fn from_tasks(tasks: &[Task]) -> Self {
        Self::new().prepend(tasks)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// The next task to dispatch.
    #[must_use]
    pub fn first(&self) -> Option<&Task> {
        self.head.as_deref().map(|node| &node.task)
    }

    /// Split into the first task and the remaining agenda. `self` is left
    /// intact.
    #[must_use]
    pub fn pop(&self) -> Option<(Task, Self)> {
        let node = self.head.as_deref()?;
        let rest = Self {
            head: node.next.clone(),
            len: self.len - 1,
        };
        Some((node.task.clone(), rest))
    }

    /// A new agenda with `tasks` in front of this one, in order.
    #[must_use]
    pub fn prepend(&self, tasks: &[Task]) -> Self {
        let mut head = self.head.clone();
        for task in tasks.iter().rev() {
            head = Some(Arc::new(Node {
                task: task.clone(),
                next: head,
            }));
        }
        Self {
            head,
            len: self.len + tasks.len(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        std::iter::successors(self.head.as_deref(), |node| node.next.as_deref())
            .map(|node| &node.task)
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<Task> {
        self.iter().cloned().collect()
    }
}

impl std::fmt::Debug for Agenda {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

// Unlink iteratively; the default recursive drop overflows on long lists.
impl Drop for Agenda {
    fn drop(&mut self) {
        let mut next = self.head.take();
        while let Some(node) = next {
            match Arc::try_unwrap(node) {
                Ok(mut node) => next = node.next.take(),
                Err(_) => break,
            }
        }
    }
}
