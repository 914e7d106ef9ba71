//! Decomposition engine: lazy, ordered iteration over a task's methods.
//!
//! A [`MethodCursor`] walks a compound task's registered methods in
//! declared order, stopping at the first that returns sub-tasks. Its
//! position is saved in a choice point so the search can resume with the
//! next method after a deeper failure.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use trellis_kernel::method::Method;
use trellis_kernel::state::world_state::WorldState;
use trellis_kernel::task::Task;

/// A successful decomposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// Index of the method that produced it.
    pub method_index: usize,
    /// Ordered sub-tasks; empty means the task is already satisfied.
    pub subtasks: Vec<Task>,
}

/// A method panicked while decomposing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodPanic {
    pub method_index: usize,
    pub method: String,
}

/// Cursor over one task's method list.
pub struct MethodCursor<'d> {
    methods: &'d [Arc<dyn Method>],
    next: usize,
    declined: u64,
}

impl<'d> MethodCursor<'d> {
    /// Start before the first method.
    #[must_use]
    pub fn new(methods: &'d [Arc<dyn Method>]) -> Self {
        Self::resume(methods, 0)
    }

    /// Resume at `position` (a saved cursor).
    #[must_use]
    pub fn resume(methods: &'d [Arc<dyn Method>], position: usize) -> Self {
        Self {
            methods,
            next: position,
            declined: 0,
        }
    }

    /// Index of the next method to try.
    #[must_use]
    pub fn position(&self) -> usize {
        self.next
    }

    /// Whether any method is left to try.
    #[must_use]
    pub fn has_remaining(&self) -> bool {
        self.next < self.methods.len()
    }

    /// Methods that returned `None` through this cursor.
    #[must_use]
    pub fn declined(&self) -> u64 {
        self.declined
    }

    /// Invoke methods from the current position until one succeeds.
    ///
    /// Returns `Ok(None)` when the list is exhausted.
    ///
    /// # Errors
    ///
    /// [`MethodPanic`] if a method panics. The cursor is left past the
    /// panicking method.
    pub fn next_decomposition(
        &mut self,
        state: &WorldState,
        task: &Task,
    ) -> Result<Option<Expansion>, MethodPanic> {
        while let Some(method) = self.methods.get(self.next) {
            let method_index = self.next;
            self.next += 1;
            let result = catch_unwind(AssertUnwindSafe(|| method.decompose(state, task)));
            match result {
                Ok(Some(subtasks)) => {
                    return Ok(Some(Expansion {
                        method_index,
                        subtasks,
                    }))
                }
                Ok(None) => self.declined += 1,
                Err(_) => {
                    return Err(MethodPanic {
                        method_index,
                        method: method.name().to_string(),
                    })
                }
            }
        }
        Ok(None)
    }
}
