//! Choice points: the saved frames the search backtracks into.
//!
//! A choice point is pushed whenever a task had alternatives left after
//! the one just taken. It holds everything needed to retry the task as if
//! the later work had never happened: the state before the task, the
//! agenda after it, and the plan and call-stack lengths to truncate back to.

use trellis_kernel::state::world_state::WorldState;
use trellis_kernel::task::Task;

use crate::agenda::Agenda;

/// Which list the next alternative comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alternative {
    /// Resume the method cursor at this index.
    Method(usize),
    /// Try the operator variant at this index.
    OperatorVariant(usize),
}

#[derive(Debug, Clone)]
pub struct ChoicePoint {
    pub state: WorldState,
    pub task: Task,
    /// Agenda remaining after `task`.
    pub agenda: Agenda,
    pub depth: usize,
    pub plan_len: usize,
    pub call_stack_len: usize,
    pub next: Alternative,
}

/// LIFO of pending choice points.
#[derive(Debug, Default)]
pub struct ChoiceStack {
    frames: Vec<ChoicePoint>,
    high_water: usize,
}

impl ChoiceStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: ChoicePoint) {
        self.frames.push(frame);
        self.high_water = self.high_water.max(self.frames.len());
    }

    /// The newest choice point.
    pub fn pop(&mut self) -> Option<ChoicePoint> {
        self.frames.pop()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Largest size the stack has reached.
    #[must_use]
    pub fn high_water(&self) -> usize {
        self.high_water
    }
}
