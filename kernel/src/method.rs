//! Methods: candidate decompositions of a compound task.
//!
//! A method reads the state and either proposes an ordered list of
//! sub-tasks (`Some`, possibly empty) or declines (`None`). Methods never
//! mutate state.

use std::sync::Arc;

use crate::state::world_state::WorldState;
use crate::task::Task;

/// One decomposition alternative for a compound task.
pub trait Method: Send + Sync {
    /// Diagnostic name (shown in traces and registry digests).
    fn name(&self) -> &str;

    /// Propose sub-tasks for `task` in `state`.
    ///
    /// `None` is the failure marker. `Some(vec![])` means the task is
    /// already satisfied.
    fn decompose(&self, state: &WorldState, task: &Task) -> Option<Vec<Task>>;

    /// Task names this method may emit. Used by registry validation to
    /// catch unregistered names before search; may be left empty.
    fn emits(&self) -> Vec<String> {
        Vec::new()
    }
}

type DecomposeFn = dyn Fn(&WorldState, &Task) -> Option<Vec<Task>> + Send + Sync;

/// A [`Method`] backed by a closure.
pub struct FnMethod {
    name: String,
    emits: Vec<String>,
    decompose: Box<DecomposeFn>,
}

impl FnMethod {
    /// Declare which task names this method may emit.
    #[must_use]
    pub fn emitting<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.emits = names.into_iter().map(Into::into).collect();
        self
    }

    /// Finish building, as the shared handle the registry stores.
    #[must_use]
    pub fn shared(self) -> Arc<dyn Method> {
        Arc::new(self)
    }
}

impl std::fmt::Debug for FnMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMethod")
            .field("name", &self.name)
            .field("emits", &self.emits)
            .finish_non_exhaustive()
    }
}

impl Method for FnMethod {
    fn name(&self) -> &str {
        &self.name
    }

    fn decompose(&self, state: &WorldState, task: &Task) -> Option<Vec<Task>> {
        (self.decompose)(state, task)
    }

    fn emits(&self) -> Vec<String> {
        self.emits.clone()
    }
}

/// Build a closure-backed method.
#[must_use]
pub fn method_fn<F>(name: &str, f: F) -> FnMethod
where
    F: Fn(&WorldState, &Task) -> Option<Vec<Task>> + Send + Sync + 'static,
{
    FnMethod {
        name: name.to_string(),
        emits: Vec::new(),
        decompose: Box::new(f),
    }
}
