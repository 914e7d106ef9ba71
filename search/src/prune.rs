//! Pruning hooks.
//!
//! The search consults the hook once per task dispatch, before the task is
//! decomposed or executed. A hook sees everything the search knows about
//! the current branch and answers [`PruneDecision::Prune`] (abandon this
//! branch) or [`PruneDecision::Continue`]. No hook means never prune.
//!
//! Closures `Fn(&PruneContext<'_>) -> bool` are hooks; `true` prunes.

use std::sync::Arc;

use trellis_kernel::plan::Plan;
use trellis_kernel::state::world_state::WorldState;
use trellis_kernel::task::Task;

use crate::agenda::Agenda;

/// Hook verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PruneDecision {
    Prune,
    #[default]
    Continue,
}

impl PruneDecision {
    #[must_use]
    pub fn is_prune(self) -> bool {
        self == Self::Prune
    }
}

impl From<bool> for PruneDecision {
    fn from(prune: bool) -> Self {
        if prune {
            Self::Prune
        } else {
            Self::Continue
        }
    }
}

/// What a hook can see at a dispatch.
#[derive(Debug, Clone, Copy)]
pub struct PruneContext<'a> {
    /// State before the task runs.
    pub state: &'a WorldState,
    /// The task about to be dispatched.
    pub task: &'a Task,
    /// Tasks still outstanding after this one.
    pub agenda: &'a Agenda,
    /// Plan built so far on this branch.
    pub plan: &'a Plan,
    /// Search depth of this dispatch.
    pub depth: usize,
    /// Compound tasks expanded on this branch, oldest first.
    pub call_stack: &'a [Task],
}

impl PruneContext<'_> {
    /// Whether a compound task named `name` is an ancestor on this branch.
    #[must_use]
    pub fn on_call_stack(&self, name: &str) -> bool {
        self.call_stack.iter().any(|t| t.name() == name)
    }

    /// The newest `n` call-stack entries (fewer if the stack is shorter).
    #[must_use]
    pub fn recent_calls(&self, n: usize) -> &[Task] {
        let start = self.call_stack.len().saturating_sub(n);
        &self.call_stack[start..]
    }
}

/// A pruning predicate.
///
/// Must be deterministic for reproducible plans. Shared across searches,
/// hence `Send + Sync`.
pub trait PruneHook: Send + Sync {
    fn check(&self, ctx: &PruneContext<'_>) -> PruneDecision;
}

impl<F> PruneHook for F
where
    F: Fn(&PruneContext<'_>) -> bool + Send + Sync,
{
    fn check(&self, ctx: &PruneContext<'_>) -> PruneDecision {
        PruneDecision::from(self(ctx))
    }
}

/// Wrap a closure as a hook, pinning its argument type for inference.
#[must_use]
pub fn prune_when<F>(f: F) -> F
where
    F: Fn(&PruneContext<'_>) -> bool + Send + Sync,
{
    f
}

/// The absent hook.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverPrune;

impl PruneHook for NeverPrune {
    fn check(&self, _ctx: &PruneContext<'_>) -> PruneDecision {
        PruneDecision::Continue
    }
}

/// Prunes when any member prunes; members are asked in order and the first
/// `Prune` short-circuits.
#[derive(Clone, Default)]
pub struct AnyOf {
    hooks: Vec<Arc<dyn PruneHook>>,
}

impl AnyOf {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, hook: impl PruneHook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl std::fmt::Debug for AnyOf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnyOf")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl PruneHook for AnyOf {
    fn check(&self, ctx: &PruneContext<'_>) -> PruneDecision {
        PruneDecision::from(self.hooks.iter().any(|h| h.check(ctx).is_prune()))
    }
}

/// Prunes every dispatch deeper than `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthCeiling {
    pub limit: usize,
}

impl PruneHook for DepthCeiling {
    fn check(&self, ctx: &PruneContext<'_>) -> PruneDecision {
        PruneDecision::from(ctx.depth > self.limit)
    }
}

/// Prunes a task identical to each of the newest `window` call-stack
/// entries, once the stack holds more than `window` entries. Window 0
/// never prunes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatWindow {
    pub window: usize,
}

impl PruneHook for RepeatWindow {
    fn check(&self, ctx: &PruneContext<'_>) -> PruneDecision {
        if self.window == 0 || ctx.call_stack.len() <= self.window {
            return PruneDecision::Continue;
        }
        PruneDecision::from(ctx.recent_calls(self.window).iter().all(|t| t == ctx.task))
    }
}
