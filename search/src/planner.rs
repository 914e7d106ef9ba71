//! `Planner`: a frozen domain, a pruning hook and a policy, ready to plan.
//!
//! Cheap to clone and `Send + Sync`; every call to [`Planner::plan`] runs
//! an independent search with its own state, agenda and call stack.

use std::sync::Arc;

use trellis_kernel::domain::Domain;
use trellis_kernel::state::world_state::WorldState;
use trellis_kernel::task::Task;

use crate::error::PlanningFailure;
use crate::outcome::PlanOutcome;
use crate::policy::{PlanPolicy, PolicyError, Verbosity};
use crate::prune::{NeverPrune, PruneHook};
use crate::search::seek_plan;

#[derive(Clone)]
pub struct Planner {
    domain: Arc<Domain>,
    hook: Arc<dyn PruneHook>,
    policy: PlanPolicy,
}

impl std::fmt::Debug for Planner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Planner")
            .field("domain", &self.domain.name())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Planner {
    /// A planner with no pruning hook and the default policy.
    #[must_use]
    pub fn new(domain: Arc<Domain>) -> Self {
        Self {
            domain,
            hook: Arc::new(NeverPrune),
            policy: PlanPolicy::default(),
        }
    }

    /// Install the pruning hook, replacing any previous one.
    pub fn set_pruning_hook(&mut self, hook: impl PruneHook + 'static) {
        self.hook = Arc::new(hook);
    }

    /// Install an already shared hook.
    pub fn set_shared_pruning_hook(&mut self, hook: Arc<dyn PruneHook>) {
        self.hook = hook;
    }

    /// Builder form of [`Planner::set_pruning_hook`].
    #[must_use]
    pub fn with_pruning_hook(mut self, hook: impl PruneHook + 'static) -> Self {
        self.set_pruning_hook(hook);
        self
    }

    /// Replace the policy.
    ///
    /// # Errors
    ///
    /// [`PolicyError`] if the policy has a zero budget.
    pub fn with_policy(mut self, policy: PlanPolicy) -> Result<Self, PolicyError> {
        policy.validate()?;
        self.policy = policy;
        Ok(self)
    }

    #[must_use]
    pub fn domain(&self) -> &Arc<Domain> {
        &self.domain
    }

    #[must_use]
    pub fn policy(&self) -> &PlanPolicy {
        &self.policy
    }

    /// Plan for `goals` from `initial`.
    ///
    /// # Errors
    ///
    /// [`PlanningFailure`] if no plan is found; see [`seek_plan`].
    pub fn plan(
        &self,
        initial: &WorldState,
        goals: &[Task],
        verbosity: Verbosity,
    ) -> Result<PlanOutcome, PlanningFailure> {
        seek_plan(
            &self.domain,
            self.hook.as_ref(),
            initial,
            goals,
            &self.policy,
            verbosity,
        )
    }
}
