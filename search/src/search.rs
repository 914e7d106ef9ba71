//! Search entry point and dispatch loop.
//!
//! Depth-first, left-to-right HTN decomposition over an explicit stack of
//! choice points. Each loop iteration either dispatches the first task of
//! the current agenda or, when the branch is dead, resumes the newest
//! choice point. Nothing recurses, so domain depth is bounded only by
//! memory, the policy and the pruning hook.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};
use trellis_kernel::domain::Domain;
use trellis_kernel::method::Method;
use trellis_kernel::operators::apply::apply;
use trellis_kernel::operators::operator::Operator;
use trellis_kernel::plan::Plan;
use trellis_kernel::state::world_state::WorldState;
use trellis_kernel::task::Task;

use crate::agenda::Agenda;
use crate::choice::{Alternative, ChoicePoint, ChoiceStack};
use crate::decompose::MethodCursor;
use crate::error::{FailureReason, PanicStage, PlanningFailure};
use crate::event::SearchEvent;
use crate::outcome::{PlanOutcome, SearchStats};
use crate::policy::{PlanPolicy, Verbosity};
use crate::prune::{PruneContext, PruneHook};

/// The live branch: what to do next, from which state, at what depth.
struct Branch {
    state: WorldState,
    agenda: Agenda,
    depth: usize,
}

/// Find a plan for `goals` from `initial`.
///
/// Returns the first plan in exploration order: methods in registration
/// order, then operator variants in registration order. `initial` is only
/// read.
///
/// # Errors
///
/// [`PlanningFailure`] when the space is exhausted, a budget runs out, a
/// domain callback panics or `policy` is invalid. Statistics are attached
/// in every case.
pub fn seek_plan(
    domain: &Domain,
    hook: &dyn PruneHook,
    initial: &WorldState,
    goals: &[Task],
    policy: &PlanPolicy,
    verbosity: Verbosity,
) -> Result<PlanOutcome, PlanningFailure> {
    if let Err(err) = policy.validate() {
        return Err(PlanningFailure::new(err.into(), SearchStats::default()));
    }
    if verbosity.summary() {
        info!(domain = domain.name(), goals = goals.len(), "planning started");
    }

    let mut search = Search {
        domain,
        hook,
        policy,
        verbosity,
        started: Instant::now(),
        plan: Plan::new(),
        call_stack: Vec::new(),
        choices: ChoiceStack::new(),
        stats: SearchStats::default(),
        events: Vec::new(),
    };
    let result = search.run(Branch {
        state: initial.snapshot(),
        agenda: Agenda::from_tasks(goals),
        depth: 0,
    });

    if verbosity.summary() {
        match &result {
            Ok(outcome) => {
                info!(plan_len = outcome.plan.len(), stats = %outcome.stats, "plan found");
            }
            Err(failure) => {
                info!(reason = %failure.reason, stats = %failure.stats, "planning failed");
            }
        }
    }
    result
}

struct Search<'a> {
    domain: &'a Domain,
    hook: &'a dyn PruneHook,
    policy: &'a PlanPolicy,
    verbosity: Verbosity,
    started: Instant,
    plan: Plan,
    call_stack: Vec<Task>,
    choices: ChoiceStack,
    stats: SearchStats,
    events: Vec<SearchEvent>,
}

impl Search<'_> {
    fn run(&mut self, root: Branch) -> Result<PlanOutcome, PlanningFailure> {
        let mut current = Some(root);
        loop {
            let branch = match current.take() {
                Some(branch) => branch,
                None => match self.backtrack()? {
                    Some(branch) => branch,
                    None => return Err(self.fail(FailureReason::Exhausted)),
                },
            };
            let Some((task, rest)) = branch.agenda.pop() else {
                return Ok(self.finish(branch.state));
            };
            current = self.dispatch(branch.state, task, rest, branch.depth)?;
        }
    }

    /// Handle one task. `Ok(None)` means this branch is dead.
    fn dispatch(
        &mut self,
        state: WorldState,
        task: Task,
        rest: Agenda,
        depth: usize,
    ) -> Result<Option<Branch>, PlanningFailure> {
        if self.stats.dispatches >= self.policy.max_steps {
            return Err(self.fail(FailureReason::StepBudgetExceeded {
                limit: self.policy.max_steps,
            }));
        }
        if let Some(deadline) = self.policy.deadline {
            if self.started.elapsed() >= deadline {
                return Err(self.fail(FailureReason::DeadlineExceeded));
            }
        }
        self.stats.dispatches += 1;
        self.stats.max_depth = self.stats.max_depth.max(depth);
        if self.tracing() {
            self.record(SearchEvent::Dispatch {
                step: self.stats.dispatches,
                depth,
                task: task.clone(),
            });
        }

        if depth >= self.policy.max_depth {
            self.stats.depth_cutoffs += 1;
            if self.tracing() {
                self.record(SearchEvent::DepthCutoff { depth, task });
            }
            return Ok(None);
        }

        let ctx = PruneContext {
            state: &state,
            task: &task,
            agenda: &rest,
            plan: &self.plan,
            depth,
            call_stack: &self.call_stack,
        };
        let hook = self.hook;
        match catch_unwind(AssertUnwindSafe(|| hook.check(&ctx))) {
            Ok(decision) if decision.is_prune() => {
                self.stats.prunes += 1;
                if self.tracing() {
                    self.record(SearchEvent::Pruned { depth, task });
                }
                return Ok(None);
            }
            Ok(_) => {}
            Err(_) => {
                return Err(self.fail(FailureReason::DomainPanic {
                    stage: PanicStage::PruneHook {
                        task: task.to_string(),
                    },
                }));
            }
        }

        let domain = self.domain;
        if let Some(variants) = domain.operators(task.name()) {
            self.try_operators(variants, state, task, rest, depth, 0)
        } else if let Some(methods) = domain.methods(task.name()) {
            self.try_methods(methods, state, task, rest, depth, 0)
        } else {
            self.stats.lookup_misses += 1;
            if self.tracing() {
                self.record(SearchEvent::LookupMiss { task });
            }
            Ok(None)
        }
    }

    /// Apply operator variants from `start` until one succeeds.
    fn try_operators(
        &mut self,
        variants: &[Arc<dyn Operator>],
        state: WorldState,
        task: Task,
        rest: Agenda,
        depth: usize,
        start: usize,
    ) -> Result<Option<Branch>, PlanningFailure> {
        for (variant, operator) in variants.iter().enumerate().skip(start) {
            let applied = catch_unwind(AssertUnwindSafe(|| apply(&state, &task, operator.as_ref())));
            match applied {
                Ok(Ok(next)) => {
                    self.stats.operator_applications += 1;
                    if variant + 1 < variants.len() {
                        self.choices.push(ChoicePoint {
                            state,
                            task: task.clone(),
                            agenda: rest.clone(),
                            depth,
                            plan_len: self.plan.len(),
                            call_stack_len: self.call_stack.len(),
                            next: Alternative::OperatorVariant(variant + 1),
                        });
                    }
                    self.plan.push(task.clone(), next.clone());
                    if self.tracing() {
                        self.record(SearchEvent::Applied {
                            task,
                            variant,
                            plan_len: self.plan.len(),
                        });
                    }
                    return Ok(Some(Branch {
                        state: next,
                        agenda: rest,
                        depth: depth + 1,
                    }));
                }
                Ok(Err(failure)) => {
                    self.stats.operator_failures += 1;
                    if self.tracing() {
                        self.record(SearchEvent::OperatorRejected {
                            task: task.clone(),
                            variant,
                            failure,
                        });
                    }
                }
                Err(_) => {
                    return Err(self.fail(FailureReason::DomainPanic {
                        stage: PanicStage::Operator {
                            operator: task.name().to_string(),
                            variant,
                        },
                    }));
                }
            }
        }
        Ok(None)
    }

    /// Decompose with methods from `start` until one succeeds.
    fn try_methods(
        &mut self,
        methods: &[Arc<dyn Method>],
        state: WorldState,
        task: Task,
        rest: Agenda,
        depth: usize,
        start: usize,
    ) -> Result<Option<Branch>, PlanningFailure> {
        let mut cursor = MethodCursor::resume(methods, start);
        let found = cursor.next_decomposition(&state, &task);
        self.stats.method_failures += cursor.declined();

        let expansion = match found {
            Ok(expansion) => expansion,
            Err(panic) => {
                return Err(self.fail(FailureReason::DomainPanic {
                    stage: PanicStage::Method {
                        task: task.to_string(),
                        method: panic.method,
                    },
                }));
            }
        };
        if self.tracing() {
            let end = expansion
                .as_ref()
                .map_or(cursor.position(), |e| e.method_index);
            for method in methods.get(start..end).unwrap_or_default() {
                self.record(SearchEvent::MethodDeclined {
                    task: task.clone(),
                    method: method.name().to_string(),
                });
            }
        }
        let Some(expansion) = expansion else {
            return Ok(None);
        };

        self.stats.decompositions += 1;
        if cursor.has_remaining() {
            self.choices.push(ChoicePoint {
                state: state.clone(),
                task: task.clone(),
                agenda: rest.clone(),
                depth,
                plan_len: self.plan.len(),
                call_stack_len: self.call_stack.len(),
                next: Alternative::Method(cursor.position()),
            });
        }
        if self.tracing() {
            let method = methods
                .get(expansion.method_index)
                .map_or_else(String::new, |m| m.name().to_string());
            self.record(SearchEvent::Decomposed {
                task: task.clone(),
                method,
                subtasks: expansion.subtasks.clone(),
            });
        }

        let agenda = rest.prepend(&expansion.subtasks);
        self.call_stack.push(task);
        Ok(Some(Branch {
            state,
            agenda,
            depth: depth + 1,
        }))
    }

    /// Resume the newest choice point that still yields a branch.
    fn backtrack(&mut self) -> Result<Option<Branch>, PlanningFailure> {
        let domain = self.domain;
        while let Some(frame) = self.choices.pop() {
            self.stats.backtracks += 1;
            self.plan.truncate(frame.plan_len);
            self.call_stack.truncate(frame.call_stack_len);
            if self.tracing() {
                self.record(SearchEvent::Backtrack {
                    task: frame.task.clone(),
                    depth: frame.depth,
                    plan_len: frame.plan_len,
                });
            }

            let resumed = match frame.next {
                Alternative::OperatorVariant(start) => match domain.operators(frame.task.name()) {
                    Some(variants) => self.try_operators(
                        variants,
                        frame.state,
                        frame.task,
                        frame.agenda,
                        frame.depth,
                        start,
                    )?,
                    None => None,
                },
                Alternative::Method(start) => match domain.methods(frame.task.name()) {
                    Some(methods) => self.try_methods(
                        methods,
                        frame.state,
                        frame.task,
                        frame.agenda,
                        frame.depth,
                        start,
                    )?,
                    None => None,
                },
            };
            if resumed.is_some() {
                return Ok(resumed);
            }
        }
        Ok(None)
    }

    fn finish(&mut self, final_state: WorldState) -> PlanOutcome {
        if self.tracing() {
            self.record(SearchEvent::Solved {
                plan_len: self.plan.len(),
            });
        }
        PlanOutcome {
            plan: std::mem::take(&mut self.plan),
            final_state,
            stats: self.stats_snapshot(),
            events: std::mem::take(&mut self.events),
        }
    }

    fn fail(&self, reason: FailureReason) -> PlanningFailure {
        PlanningFailure::new(reason, self.stats_snapshot())
    }

    fn stats_snapshot(&self) -> SearchStats {
        SearchStats {
            max_choice_points: self.choices.high_water(),
            ..self.stats.clone()
        }
    }

    fn tracing(&self) -> bool {
        self.verbosity.trace()
    }

    fn record(&mut self, event: SearchEvent) {
        debug!(%event, "search");
        self.events.push(event);
    }
}
