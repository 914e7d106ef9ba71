//! Lock tests for the planner's reference behaviours:
//!
//! 1. Two chops from time 10 reach `{wood: 2, time: 2}`.
//! 2. One chop from time 3 is a planning failure.
//! 3. Method order: a declining first method always falls back to the second.
//! 4. A hook pruning past depth 3 stops self-recursion with a failure.
//! 5. An already satisfied goal yields an empty plan and no operator call.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lock_tests::{chop_domain, chop_state, init_tracing, wood_goal, AGENT};
use trellis_kernel::domain::Domain;
use trellis_kernel::method::method_fn;
use trellis_kernel::operators::operator::operator_fn;
use trellis_kernel::state::value::Value;
use trellis_kernel::state::world_state::WorldState;
use trellis_kernel::task::Task;
use trellis_search::error::FailureReason;
use trellis_search::planner::Planner;
use trellis_search::policy::Verbosity;
use trellis_search::prune::{prune_when, PruneContext};

// ---------------------------------------------------------------------------
// 1-2. Chopping wood
// ---------------------------------------------------------------------------

#[test]
fn two_chops_within_budget() {
    init_tracing();
    let planner = Planner::new(chop_domain());
    let outcome = planner
        .plan(&chop_state(10), &wood_goal(2), Verbosity::Summary)
        .unwrap();

    assert_eq!(outcome.plan.task_names(), vec!["op_chop", "op_chop"]);
    assert_eq!(outcome.final_state.get("wood", AGENT), Value::Count(2));
    assert_eq!(outcome.final_state.time(AGENT), 2);
    assert_eq!(
        outcome.plan.last_state(),
        Some(&outcome.final_state),
        "final state is the state after the last step"
    );
}

#[test]
fn one_chop_over_budget_fails() {
    let planner = Planner::new(chop_domain());
    let failure = planner
        .plan(&chop_state(3), &wood_goal(1), Verbosity::Silent)
        .unwrap_err();

    assert_eq!(failure.reason, FailureReason::Exhausted);
    assert_eq!(failure.stats.operator_failures, 1);
    assert_eq!(failure.stats.operator_applications, 0);
}

#[test]
fn initial_state_is_not_modified() {
    let planner = Planner::new(chop_domain());
    let initial = chop_state(10);
    let before = initial.fingerprint().unwrap();
    planner.plan(&initial, &wood_goal(2), Verbosity::Silent).unwrap();
    assert_eq!(initial.fingerprint().unwrap(), before);
    assert_eq!(initial.count("wood", AGENT), 0);
}

// ---------------------------------------------------------------------------
// 3. Method order
// ---------------------------------------------------------------------------

/// `descend(n)` bottoms out in `pick` at `n == 0`; `pick` has a declining
/// first method and a succeeding second one.
fn method_order_domain() -> Arc<Domain> {
    let mut domain = Domain::new("method_order");
    domain
        .register_operator(
            "op_mark",
            operator_fn("op_mark", |state, task| {
                let mut next = state.snapshot();
                next.set_flag("marked", task.agent(), true);
                Ok(next)
            })
            .shared(),
        )
        .unwrap();
    domain
        .register_methods(
            "pick",
            vec![
                method_fn("always_declines", |_, _| None).shared(),
                method_fn("always_succeeds", |_, task| {
                    Some(vec![Task::new("op_mark", task.agent())])
                })
                .emitting(["op_mark"])
                .shared(),
            ],
        )
        .unwrap();
    domain
        .register_methods(
            "descend",
            vec![method_fn("step_down", |_, task| {
                let n = task.int_arg(0)?;
                Some(vec![if n == 0 {
                    Task::new("pick", task.agent())
                } else {
                    Task::new("descend", task.agent()).int(n - 1)
                }])
            })
            .emitting(["pick", "descend"])
            .shared()],
        )
        .unwrap();
    domain.freeze()
}

#[test]
fn second_method_wins_at_every_depth() {
    let planner = Planner::new(method_order_domain());
    for levels in [0u64, 1, 5, 40, 300] {
        let goal = [Task::new("descend", AGENT).int(levels)];
        let outcome = planner
            .plan(&WorldState::new(), &goal, Verbosity::Silent)
            .unwrap();
        assert_eq!(outcome.plan.task_names(), vec!["op_mark"], "levels={levels}");
        assert!(outcome.final_state.flag("marked", AGENT));
        assert_eq!(outcome.stats.method_failures, 1, "levels={levels}");
    }
}

// ---------------------------------------------------------------------------
// 4. Pruning unbounded recursion
// ---------------------------------------------------------------------------

#[test]
fn depth_hook_stops_self_recursion() {
    let mut domain = Domain::new("loop");
    domain
        .register_methods(
            "forever",
            vec![method_fn("again", |_, task| Some(vec![task.clone()]))
                .emitting(["forever"])
                .shared()],
        )
        .unwrap();

    let planner = Planner::new(domain.freeze())
        .with_pruning_hook(prune_when(|ctx: &PruneContext<'_>| ctx.depth > 3));
    let failure = planner
        .plan(&WorldState::new(), &[Task::new("forever", AGENT)], Verbosity::Silent)
        .unwrap_err();

    assert!(failure.is_exhausted());
    assert_eq!(failure.stats.prunes, 1);
    assert_eq!(failure.stats.max_depth, 4);
    assert_eq!(failure.stats.decompositions, 4);
}

// ---------------------------------------------------------------------------
// 5. Satisfied goals
// ---------------------------------------------------------------------------

#[test]
fn satisfied_goal_needs_no_operator() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let mut domain = Domain::new("counted_chop");
    domain
        .register_operator(
            "op_chop",
            operator_fn("op_chop", move |state, task| {
                counter.fetch_add(1, Ordering::SeqCst);
                let mut next = state.snapshot();
                next.set_count("wood", task.agent(), state.count("wood", task.agent()) + 1);
                Ok(next)
            })
            .shared(),
        )
        .unwrap();
    domain
        .register_methods(
            "produce_wood",
            vec![method_fn("chop", |_, task| Some(vec![Task::new("op_chop", task.agent())]))
                .emitting(["op_chop"])
                .shared()],
        )
        .unwrap();
    trellis_harness::stock::register_stock_methods(&mut domain, ["wood"]).unwrap();

    let planner = Planner::new(domain.freeze());
    let initial = chop_state(10);
    let outcome = planner.plan(&initial, &wood_goal(0), Verbosity::Silent).unwrap();

    assert!(outcome.plan.is_empty());
    assert_eq!(outcome.final_state, initial);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(outcome.stats.operator_applications, 0);
}

#[test]
fn no_goals_is_an_empty_plan() {
    let outcome = Planner::new(chop_domain())
        .plan(&chop_state(10), &[], Verbosity::Silent)
        .unwrap();
    assert!(outcome.plan.is_empty());
    assert_eq!(outcome.stats.dispatches, 0);
}
