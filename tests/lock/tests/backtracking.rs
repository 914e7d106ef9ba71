//! Backtracking lock tests: state and plan restoration after a failed
//! branch, operator overloading, lookup misses and the call stack.

use std::sync::{Arc, Mutex};

use lock_tests::AGENT;
use trellis_kernel::domain::Domain;
use trellis_kernel::method::method_fn;
use trellis_kernel::operators::operator::Operator;
use trellis_kernel::operators::resource::{ResourceOperator, ResourceRule};
use trellis_kernel::state::world_state::WorldState;
use trellis_kernel::task::Task;
use trellis_search::event::SearchEvent;
use trellis_search::planner::Planner;
use trellis_search::policy::Verbosity;
use trellis_search::prune::PruneContext;

fn op(name: &str, rule: ResourceRule) -> Arc<dyn Operator> {
    ResourceOperator::new(name, rule).shared()
}

/// `build` first tries `[op_gather, op_spend_big]`, which fails only after
/// `op_gather` has applied; the second method is `[op_spend_small]`.
fn two_route_domain() -> Arc<Domain> {
    let mut domain = Domain::new("routes");
    domain
        .register_operator("op_gather", op("op_gather", ResourceRule::new(1).produces("stone", 1)))
        .unwrap();
    domain
        .register_operator(
            "op_spend_big",
            op("op_spend_big", ResourceRule::new(1).consumes("stone", 5).produces("wall", 1)),
        )
        .unwrap();
    domain
        .register_operator(
            "op_spend_small",
            op("op_spend_small", ResourceRule::new(2).produces("fence", 1)),
        )
        .unwrap();
    domain
        .register_methods(
            "build",
            vec![
                method_fn("wall", |_, task| {
                    Some(vec![
                        Task::new("op_gather", task.agent()),
                        Task::new("op_spend_big", task.agent()),
                    ])
                })
                .emitting(["op_gather", "op_spend_big"])
                .shared(),
                method_fn("fence", |_, task| {
                    Some(vec![Task::new("op_spend_small", task.agent())])
                })
                .emitting(["op_spend_small"])
                .shared(),
            ],
        )
        .unwrap();
    domain.freeze()
}

#[test]
fn failed_branch_leaves_no_trace_in_plan_or_state() {
    let outcome = Planner::new(two_route_domain())
        .plan(
            &WorldState::with_time(AGENT, 10),
            &[Task::new("build", AGENT)],
            Verbosity::Silent,
        )
        .unwrap();

    assert_eq!(outcome.plan.task_names(), vec!["op_spend_small"]);
    assert_eq!(outcome.final_state.count("stone", AGENT), 0, "gathered stone rolled back");
    assert_eq!(outcome.final_state.count("fence", AGENT), 1);
    assert_eq!(outcome.final_state.time(AGENT), 8);
    assert_eq!(outcome.stats.backtracks, 1);
    assert_eq!(outcome.stats.operator_applications, 2);
    assert_eq!(outcome.stats.operator_failures, 1);
}

#[test]
fn trace_records_the_backtrack() {
    let outcome = Planner::new(two_route_domain())
        .plan(
            &WorldState::with_time(AGENT, 10),
            &[Task::new("build", AGENT)],
            Verbosity::Trace,
        )
        .unwrap();

    let backtrack = outcome
        .events
        .iter()
        .find_map(|event| match event {
            SearchEvent::Backtrack { task, plan_len, .. } => Some((task.name().to_string(), *plan_len)),
            _ => None,
        })
        .unwrap();
    assert_eq!(backtrack, ("build".to_string(), 0));
    assert!(matches!(
        outcome.events.last(),
        Some(SearchEvent::Solved { plan_len: 1 })
    ));
}

// ---------------------------------------------------------------------------
// Operator overloading
// ---------------------------------------------------------------------------

/// Two `op_cut` variants: a fast one needing an axe, a slow bare-handed one.
fn overloaded_domain() -> Domain {
    let mut domain = Domain::new("overloaded");
    domain
        .register_operator(
            "op_cut",
            op("op_cut", ResourceRule::new(1).requires("axe", 1).produces("wood", 1)),
        )
        .unwrap();
    domain
        .register_operator_variant("op_cut", op("op_cut", ResourceRule::new(4).produces("wood", 1)))
        .unwrap();
    domain
}

#[test]
fn operator_variants_tried_in_registration_order() {
    let planner = Planner::new(overloaded_domain().freeze());
    let goal = [Task::new("op_cut", AGENT)];

    let mut with_axe = WorldState::with_time(AGENT, 10);
    with_axe.set_count("axe", AGENT, 1);
    let fast = planner.plan(&with_axe, &goal, Verbosity::Silent).unwrap();
    assert_eq!(fast.final_state.time(AGENT), 9);

    let slow = planner
        .plan(&WorldState::with_time(AGENT, 10), &goal, Verbosity::Silent)
        .unwrap();
    assert_eq!(slow.final_state.time(AGENT), 6);
    assert_eq!(slow.stats.operator_failures, 1);
}

#[test]
fn later_failure_backtracks_into_operator_variants() {
    let mut domain = Domain::new("overloaded_haul");
    domain
        .register_operator(
            "op_cut",
            op("op_cut", ResourceRule::new(1).requires("axe", 1).produces("wood", 1)),
        )
        .unwrap();
    domain
        .register_operator_variant("op_cut", op("op_cut", ResourceRule::new(4).produces("wood", 2)))
        .unwrap();
    domain
        .register_operator(
            "op_haul",
            op("op_haul", ResourceRule::new(1).consumes("wood", 2).produces("load", 1)),
        )
        .unwrap();
    domain
        .register_methods(
            "deliver",
            vec![method_fn("cut_then_haul", |_, task| {
                Some(vec![
                    Task::new("op_cut", task.agent()),
                    Task::new("op_haul", task.agent()),
                ])
            })
            .emitting(["op_cut", "op_haul"])
            .shared()],
        )
        .unwrap();

    // The axe cut applies first but yields one wood, too little to haul;
    // the search resumes at the second variant.
    let mut state = WorldState::with_time(AGENT, 10);
    state.set_count("axe", AGENT, 1);
    let outcome = Planner::new(domain.freeze())
        .plan(&state, &[Task::new("deliver", AGENT)], Verbosity::Silent)
        .unwrap();
    assert_eq!(outcome.plan.task_names(), vec!["op_cut", "op_haul"]);
    assert_eq!(outcome.final_state.count("load", AGENT), 1);
    assert_eq!(outcome.final_state.count("wood", AGENT), 0);
    assert_eq!(outcome.final_state.time(AGENT), 5);
    assert_eq!(outcome.stats.backtracks, 1);
    assert_eq!(outcome.stats.operator_failures, 1);
}

#[test]
fn exhausting_variants_after_downstream_failure() {
    let mut domain = overloaded_domain();
    domain
        .register_operator(
            "op_haul",
            op("op_haul", ResourceRule::new(6).consumes("wood", 1).produces("load", 1)),
        )
        .unwrap();
    domain
        .register_methods(
            "deliver",
            vec![method_fn("cut_then_haul", |_, task| {
                Some(vec![
                    Task::new("op_cut", task.agent()),
                    Task::new("op_haul", task.agent()),
                ])
            })
            .emitting(["op_cut", "op_haul"])
            .shared()],
        )
        .unwrap();

    // With an axe and 6 time: fast cut leaves 5, haul fails; the slow
    // variant is resumed from the choice point and leaves 2, haul fails.
    let mut state = WorldState::with_time(AGENT, 6);
    state.set_count("axe", AGENT, 1);
    let failure = Planner::new(domain.freeze())
        .plan(&state, &[Task::new("deliver", AGENT)], Verbosity::Silent)
        .unwrap_err();
    assert!(failure.is_exhausted());
    assert_eq!(failure.stats.backtracks, 1);
    assert_eq!(failure.stats.operator_applications, 2);
    assert_eq!(failure.stats.operator_failures, 2);
}

// ---------------------------------------------------------------------------
// Lookup misses
// ---------------------------------------------------------------------------

#[test]
fn unknown_task_is_a_dead_end_not_an_error() {
    let mut domain = Domain::new("partial");
    domain
        .register_operator("op_rest", op("op_rest", ResourceRule::new(1)))
        .unwrap();
    domain
        .register_methods(
            "act",
            vec![
                method_fn("dream", |_, task| Some(vec![Task::new("fly", task.agent())])).shared(),
                method_fn("rest", |_, task| Some(vec![Task::new("op_rest", task.agent())]))
                    .emitting(["op_rest"])
                    .shared(),
            ],
        )
        .unwrap();

    let outcome = Planner::new(domain.freeze())
        .plan(
            &WorldState::with_time(AGENT, 1),
            &[Task::new("act", AGENT)],
            Verbosity::Silent,
        )
        .unwrap();
    assert_eq!(outcome.plan.task_names(), vec!["op_rest"]);
    assert_eq!(outcome.stats.lookup_misses, 1);
}

// ---------------------------------------------------------------------------
// Call stack
// ---------------------------------------------------------------------------

#[test]
fn call_stack_lists_expanded_ancestors() {
    let mut domain = Domain::new("nested");
    domain
        .register_operator("op_leaf", op("op_leaf", ResourceRule::new(0)))
        .unwrap();
    domain
        .register_methods(
            "outer",
            vec![method_fn("wrap", |_, task| Some(vec![Task::new("inner", task.agent())]))
                .emitting(["inner"])
                .shared()],
        )
        .unwrap();
    domain
        .register_methods(
            "inner",
            vec![method_fn("leaf", |_, task| Some(vec![Task::new("op_leaf", task.agent())]))
                .emitting(["op_leaf"])
                .shared()],
        )
        .unwrap();

    let seen: Arc<Mutex<Vec<(String, Vec<String>)>>> = Arc::default();
    let log = Arc::clone(&seen);
    let planner = Planner::new(domain.freeze()).with_pruning_hook(move |ctx: &PruneContext<'_>| {
        let stack = ctx.call_stack.iter().map(|t| t.name().to_string()).collect();
        log.lock().unwrap().push((ctx.task.name().to_string(), stack));
        false
    });
    planner
        .plan(&WorldState::new(), &[Task::new("outer", AGENT)], Verbosity::Silent)
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            ("outer".to_string(), Vec::<String>::new()),
            ("inner".to_string(), vec!["outer".to_string()]),
            ("op_leaf".to_string(), vec!["outer".to_string(), "inner".to_string()]),
        ]
    );
}
