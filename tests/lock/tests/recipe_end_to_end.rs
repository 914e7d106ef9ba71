//! End-to-end lock tests over the crafting fixtures: recipe book loading,
//! domain construction, the crafting pruner and the harness runner.

use std::collections::BTreeMap;

use lock_tests::{crafting_book, fixture_path, init_tracing, planner_config, AGENT};
use trellis_harness::config::{PlannerConfig, VerbositySetting};
use trellis_harness::recipe::{RecipeBook, RecipeError};
use trellis_harness::runner::PlanReport;
use trellis_harness::runner::run_recipe_plan;
use trellis_harness::stock::have_enough;
use trellis_search::policy::Verbosity;

fn with_goal(mut book: RecipeBook, initial: &[(&str, u64)], goal: &[(&str, u64)]) -> RecipeBook {
    book.initial = initial.iter().map(|&(k, v)| (k.to_string(), v)).collect();
    book.goal = goal.iter().map(|&(k, v)| (k.to_string(), v)).collect();
    book
}

fn config(time: u64) -> PlannerConfig {
    PlannerConfig {
        time,
        verbosity: VerbositySetting::Silent,
        ..planner_config()
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

#[test]
fn fixture_book_builds_a_valid_domain() {
    let book = crafting_book();
    let domain = book.build_domain().unwrap();
    domain.validate(&book.goals(AGENT)).unwrap();

    assert_eq!(domain.operator_names().count(), book.recipes.len());
    assert!(domain.knows("produce_wood"));
    assert!(domain.knows("op_smelt_ore_in_furnace"));

    let wood_methods: Vec<&str> = domain
        .methods("produce_wood")
        .unwrap()
        .iter()
        .map(|m| m.name())
        .collect();
    assert_eq!(
        wood_methods,
        vec!["iron_axe_for_wood", "wooden_axe_for_wood", "stone_axe_for_wood", "punch_for_wood"]
    );
}

#[test]
fn fixture_config_has_the_tool_thresholds() {
    let config = planner_config();
    assert_eq!(config.time, 300);
    assert_eq!(config.verbosity(), Verbosity::Summary);
    let thresholds: BTreeMap<&str, (&str, u64)> = config
        .pruner
        .thresholds
        .iter()
        .map(|t| (t.tool.as_str(), (t.resource.as_str(), t.max_demand)))
        .collect();
    assert_eq!(thresholds["iron_pickaxe"], ("ingot", 11));
    assert_eq!(thresholds["stone_pickaxe"], ("cobble", 7));
    assert_eq!(thresholds["wooden_axe"], ("wood", 9));
    assert_eq!(thresholds["stone_axe"], ("wood", 12));
}

#[test]
fn registry_digest_is_stable_across_builds() {
    let book = crafting_book();
    let a = book.build_domain().unwrap().digest().unwrap();
    let b = book.build_domain().unwrap().digest().unwrap();
    assert_eq!(a, b);
    assert_eq!(book.digest().unwrap(), crafting_book().digest().unwrap());
}

#[test]
fn broken_book_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(
        &path,
        r#"{"Items": ["wood"], "Tools": [], "Recipes": {
            "conjure": {"Produces": {"diamond": 1}, "Time": 1}
        }}"#,
    )
    .unwrap();
    assert!(matches!(
        RecipeBook::load(&path).unwrap_err(),
        RecipeError::UnknownItem { .. }
    ));
    assert!(matches!(
        RecipeBook::load(&fixture_path("missing.json")).unwrap_err(),
        RecipeError::Io { .. }
    ));
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

#[test]
fn goal_already_held() {
    let book = with_goal(crafting_book(), &[("plank", 1)], &[("plank", 1)]);
    let report = run_recipe_plan(&book, &config(0)).unwrap();
    assert!(report.outcome.plan.is_empty());
    assert_eq!(report.initial_fingerprint, report.final_fingerprint);
}

#[test]
fn one_plank_from_nothing() {
    init_tracing();
    let book = with_goal(crafting_book(), &[], &[("plank", 1)]);
    let report = run_recipe_plan(&book, &config(5)).unwrap();

    assert_eq!(
        report.outcome.plan.task_names(),
        vec!["op_punch_for_wood", "op_craft_plank"]
    );
    let end = &report.outcome.final_state;
    assert_eq!(end.count("plank", AGENT), 4);
    assert_eq!(end.count("wood", AGENT), 0);
    assert_eq!(end.time(AGENT), 0);
    assert!(report.outcome.stats.prunes > 0, "tool production was pruned");
}

#[test]
fn one_plank_is_out_of_reach_in_four() {
    let book = with_goal(crafting_book(), &[], &[("plank", 1)]);
    let err = run_recipe_plan(&book, &config(4)).unwrap_err();
    assert!(err.planning_failure().unwrap().is_exhausted());
}

#[test]
fn crafting_with_materials_on_hand() {
    let book = with_goal(
        crafting_book(),
        &[("bench", 1), ("plank", 3), ("stick", 2)],
        &[("wooden_pickaxe", 1)],
    );
    assert_eq!(book.goals(AGENT), vec![have_enough(AGENT, "wooden_pickaxe", 1)]);

    let report = run_recipe_plan(&book, &config(10)).unwrap();
    assert_eq!(
        report.outcome.plan.task_names(),
        vec!["op_craft_wooden_pickaxe_at_bench"]
    );
    let end = &report.outcome.final_state;
    assert_eq!(end.count("wooden_pickaxe", AGENT), 1);
    assert_eq!(end.count("bench", AGENT), 1, "bench is required, not consumed");
    assert_eq!(end.count("plank", AGENT), 0);
    assert_eq!(end.count("stick", AGENT), 0);
    assert_eq!(end.time(AGENT), 4);
}

/// Steps of a wooden pickaxe built from an empty inventory: every tool
/// route to wood is pruned, so all wood is punched.
const WOODEN_PICKAXE_PLAN: [&str; 9] = [
    "op_punch_for_wood",
    "op_craft_plank",
    "op_craft_bench",
    "op_punch_for_wood",
    "op_craft_plank",
    "op_craft_stick",
    "op_punch_for_wood",
    "op_craft_plank",
    "op_craft_wooden_pickaxe_at_bench",
];

fn assert_wooden_pickaxe(report: &PlanReport, time_left: u64) {
    assert_eq!(report.outcome.plan.task_names(), WOODEN_PICKAXE_PLAN);
    let end = &report.outcome.final_state;
    assert_eq!(end.count("wooden_pickaxe", AGENT), 1);
    assert_eq!(end.count("bench", AGENT), 1);
    assert_eq!(end.count("plank", AGENT), 3);
    assert_eq!(end.count("stick", AGENT), 2);
    assert_eq!(end.count("wood", AGENT), 0);
    assert_eq!(end.count("wooden_axe", AGENT), 0, "no tool beyond the goal");
    assert_eq!(end.time(AGENT), time_left);
}

#[test]
fn wooden_pickaxe_from_nothing() {
    init_tracing();
    let book = with_goal(crafting_book(), &[], &[("wooden_pickaxe", 1)]);
    let report = run_recipe_plan(&book, &config(100)).unwrap();

    assert_wooden_pickaxe(&report, 77);
    assert_eq!(report.outcome.stats.dispatches, 130);
    assert!(report.outcome.stats.prunes > 0);
    assert!(report.outcome.stats.backtracks > 0);

    let again = run_recipe_plan(&book, &config(100)).unwrap();
    assert_eq!(report.plan_digest, again.plan_digest);
    assert_eq!(report.final_fingerprint, again.final_fingerprint);
}

#[test]
fn fixture_goal_solves_under_fixture_config() {
    let book = crafting_book();
    let config = planner_config();
    assert_eq!(book.goals(AGENT), vec![have_enough(AGENT, "wooden_pickaxe", 1)]);

    let report = run_recipe_plan(&book, &config).unwrap();
    assert_wooden_pickaxe(&report, config.time - 23);
}

#[test]
fn goals_are_pursued_in_book_order() {
    let book = |goal: &str| {
        RecipeBook::from_json_str(&format!(
            r#"{{
                "Items": ["plank", "wood"],
                "Tools": [],
                "Goal": {goal},
                "Recipes": {{
                    "punch for wood": {{"Produces": {{"wood": 1}}, "Time": 4}},
                    "craft plank": {{"Produces": {{"plank": 4}}, "Consumes": {{"wood": 1}}, "Time": 1}}
                }}
            }}"#
        ))
        .unwrap()
    };

    // Wood first: punch, then the plank uses that wood and the goal
    // already met is not checked again.
    let report = run_recipe_plan(&book(r#"{"wood": 1, "plank": 1}"#), &config(5)).unwrap();
    assert_eq!(
        report.outcome.plan.task_names(),
        vec!["op_punch_for_wood", "op_craft_plank"]
    );
    assert_eq!(report.outcome.final_state.count("plank", AGENT), 4);

    // Plank first spends the whole budget; a second punch does not fit.
    let err = run_recipe_plan(&book(r#"{"plank": 1, "wood": 1}"#), &config(5)).unwrap_err();
    assert!(err.planning_failure().unwrap().is_exhausted());
}

#[test]
fn report_json_round_trips_through_serde() {
    let book = with_goal(crafting_book(), &[], &[("plank", 1)]);
    let report = run_recipe_plan(&book, &config(5)).unwrap();
    let text = serde_json::to_string(&report.to_json()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(value["world_id"], "recipes");
    assert_eq!(value["plan"].as_array().unwrap().len(), 2);
    assert_eq!(value["plan_digest"], report.plan_digest.as_str());
    assert_eq!(value["final_state"]["plank"]["agent"], 4);
}
