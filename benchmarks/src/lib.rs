//! Shared helpers for trellis benchmark suites.

use std::path::Path;

use trellis_harness::config::PrunerSettings;
use trellis_harness::contract::PlanningWorld;
use trellis_harness::recipe::RecipeBook;
use trellis_kernel::state::world_state::WorldState;
use trellis_kernel::task::Task;
use trellis_search::planner::Planner;

pub const AGENT: &str = "agent";

/// Everything `Planner::plan` needs, built once outside the timed loop.
pub struct PlanSetup {
    pub planner: Planner,
    pub initial: WorldState,
    pub goals: Vec<Task>,
}

/// Build the frozen domain, hook, initial state and goals for `world`.
///
/// # Panics
///
/// Panics if the world's domain cannot be built. Benchmark setup failures
/// are fatal.
pub fn prepare<W: PlanningWorld>(world: &W, time: u64) -> PlanSetup {
    let domain = world.domain().expect("world domain builds");
    let mut planner = Planner::new(domain.freeze());
    planner.set_shared_pruning_hook(world.pruning_hook(&PrunerSettings::default()));
    PlanSetup {
        planner,
        initial: world.initial_state(AGENT, time),
        goals: world.goals(AGENT),
    }
}

/// The crafting recipe book shipped with the harness fixtures.
///
/// # Panics
///
/// Panics if the fixture is missing or invalid.
#[must_use]
pub fn crafting_book() -> RecipeBook {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("harness")
        .join("fixtures")
        .join("crafting.json");
    RecipeBook::load(&path).expect("crafting fixture loads")
}

/// `crafting_book` with `goal` replacing the fixture goal and no initial
/// inventory.
#[must_use]
pub fn crafting_goal(goal: &[(&str, u64)]) -> RecipeBook {
    let mut book = crafting_book();
    book.initial.clear();
    book.goal = goal.iter().map(|&(item, n)| (item.to_string(), n)).collect();
    book
}

/// A synthetic state with `attributes` counters for [`AGENT`].
#[must_use]
pub fn wide_state(attributes: usize) -> WorldState {
    let mut state = WorldState::with_time(AGENT, 1_000);
    for i in 0..attributes {
        state.set_count(&format!("item_{i}"), AGENT, u64::try_from(i).unwrap_or(u64::MAX));
    }
    state
}
