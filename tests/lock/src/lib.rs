//! Shared fixtures for the lock tests.
//!
//! Every helper panics on failure: these run only under `cargo test`.

#![allow(clippy::missing_panics_doc)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use trellis_harness::config::PlannerConfig;
use trellis_harness::recipe::RecipeBook;
use trellis_harness::stock::{have_enough, register_stock_methods};
use trellis_kernel::domain::Domain;
use trellis_kernel::method::method_fn;
use trellis_kernel::operators::resource::{ResourceOperator, ResourceRule};
use trellis_kernel::state::world_state::WorldState;
use trellis_kernel::task::Task;

pub const AGENT: &str = "agent";

/// Workspace root, two levels above this crate.
#[must_use]
pub fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .nth(2)
        .expect("workspace root exists")
        .to_path_buf()
}

#[must_use]
pub fn fixture_path(name: &str) -> PathBuf {
    workspace_root().join("harness").join("fixtures").join(name)
}

/// The full crafting recipe book.
#[must_use]
pub fn crafting_book() -> RecipeBook {
    RecipeBook::load(&fixture_path("crafting.json")).expect("crafting.json loads")
}

/// Planner settings with the crafting tool thresholds.
#[must_use]
pub fn planner_config() -> PlannerConfig {
    PlannerConfig::load(&fixture_path("planner.toml")).expect("planner.toml loads")
}

/// Install a test-writer subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// `op_chop` (wood +1, time 4) behind the stock `have_enough` methods.
#[must_use]
pub fn chop_domain() -> Arc<Domain> {
    let mut domain = Domain::new("chop");
    domain
        .register_operator(
            "op_chop",
            ResourceOperator::new("op_chop", ResourceRule::new(4).produces("wood", 1)).shared(),
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
    register_stock_methods(&mut domain, ["wood"]).unwrap();
    domain.freeze()
}

/// `{wood: 0, time: <time>}` for [`AGENT`].
#[must_use]
pub fn chop_state(time: u64) -> WorldState {
    let mut state = WorldState::with_time(AGENT, time);
    state.declare("wood", AGENT);
    state
}

#[must_use]
pub fn wood_goal(n: u64) -> Vec<Task> {
    vec![have_enough(AGENT, "wood", n)]
}
