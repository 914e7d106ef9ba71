//! `AxeCamp`: a hand-written wood-gathering world where a tool pays off.
//!
//! Wood can be punched (4 time) or cut with a wooden axe (2 time). The
//! axe needs a bench, sticks and planks, all made from wood. `produce`
//! tries, in order: cut with the axe already made, make the axe and then
//! cut, punch by hand, and finally the item's own `produce_<item>` task.
//!
//! Crafting operators record what they made as flags (`made_wooden_axe`,
//! `made_bench`). Without a pruning hook `produce(wooden_axe)` recurses
//! into itself through the wood it needs, so the world supplies a
//! [`CraftingPruner`] over its tools.

use std::sync::Arc;

use trellis_kernel::domain::Domain;
use trellis_kernel::method::method_fn;
use trellis_kernel::operators::operator::{operator_fn, Operator};
use trellis_kernel::operators::resource::{ResourceOperator, ResourceRule};
use trellis_kernel::state::world_state::WorldState;
use trellis_kernel::task::Task;
use trellis_search::prune::PruneHook;

use crate::config::PrunerSettings;
use crate::contract::{PlanningWorld, WorldError};
use crate::pruner::CraftingPruner;
use crate::stock::{
    have_enough, produce, produce_task_name, register_have_enough, HAVE_ENOUGH, PRODUCE,
};

pub const MADE_WOODEN_AXE: &str = "made_wooden_axe";
pub const MADE_BENCH: &str = "made_bench";

const ITEMS: [&str; 5] = ["wood", "plank", "stick", "bench", "wooden_axe"];
const TOOLS: [&str; 2] = ["wooden_axe", "bench"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxeCamp {
    pub wood: u64,
}

impl AxeCamp {
    #[must_use]
    pub fn new(wood: u64) -> Self {
        Self { wood }
    }
}

/// A crafting operator that also raises `flag` once it has run.
fn flagged(name: &str, rule: ResourceRule, flag: &'static str) -> Arc<dyn Operator> {
    operator_fn(name, move |state, task| {
        let mut next = rule.execute(state, task.agent())?;
        next.set_flag(flag, task.agent(), true);
        Ok(next)
    })
    .shared()
}

fn register_operators(domain: &mut Domain) -> Result<(), WorldError> {
    domain.register_operator(
        "op_punch_for_wood",
        ResourceOperator::new("op_punch_for_wood", ResourceRule::new(4).produces("wood", 1)).shared(),
    )?;
    domain.register_operator(
        "op_wooden_axe_for_wood",
        ResourceOperator::new(
            "op_wooden_axe_for_wood",
            ResourceRule::new(2).requires("wooden_axe", 1).produces("wood", 1),
        )
        .shared(),
    )?;
    domain.register_operator(
        "op_craft_plank",
        ResourceOperator::new(
            "op_craft_plank",
            ResourceRule::new(1).consumes("wood", 1).produces("plank", 4),
        )
        .shared(),
    )?;
    domain.register_operator(
        "op_craft_stick",
        ResourceOperator::new(
            "op_craft_stick",
            ResourceRule::new(1).consumes("plank", 2).produces("stick", 4),
        )
        .shared(),
    )?;
    domain.register_operator(
        "op_craft_bench",
        flagged(
            "op_craft_bench",
            ResourceRule::new(1).consumes("plank", 4).produces("bench", 1),
            MADE_BENCH,
        ),
    )?;
    domain.register_operator(
        "op_craft_wooden_axe_at_bench",
        flagged(
            "op_craft_wooden_axe_at_bench",
            ResourceRule::new(1)
                .requires("bench", 1)
                .consumes("plank", 3)
                .consumes("stick", 2)
                .produces("wooden_axe", 1),
            MADE_WOODEN_AXE,
        ),
    )?;
    Ok(())
}

/// A `produce_<item>` task with one fixed expansion.
fn recipe_task(
    domain: &mut Domain,
    task: &str,
    demands: &'static [(&'static str, u64)],
    operator: &'static str,
) -> Result<(), WorldError> {
    let mut emits = vec![operator.to_string()];
    if !demands.is_empty() {
        emits.push(HAVE_ENOUGH.to_string());
    }
    domain.register_methods(
        task,
        vec![method_fn(task, move |_, t| {
            let agent = t.agent();
            let mut subtasks: Vec<Task> = demands
                .iter()
                .map(|&(item, n)| have_enough(agent, item, n))
                .collect();
            subtasks.push(Task::new(operator, agent));
            Some(subtasks)
        })
        .emitting(emits)
        .shared()],
    )?;
    Ok(())
}

impl PlanningWorld for AxeCamp {
    fn world_id(&self) -> &str {
        "axe_camp"
    }

    fn domain(&self) -> Result<Domain, WorldError> {
        let mut domain = Domain::new("axe_camp");
        register_operators(&mut domain)?;

        recipe_task(&mut domain, "produce_wood_hand", &[], "op_punch_for_wood")?;
        recipe_task(&mut domain, "produce_wood_wooden_axe", &[], "op_wooden_axe_for_wood")?;
        recipe_task(&mut domain, "produce_plank", &[("wood", 1)], "op_craft_plank")?;
        recipe_task(&mut domain, "produce_stick", &[("plank", 2)], "op_craft_stick")?;
        recipe_task(&mut domain, "produce_bench", &[("plank", 4)], "op_craft_bench")?;
        recipe_task(
            &mut domain,
            "produce_wooden_axe",
            &[("bench", 1), ("stick", 2), ("plank", 3)],
            "op_craft_wooden_axe_at_bench",
        )?;

        register_have_enough(&mut domain)?;
        let crafted: Vec<String> = ["plank", "stick", "bench", "wooden_axe"]
            .into_iter()
            .map(produce_task_name)
            .collect();
        domain.register_methods(
            PRODUCE,
            vec![
                method_fn("axe_wood", |state, task| {
                    let agent = task.agent();
                    (task.symbol_arg(0)? == "wood" && state.flag(MADE_WOODEN_AXE, agent))
                        .then(|| vec![Task::new("produce_wood_wooden_axe", agent)])
                })
                .emitting(["produce_wood_wooden_axe"])
                .shared(),
                method_fn("axe_then_wood", |state, task| {
                    let agent = task.agent();
                    (task.symbol_arg(0)? == "wood" && !state.flag(MADE_WOODEN_AXE, agent)).then(|| {
                        vec![
                            produce(agent, "wooden_axe"),
                            Task::new("produce_wood_wooden_axe", agent),
                        ]
                    })
                })
                .emitting([PRODUCE, "produce_wood_wooden_axe"])
                .shared(),
                method_fn("hand_wood", |_, task| {
                    (task.symbol_arg(0)? == "wood")
                        .then(|| vec![Task::new("produce_wood_hand", task.agent())])
                })
                .emitting(["produce_wood_hand"])
                .shared(),
                method_fn("craft", |_, task| {
                    let item = task.symbol_arg(0)?;
                    (item != "wood").then(|| vec![Task::new(&produce_task_name(item), task.agent())])
                })
                .emitting(crafted)
                .shared(),
            ],
        )?;
        Ok(domain)
    }

    fn initial_state(&self, agent: &str, time: u64) -> WorldState {
        let mut state = WorldState::with_time(agent, time);
        for item in ITEMS {
            state.declare(item, agent);
        }
        state.set_flag(MADE_WOODEN_AXE, agent, false);
        state.set_flag(MADE_BENCH, agent, false);
        state
    }

    fn goals(&self, agent: &str) -> Vec<Task> {
        vec![have_enough(agent, "wood", self.wood)]
    }

    fn pruning_hook(&self, settings: &PrunerSettings) -> Arc<dyn PruneHook> {
        Arc::new(
            CraftingPruner::new(TOOLS)
                .with_depth_ceiling(settings.depth_ceiling)
                .with_repeat_window(settings.repeat_window),
        )
    }
}
