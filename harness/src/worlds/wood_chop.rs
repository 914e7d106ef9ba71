//! `WoodChop`: the smallest resource world.
//!
//! One operator, `op_chop` (wood +1, costs 4 time), reached through the
//! stock `have_enough` / `produce` methods. Needs no pruning: every
//! recursion pays time, so the time budget bounds it.

use trellis_kernel::domain::Domain;
use trellis_kernel::method::method_fn;
use trellis_kernel::operators::resource::{ResourceOperator, ResourceRule};
use trellis_kernel::state::world_state::WorldState;
use trellis_kernel::task::Task;

use crate::contract::{PlanningWorld, WorldError};
use crate::stock::{have_enough, register_stock_methods};

pub const CHOP_TIME: u64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WoodChop {
    /// Wood the goal asks for.
    pub wood: u64,
}

impl WoodChop {
    #[must_use]
    pub fn new(wood: u64) -> Self {
        Self { wood }
    }
}

impl PlanningWorld for WoodChop {
    fn world_id(&self) -> &str {
        "wood_chop"
    }

    fn domain(&self) -> Result<Domain, WorldError> {
        let mut domain = Domain::new("wood_chop");
        domain.register_operator(
            "op_chop",
            ResourceOperator::new("op_chop", ResourceRule::new(CHOP_TIME).produces("wood", 1))
                .shared(),
        )?;
        domain.register_methods(
            "produce_wood",
            vec![method_fn("chop", |_, task| Some(vec![Task::new("op_chop", task.agent())]))
                .emitting(["op_chop"])
                .shared()],
        )?;
        register_stock_methods(&mut domain, ["wood"])?;
        Ok(domain)
    }

    fn initial_state(&self, agent: &str, time: u64) -> WorldState {
        let mut state = WorldState::with_time(agent, time);
        state.declare("wood", agent);
        state
    }

    fn goals(&self, agent: &str) -> Vec<Task> {
        vec![have_enough(agent, "wood", self.wood)]
    }
}
