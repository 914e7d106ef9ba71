//! Stock methods shared by resource domains: `have_enough` and `produce`.
//!
//! `have_enough(agent, item, n)` succeeds with nothing to do when the agent
//! already holds `n`; otherwise it produces one batch of `item` and checks
//! again. `produce(agent, item)` dispatches to `produce_<item>(agent)`,
//! which each domain defines with its own recipes.

use trellis_kernel::domain::{Domain, RegistryError};
use trellis_kernel::method::method_fn;
use trellis_kernel::task::Task;

pub const HAVE_ENOUGH: &str = "have_enough";
pub const PRODUCE: &str = "produce";

#[must_use]
pub fn have_enough(agent: &str, item: &str, n: u64) -> Task {
    Task::new(HAVE_ENOUGH, agent).sym(item).int(n)
}

#[must_use]
pub fn produce(agent: &str, item: &str) -> Task {
    Task::new(PRODUCE, agent).sym(item)
}

/// Name of the per-item production task.
#[must_use]
pub fn produce_task_name(item: &str) -> String {
    format!("{PRODUCE}_{item}")
}

/// `(item, n)` of a `have_enough` task.
#[must_use]
pub fn demand_of(task: &Task) -> Option<(&str, u64)> {
    if task.name() != HAVE_ENOUGH {
        return None;
    }
    Some((task.symbol_arg(0)?, task.int_arg(1)?))
}

/// Register `have_enough` and `produce`. `products` names every item with
/// a `produce_<item>` task, for registry validation.
///
/// # Errors
///
/// [`RegistryError`] if either task is already registered.
pub fn register_stock_methods<'a>(
    domain: &mut Domain,
    products: impl IntoIterator<Item = &'a str>,
) -> Result<(), RegistryError> {
    register_have_enough(domain)?;
    let emits: Vec<String> = products.into_iter().map(produce_task_name).collect();
    domain.register_methods(
        PRODUCE,
        vec![method_fn("produce_by_name", |_, task| {
            let item = task.symbol_arg(0)?;
            Some(vec![Task::new(&produce_task_name(item), task.agent())])
        })
        .emitting(emits)
        .shared()],
    )
}

/// Register only `have_enough`, for domains with their own `produce`.
///
/// # Errors
///
/// [`RegistryError::DuplicateTask`] if already registered.
pub fn register_have_enough(domain: &mut Domain) -> Result<(), RegistryError> {
    domain.register_methods(
        HAVE_ENOUGH,
        vec![
            method_fn("check_enough", |state, task| {
                let (item, n) = demand_of(task)?;
                (state.count(item, task.agent()) >= n).then(Vec::new)
            })
            .shared(),
            method_fn("produce_enough", |_, task| {
                let (item, _) = demand_of(task)?;
                Some(vec![produce(task.agent(), item), task.clone()])
            })
            .emitting([PRODUCE, HAVE_ENOUGH])
            .shared(),
        ],
    )
}
