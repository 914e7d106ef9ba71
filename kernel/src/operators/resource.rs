//! Declarative resource operators: requires / consumes / produces / time.
//!
//! Check order is fixed: required minimums, then consumed quantities, then
//! the time budget. Every check runs before the first write, so a failing
//! operator cannot leave a partially debited state behind.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::operators::operator::{Operator, OperatorFailure};
use crate::state::world_state::{WorldState, TIME};
use crate::task::Task;

/// Declared effect of a resource operator.
///
/// `requires` are minimum levels that are checked but not consumed (tools,
/// workbenches). `consumes` are debited, `produces` are credited, and `time`
/// is debited from the [`TIME`] attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceRule {
    pub requires: BTreeMap<String, u64>,
    pub consumes: BTreeMap<String, u64>,
    pub produces: BTreeMap<String, u64>,
    pub time: u64,
}

impl ResourceRule {
    /// A rule with only a time cost.
    #[must_use]
    pub fn new(time: u64) -> Self {
        Self {
            time,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn requires(mut self, attribute: &str, n: u64) -> Self {
        self.requires.insert(attribute.to_string(), n);
        self
    }

    #[must_use]
    pub fn consumes(mut self, attribute: &str, n: u64) -> Self {
        self.consumes.insert(attribute.to_string(), n);
        self
    }

    #[must_use]
    pub fn produces(mut self, attribute: &str, n: u64) -> Self {
        self.produces.insert(attribute.to_string(), n);
        self
    }

    /// Check every precondition against `state` for `agent`.
    ///
    /// # Errors
    ///
    /// Returns the first failing check, in requires/consumes/time order.
    pub fn check(&self, state: &WorldState, agent: &str) -> Result<(), OperatorFailure> {
        for (attribute, &required) in &self.requires {
            let available = state.count(attribute, agent);
            if available < required {
                return Err(OperatorFailure::RequirementNotMet {
                    attribute: attribute.clone(),
                    required,
                    available,
                });
            }
        }
        for (attribute, &needed) in &self.consumes {
            let available = state.count(attribute, agent);
            if available < needed {
                return Err(OperatorFailure::InsufficientResource {
                    attribute: attribute.clone(),
                    needed,
                    available,
                });
            }
        }
        let available = state.time(agent);
        if available < self.time {
            return Err(OperatorFailure::InsufficientTime {
                needed: self.time,
                available,
            });
        }
        Ok(())
    }

    /// Net change per attribute (produced minus consumed, time debited).
    ///
    /// Attributes whose net change is zero are still listed, because the
    /// rule touches them.
    #[must_use]
    pub fn net_effect(&self) -> BTreeMap<&str, i128> {
        let mut net: BTreeMap<&str, i128> = BTreeMap::new();
        for (attribute, &n) in &self.consumes {
            *net.entry(attribute.as_str()).or_default() -= i128::from(n);
        }
        for (attribute, &n) in &self.produces {
            *net.entry(attribute.as_str()).or_default() += i128::from(n);
        }
        *net.entry(TIME).or_default() -= i128::from(self.time);
        net
    }

    /// Check then apply. Returns a new state; `state` is only read.
    ///
    /// # Errors
    ///
    /// Returns the failing precondition, or
    /// [`OperatorFailure::ProductionOverflow`] if a credit would overflow.
    pub fn execute(&self, state: &WorldState, agent: &str) -> Result<WorldState, OperatorFailure> {
        self.check(state, agent)?;

        let mut next = state.snapshot();
        for (attribute, &n) in &self.consumes {
            // Checked above; `check` guarantees available >= n.
            let remaining = next.count(attribute, agent) - n;
            next.set_count(attribute, agent, remaining);
        }
        for (attribute, &n) in &self.produces {
            let total = next.count(attribute, agent).checked_add(n).ok_or_else(|| {
                OperatorFailure::ProductionOverflow {
                    attribute: attribute.clone(),
                }
            })?;
            next.set_count(attribute, agent, total);
        }
        let remaining = next.time(agent) - self.time;
        next.set_count(TIME, agent, remaining);
        Ok(next)
    }
}

/// An [`Operator`] defined entirely by a [`ResourceRule`].
#[derive(Debug, Clone)]
pub struct ResourceOperator {
    name: String,
    rule: ResourceRule,
}

impl ResourceOperator {
    #[must_use]
    pub fn new(name: &str, rule: ResourceRule) -> Self {
        Self {
            name: name.to_string(),
            rule,
        }
    }

    /// Finish building, as the shared handle the registry stores.
    #[must_use]
    pub fn shared(self) -> Arc<dyn Operator> {
        Arc::new(self)
    }
}

impl Operator for ResourceOperator {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, state: &WorldState, task: &Task) -> Result<WorldState, OperatorFailure> {
        self.rule.execute(state, task.agent())
    }

    fn rule(&self) -> Option<&ResourceRule> {
        Some(&self.rule)
    }
}
