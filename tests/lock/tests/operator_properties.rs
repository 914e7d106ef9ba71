//! Property tests for operator application:
//!
//! - a failed application leaves the state identical, field by field;
//! - a successful one changes each attribute by exactly the declared net
//!   amount, debits exactly the declared time and touches nothing else;
//! - along any chain of successful applications the state equals the
//!   initial state plus the summed net effects.

use std::collections::BTreeMap;

use proptest::prelude::*;
use trellis_kernel::operators::apply::apply;
use trellis_kernel::operators::resource::{ResourceOperator, ResourceRule};
use trellis_kernel::state::world_state::{WorldState, TIME};
use trellis_kernel::task::Task;

const AGENT: &str = "agent";
const ATTRS: [&str; 4] = ["wood", "plank", "stick", "ore"];

fn amounts() -> impl Strategy<Value = BTreeMap<&'static str, u64>> {
    prop::collection::btree_map(prop::sample::select(ATTRS.to_vec()), 1u64..6, 0..3)
}

fn rule_strategy() -> impl Strategy<Value = ResourceRule> {
    (amounts(), amounts(), amounts(), 0u64..5).prop_map(|(requires, consumes, produces, time)| {
        let mut rule = ResourceRule::new(time);
        for (attribute, n) in requires {
            rule = rule.requires(attribute, n);
        }
        for (attribute, n) in consumes {
            rule = rule.consumes(attribute, n);
        }
        for (attribute, n) in produces {
            rule = rule.produces(attribute, n);
        }
        rule
    })
}

fn state_strategy() -> impl Strategy<Value = WorldState> {
    (prop::collection::vec(0u64..8, ATTRS.len()), 0u64..12).prop_map(|(counts, time)| {
        let mut state = WorldState::with_time(AGENT, time);
        for (attribute, n) in ATTRS.iter().zip(counts) {
            state.set_count(attribute, AGENT, n);
        }
        state
    })
}

fn satisfiable(rule: &ResourceRule, state: &WorldState) -> bool {
    rule.requires.iter().all(|(a, &n)| state.count(a, AGENT) >= n)
        && rule.consumes.iter().all(|(a, &n)| state.count(a, AGENT) >= n)
        && state.time(AGENT) >= rule.time
}

proptest! {
    #[test]
    fn failure_leaves_state_identical(rule in rule_strategy(), state in state_strategy()) {
        let before = state.clone();
        let op = ResourceOperator::new("op_craft", rule.clone());
        let result = apply(&state, &Task::new("op_craft", AGENT), &op);

        prop_assert_eq!(result.is_ok(), satisfiable(&rule, &state));
        prop_assert_eq!(&state, &before);
        prop_assert!(before.diff(&state).is_empty());
    }

    #[test]
    fn success_changes_exactly_the_declared_amounts(rule in rule_strategy(), state in state_strategy()) {
        let op = ResourceOperator::new("op_craft", rule.clone());
        let Ok(after) = apply(&state, &Task::new("op_craft", AGENT), &op) else {
            return Ok(());
        };

        let net = rule.net_effect();
        for attribute in ATTRS.iter().copied().chain([TIME]) {
            let expected = i128::from(state.count(attribute, AGENT))
                + net.get(attribute).copied().unwrap_or(0);
            prop_assert_eq!(i128::from(after.count(attribute, AGENT)), expected, "{}", attribute);
        }
        for change in state.diff(&after) {
            prop_assert_eq!(change.agent.as_str(), AGENT);
            prop_assert!(
                ATTRS.contains(&change.attribute.as_str()) || change.attribute == TIME,
                "unexpected change to {}", change.attribute
            );
        }
    }

    #[test]
    fn chains_conserve_resources(
        rules in prop::collection::vec(rule_strategy(), 1..8),
        state in state_strategy(),
    ) {
        let mut current = state.clone();
        let mut totals: BTreeMap<&str, i128> = BTreeMap::new();
        for rule in &rules {
            let op = ResourceOperator::new("op_step", rule.clone());
            if let Ok(next) = apply(&current, &Task::new("op_step", AGENT), &op) {
                for (attribute, delta) in rule.net_effect() {
                    *totals.entry(attribute).or_default() += delta;
                }
                current = next;
            }
        }
        for attribute in ATTRS.iter().copied().chain([TIME]) {
            let expected = i128::from(state.count(attribute, AGENT))
                + totals.get(attribute).copied().unwrap_or(0);
            prop_assert!(expected >= 0);
            prop_assert_eq!(i128::from(current.count(attribute, AGENT)), expected);
        }
    }
}
