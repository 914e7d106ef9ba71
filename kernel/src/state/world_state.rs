//! `WorldState`: the versioned (attribute, agent) -> value store.
//!
//! # Layout
//!
//! `attribute name -> agent identity -> Value`, both levels `BTreeMap` so
//! iteration, display, and hashing are deterministic.
//!
//! # Snapshot semantics
//!
//! The maps live behind an `Arc`. [`WorldState::snapshot`] is a pointer
//! copy; the first write through either copy clones the maps
//! (`Arc::make_mut`). A search branch can therefore hold its own state
//! without ever observing writes made by a sibling branch.
//!
//! # Defaults
//!
//! Reading an attribute that was never set yields [`Value::ZERO`]
//! (`count == 0`, `flag == false`). [`WorldState::declare`] makes that
//! default explicit and visible in the fingerprint.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::proof::canon::{canonical_json_bytes, CanonError};
use crate::proof::hash::{canonical_hash, ContentHash, HashDomain};
use crate::state::value::Value;

/// The attribute name of the time budget.
pub const TIME: &str = "time";

type AgentValues = BTreeMap<String, Value>;

/// One `(attribute, agent)` entry that differs between two states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub attribute: String,
    pub agent: String,
    pub before: Value,
    pub after: Value,
}

/// Attribute/agent value store with copy-on-write snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorldState {
    attributes: Arc<BTreeMap<String, AgentValues>>,
}

impl WorldState {
    /// Create an empty state. Every read returns [`Value::ZERO`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a state holding only a time budget for `agent`.
    #[must_use]
    pub fn with_time(agent: &str, time: u64) -> Self {
        let mut state = Self::new();
        state.set_count(TIME, agent, time);
        state
    }

    /// Read a value, defaulting to [`Value::ZERO`].
    #[must_use]
    pub fn get(&self, attribute: &str, agent: &str) -> Value {
        self.attributes
            .get(attribute)
            .and_then(|agents| agents.get(agent))
            .copied()
            .unwrap_or_default()
    }

    /// Numeric view of [`WorldState::get`].
    #[must_use]
    pub fn count(&self, attribute: &str, agent: &str) -> u64 {
        self.get(attribute, agent).as_count()
    }

    /// Boolean view of [`WorldState::get`].
    #[must_use]
    pub fn flag(&self, attribute: &str, agent: &str) -> bool {
        self.get(attribute, agent).as_flag()
    }

    /// Remaining time budget for `agent`.
    #[must_use]
    pub fn time(&self, agent: &str) -> u64 {
        self.count(TIME, agent)
    }

    /// Whether the attribute has an explicit entry for `agent`.
    #[must_use]
    pub fn is_declared(&self, attribute: &str, agent: &str) -> bool {
        self.attributes
            .get(attribute)
            .is_some_and(|agents| agents.contains_key(agent))
    }

    /// Write a value. Clones the underlying maps if they are shared.
    pub fn set(&mut self, attribute: &str, agent: &str, value: impl Into<Value>) {
        Arc::make_mut(&mut self.attributes)
            .entry(attribute.to_string())
            .or_default()
            .insert(agent.to_string(), value.into());
    }

    /// Write a count.
    pub fn set_count(&mut self, attribute: &str, agent: &str, n: u64) {
        self.set(attribute, agent, Value::Count(n));
    }

    /// Write a flag.
    pub fn set_flag(&mut self, attribute: &str, agent: &str, b: bool) {
        self.set(attribute, agent, Value::Flag(b));
    }

    /// Explicitly initialise an attribute to zero for `agent`, leaving an
    /// existing value untouched.
    pub fn declare(&mut self, attribute: &str, agent: &str) {
        if !self.is_declared(attribute, agent) {
            self.set(attribute, agent, Value::ZERO);
        }
    }

    /// Cheap copy sharing storage until either side writes.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Whether two states still share storage (no write since the snapshot).
    #[must_use]
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.attributes, &other.attributes)
    }

    /// Iterate `(attribute, agent, value)` in sorted order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, Value)> {
        self.attributes.iter().flat_map(|(attribute, agents)| {
            agents
                .iter()
                .map(move |(agent, value)| (attribute.as_str(), agent.as_str(), *value))
        })
    }

    /// Sorted attribute names.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    /// Every `(attribute, agent)` whose value differs between `self` and
    /// `after`. Missing entries compare as [`Value::ZERO`], so declaring an
    /// attribute at zero is not a change.
    #[must_use]
    pub fn diff(&self, after: &Self) -> Vec<StateChange> {
        let mut keys: Vec<(&str, &str)> = self.entries().map(|(a, g, _)| (a, g)).collect();
        keys.extend(after.entries().map(|(a, g, _)| (a, g)));
        keys.sort_unstable();
        keys.dedup();

        keys.into_iter()
            .filter_map(|(attribute, agent)| {
                let before = self.get(attribute, agent);
                let after_value = after.get(attribute, agent);
                (before != after_value).then(|| StateChange {
                    attribute: attribute.to_string(),
                    agent: agent.to_string(),
                    before,
                    after: after_value,
                })
            })
            .collect()
    }

    /// JSON projection: `{attribute: {agent: value}}`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .attributes
            .iter()
            .map(|(attribute, agents)| {
                let inner: serde_json::Map<String, serde_json::Value> = agents
                    .iter()
                    .map(|(agent, value)| (agent.clone(), value.to_json()))
                    .collect();
                (attribute.clone(), serde_json::Value::Object(inner))
            })
            .collect();
        serde_json::Value::Object(map)
    }

    /// Canonical fingerprint of the full state.
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if canonical serialization fails (not possible
    /// for integer/boolean values, but the canonicalizer is fallible).
    pub fn fingerprint(&self) -> Result<ContentHash, CanonError> {
        let bytes = canonical_json_bytes(&self.to_json())?;
        Ok(canonical_hash(HashDomain::WorldState, &bytes))
    }
}

impl std::fmt::Display for WorldState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (attribute, agent, value) in self.entries() {
            writeln!(f, "{attribute}.{agent} = {value}")?;
        }
        Ok(())
    }
}
