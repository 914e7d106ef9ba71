//! Tasks: immutable symbolic tuples `(name, agent, ...args)`.
//!
//! Whether a task is primitive or compound is a naming convention, not a
//! type distinction: names beginning with [`PRIMITIVE_PREFIX`] are resolved
//! by operators, everything else by methods.
//!
//! Tasks are cloned on every decomposition, so all parts are reference
//! counted; a clone is three pointer bumps.

use std::sync::Arc;

/// Name prefix marking a primitive task.
pub const PRIMITIVE_PREFIX: &str = "op_";

/// A task argument.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Arg {
    /// Symbolic argument (item name, location, ...).
    Symbol(Arc<str>),
    /// Integer argument (quantity, ...).
    Int(u64),
}

impl Arg {
    /// JSON projection used for canonical hashing.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Symbol(s) => serde_json::Value::from(s.as_ref()),
            Self::Int(n) => serde_json::Value::from(*n),
        }
    }
}

impl std::fmt::Display for Arg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Symbol(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
        }
    }
}

/// Primitive or compound, derived from the task name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Resolved by exactly one operator name (possibly with variants).
    Primitive,
    /// Resolved by the registry's ordered method list.
    Compound,
}

/// An immutable task tuple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Task {
    name: Arc<str>,
    agent: Arc<str>,
    args: Arc<[Arg]>,
}

impl Task {
    /// A task with no arguments beyond the agent.
    #[must_use]
    pub fn new(name: &str, agent: &str) -> Self {
        Self {
            name: Arc::from(name),
            agent: Arc::from(agent),
            args: Arc::from(Vec::new()),
        }
    }

    /// A task with an explicit argument list.
    #[must_use]
    pub fn with_args(name: &str, agent: &str, args: Vec<Arg>) -> Self {
        Self {
            name: Arc::from(name),
            agent: Arc::from(agent),
            args: Arc::from(args),
        }
    }

    /// Append a symbolic argument.
    #[must_use]
    pub fn sym(self, value: &str) -> Self {
        self.push(Arg::Symbol(Arc::from(value)))
    }

    /// Append an integer argument.
    #[must_use]
    pub fn int(self, value: u64) -> Self {
        self.push(Arg::Int(value))
    }

    fn push(self, arg: Arg) -> Self {
        let mut args = self.args.to_vec();
        args.push(arg);
        Self {
            name: self.name,
            agent: self.agent,
            args: Arc::from(args),
        }
    }

    /// The task name (method table or operator key).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The agent identity the task is for.
    #[must_use]
    pub fn agent(&self) -> &str {
        &self.agent
    }

    /// Arguments after the agent.
    #[must_use]
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// The `i`th argument if it is a symbol.
    #[must_use]
    pub fn symbol_arg(&self, i: usize) -> Option<&str> {
        match self.args.get(i)? {
            Arg::Symbol(s) => Some(s),
            Arg::Int(_) => None,
        }
    }

    /// The `i`th argument if it is an integer.
    #[must_use]
    pub fn int_arg(&self, i: usize) -> Option<u64> {
        match self.args.get(i)? {
            Arg::Int(n) => Some(*n),
            Arg::Symbol(_) => None,
        }
    }

    /// Kind by naming convention.
    #[must_use]
    pub fn kind(&self) -> TaskKind {
        if is_primitive_name(&self.name) {
            TaskKind::Primitive
        } else {
            TaskKind::Compound
        }
    }

    /// Whether the name marks a primitive task.
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        self.kind() == TaskKind::Primitive
    }

    /// JSON projection: `[name, agent, args...]`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let mut items = Vec::with_capacity(2 + self.args.len());
        items.push(serde_json::Value::from(self.name.as_ref()));
        items.push(serde_json::Value::from(self.agent.as_ref()));
        items.extend(self.args.iter().map(Arg::to_json));
        serde_json::Value::Array(items)
    }
}

/// Whether a name follows the primitive naming convention.
#[must_use]
pub fn is_primitive_name(name: &str) -> bool {
    name.starts_with(PRIMITIVE_PREFIX)
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}", self.name, self.agent)?;
        for arg in self.args.iter() {
            write!(f, ", {arg}")?;
        }
        f.write_str(")")
    }
}
