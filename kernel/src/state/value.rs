//! Attribute values: unsigned counts and boolean flags.

/// A single attribute value for one agent.
///
/// Counts are unsigned, so a state can never *hold* a negative quantity.
/// Operators are still required to check before subtracting; the type only
/// turns a missed check into a reported failure instead of a silent wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    /// Integer resource quantity.
    Count(u64),
    /// Boolean fact (e.g., "has made a bench").
    Flag(bool),
}

impl Value {
    /// The value unset attributes read as.
    pub const ZERO: Self = Self::Count(0);

    /// Numeric view: counts as-is, flags as 0/1.
    #[must_use]
    pub const fn as_count(self) -> u64 {
        match self {
            Self::Count(n) => n,
            Self::Flag(true) => 1,
            Self::Flag(false) => 0,
        }
    }

    /// Boolean view: flags as-is, counts as `n > 0`.
    #[must_use]
    pub const fn as_flag(self) -> bool {
        match self {
            Self::Count(n) => n > 0,
            Self::Flag(b) => b,
        }
    }

    /// JSON projection used for canonical hashing.
    #[must_use]
    pub fn to_json(self) -> serde_json::Value {
        match self {
            Self::Count(n) => serde_json::Value::from(n),
            Self::Flag(b) => serde_json::Value::Bool(b),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Self::Count(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n}"),
            Self::Flag(b) => write!(f, "{b}"),
        }
    }
}
