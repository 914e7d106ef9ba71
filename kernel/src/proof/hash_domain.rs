//! Typed domain separators for canonical hashing.
//!
//! Every digest selects a domain via [`HashDomain`]. Adding a domain is a
//! single change here: the enum, `as_bytes()`, `ALL`, and `Display` are all
//! generated from the same macro invocation.

/// Declares `HashDomain` enum, `as_bytes()`, `ALL`, and `Display` from one list.
macro_rules! define_hash_domains {
    (
        $(
            $(#[$meta:meta])*
            $variant:ident => $bytes:expr
        ),+ $(,)?
    ) => {
        /// Typed domain separator for [`super::hash::canonical_hash`].
        ///
        /// Every variant maps to a unique, null-terminated byte string used
        /// as a SHA-256 prefix.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum HashDomain {
            $(
                $(#[$meta])*
                $variant,
            )+
        }

        impl HashDomain {
            /// The raw domain-separator bytes (null-terminated).
            #[must_use]
            pub const fn as_bytes(&self) -> &'static [u8] {
                match self {
                    $( Self::$variant => $bytes, )+
                }
            }

            /// All domain variants in declaration order.
            pub const ALL: &[HashDomain] = &[
                $( Self::$variant, )+
            ];
        }

        impl core::fmt::Display for HashDomain {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                match self {
                    $( Self::$variant => write!(f, stringify!($variant)), )+
                }
            }
        }
    };
}

define_hash_domains! {
    /// `WorldState` fingerprints (determinism checks, event log).
    WorldState => b"TRELLIS::WORLD_STATE::V1\0",

    /// Plan digests (ordered grounded tasks plus final state).
    Plan => b"TRELLIS::PLAN::V1\0",

    /// Registry contents (task, method, and operator names).
    DomainRegistry => b"TRELLIS::DOMAIN_REGISTRY::V1\0",

    /// Recipe books loaded by the harness.
    RecipeBook => b"TRELLIS::RECIPE_BOOK::V1\0",
}
