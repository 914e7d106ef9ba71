//! Proof module: canonical JSON and domain-separated hashing.
//!
//! Nothing else in the kernel defines a digest. State fingerprints, plan
//! digests, and registry digests all route through here.

pub mod canon;
pub mod hash;
pub mod hash_domain;
