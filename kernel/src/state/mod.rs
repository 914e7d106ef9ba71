//! State module: the attribute/agent value store every search branch owns.
//!
//! This is the foundational layer. Only `proof` is imported here.

pub mod value;
pub mod world_state;
