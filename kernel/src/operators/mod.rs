//! Operators module: primitive state transitions and the `apply()` entry point.
//!
//! Depends on `state` and `task`. Does not import from `domain`.

pub mod apply;
pub mod operator;
pub mod resource;
