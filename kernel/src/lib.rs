//! Trellis Kernel: world state, tasks, and the operator/method contracts of
//! the HTN planner.
//!
//! # API Surface
//!
//! - [`state::world_state::WorldState`] -- the attribute/agent value store
//! - [`task::Task`] and [`plan::Plan`] -- the symbolic task model
//! - [`domain::Domain`] -- the registry binding task names to methods and
//!   primitive names to operators
//! - [`operators::apply::apply`] -- apply one operator to a state, atomically
//!
//! # Module Dependency Direction
//!
//! `proof` ← `state` ← `task`/`plan` ← `method`/`operators` ← `domain`
//!
//! One-way only. No cycles. `proof` depends on nothing internal.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod domain;
pub mod method;
pub mod operators;
pub mod plan;
pub mod proof;
pub mod state;
pub mod task;
