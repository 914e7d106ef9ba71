//! Trellis Harness: domains, pruners and configuration around the search.
//!
//! The harness turns domain data (recipe tables, hand-written worlds) into
//! a frozen [`trellis_kernel::domain::Domain`], installs a pruning hook,
//! runs the search and packages the result as a [`runner::PlanReport`].
//!
//! The harness does NOT implement search; it delegates to
//! `trellis_search`. Worlds provide domain data only; the runner owns
//! orchestration.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod contract;
pub mod pruner;
pub mod recipe;
pub mod runner;
pub mod stock;
pub mod worlds;
