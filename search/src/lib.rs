//! Trellis Search: depth-first HTN decomposition with backtracking.
//!
//! This crate provides the search layer. It depends only on
//! `trellis_kernel`; it does NOT depend on `trellis_harness`.
//!
//! # Crate dependency graph
//!
//! ```text
//! trellis_kernel  <-  trellis_search  <-  trellis_harness
//! (state, registry)   (agenda, search)    (recipes, pruner, config)
//! ```
//!
//! # Key types
//!
//! - [`planner::Planner`]: facade holding a frozen domain, a pruning hook
//!   and a policy
//! - [`search::seek_plan`]: the explicit choice-point search loop
//! - [`prune::PruneHook`]: pluggable pruning predicate
//! - [`policy::PlanPolicy`]: step, depth and wall-clock budgets
//! - [`outcome::PlanOutcome`] / [`error::PlanningFailure`]: the two results

#![forbid(unsafe_code)]

pub mod agenda;
pub mod choice;
pub mod decompose;
pub mod error;
pub mod event;
pub mod outcome;
pub mod planner;
pub mod policy;
pub mod prune;
pub mod search;
