//! World implementations for the harness runner.

pub mod axe_camp;
pub mod recipe_world;
pub mod wood_chop;
