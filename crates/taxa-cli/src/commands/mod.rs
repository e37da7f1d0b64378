//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function writing its
//! results to the given output.

pub mod create;
pub mod custom;
pub mod lineage;
