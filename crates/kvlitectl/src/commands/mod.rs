//! Subcommand implementations.

pub mod maintenance;
pub mod read;
pub mod write;
