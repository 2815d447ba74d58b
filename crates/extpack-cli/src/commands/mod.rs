//! Subcommand implementations.

pub mod completion;
pub mod name;
pub mod package;
