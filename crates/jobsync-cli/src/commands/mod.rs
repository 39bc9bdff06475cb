//! Subcommand implementations.

pub mod encode;
pub mod fetch;
pub mod keys;
pub mod known;
pub mod run;
