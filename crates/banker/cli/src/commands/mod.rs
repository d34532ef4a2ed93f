//! Subcommand implementations

pub mod inspect;
pub mod mutate;
pub mod run;
