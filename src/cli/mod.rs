//! Command-line interface: argument parsing and the run lifecycle.

pub mod run;
pub mod types;

pub use types::Cli;
