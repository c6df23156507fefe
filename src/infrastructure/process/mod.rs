//! Process execution infrastructure
//!
//! - `ProcessRunner`: sequential command execution with streamed output
//! - `SharedBuffer` / `ConsoleSink`: thread-safe output sinks

pub mod runner;
pub mod sink;

pub use runner::ProcessRunner;
pub use sink::{CapturedOutput, ConsoleSink, SharedBuffer};
