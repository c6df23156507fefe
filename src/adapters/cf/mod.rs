//! Cloud Foundry CLI adapter.
//!
//! Pure command construction: nothing here runs a process or parses CLI
//! output.

pub mod cmd_generator;
pub mod workflow;

pub use cmd_generator::CfCommandGenerator;
pub use workflow::CfWorkflow;
