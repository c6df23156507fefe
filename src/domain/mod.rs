//! Domain layer for platform availability measurement
//!
//! This module contains the measurement models, the error taxonomy and the
//! port traits the infrastructure implements.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{HttpClientError, OrchestratorError, RunnerError, ValidatorError};
