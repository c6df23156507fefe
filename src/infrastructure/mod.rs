//! Infrastructure layer module
//!
//! This module contains the concrete implementations behind the domain ports
//! and the ambient plumbing:
//! - Clocks (wall clock and a manually advanced clock for tests)
//! - Process runner with shared and per-measurement output sinks
//! - HTTP client for availability requests
//! - Configuration management
//! - Logging infrastructure
//! - RFC-5424 syslog codec used by the syslog sink app
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod clock;
pub mod config;
pub mod http;
pub mod logging;
pub mod process;
pub mod syslog;
