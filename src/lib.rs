//! Platform Uptime - availability measurements for a PaaS under change
//!
//! Platform Uptime runs a battery of periodic measurements against a platform
//! (HTTP routing, app pushes, log fetching and streaming, app stats, TCP
//! routing, syslog drains) while an operator workload such as a platform
//! upgrade executes, then reports every measurement's failures against a budget.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and port traits
//! - **Service Layer** (`services`): measurements, the periodic scheduler and
//!   the orchestrator
//! - **Adapters** (`adapters`): command generation for the platform CLI
//! - **Infrastructure Layer** (`infrastructure`): clocks, process runner,
//!   HTTP client, config loading, logging and the RFC-5424 codec
//! - **CLI Layer** (`cli`): argument parsing and the run lifecycle
//!
//! # Example
//!
//! ```ignore
//! use platform_uptime::cli::{self, Cli};
//!
//! #[tokio::main]
//! async fn main() {
//!     let cli = Cli::parse_normalized(std::env::args());
//!     std::process::exit(cli::run::execute(cli).await);
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    AllowedFailures, CommandSpec, Config, MeasurementKind, MeasurementReport, ResultSet,
    RunReport, SampleOutcome,
};
pub use domain::ports::{BaseMeasurement, Clock, CommandRunner, HttpClient, OutputSink, Ticker};
pub use infrastructure::clock::{ManualClock, SystemClock};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::process::{ProcessRunner, SharedBuffer};
pub use services::{AppLogValidator, Orchestrator, PeriodicMeasurement};
