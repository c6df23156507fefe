//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces the measurement core depends on:
//! - Clock / Ticker: time source and periodic ticks
//! - CommandRunner / OutputSink: external process execution
//! - HttpClient: HTTP availability requests
//! - BaseMeasurement: the single-sample measurement contract
//!
//! Keeping these behind traits lets every timing and failure path be driven
//! by fakes in tests.

pub mod clock;
pub mod command_runner;
pub mod http_client;
pub mod measurement;

pub use clock::{Clock, Ticker};
pub use command_runner::{CommandRunner, OutputSink};
pub use http_client::HttpClient;
pub use measurement::BaseMeasurement;
