//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - Bracketed UTC timestamps on human-readable output
//! - Text, JSON or pretty stdout formats
//! - Optional JSON log files with rotation

pub mod logger;
pub mod timer;

pub use logger::LoggerImpl;
pub use timer::BracketedUtcTime;
