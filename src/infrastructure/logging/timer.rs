use std::fmt;

use chrono::Utc;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

/// Renders the event time as `[2017-01-01T00:00:00.000Z]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BracketedUtcTime;

impl FormatTime for BracketedUtcTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "[{}]", Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"))
    }
}
