use std::fmt;

/// The measurement variants a run can schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementKind {
    HttpAvailability,
    AppPushability,
    RecentLogs,
    StreamingLogs,
    AppStats,
    TcpAvailability,
    AppSyslogAvailability,
}

impl MeasurementKind {
    pub const ALL: [Self; 7] = [
        Self::HttpAvailability,
        Self::AppPushability,
        Self::RecentLogs,
        Self::StreamingLogs,
        Self::AppStats,
        Self::TcpAvailability,
        Self::AppSyslogAvailability,
    ];

    /// Name used in summaries and as the failure budget identity.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::HttpAvailability => "HTTP availability",
            Self::AppPushability => "App pushability",
            Self::RecentLogs => "Recent logs fetching",
            Self::StreamingLogs => "Streaming logs",
            Self::AppStats => "App stats",
            Self::TcpAvailability => "TCP availability",
            Self::AppSyslogAvailability => "App syslog availability",
        }
    }

    /// Key used under `allowed_failures` in the config file.
    pub const fn config_key(self) -> &'static str {
        match self {
            Self::HttpAvailability => "http_availability",
            Self::AppPushability => "app_pushability",
            Self::RecentLogs => "recent_logs",
            Self::StreamingLogs => "streaming_logs",
            Self::AppStats => "app_stats",
            Self::TcpAvailability => "tcp_availability",
            Self::AppSyslogAvailability => "app_syslog_availability",
        }
    }

    pub fn from_config_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.config_key() == key)
    }
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_keys_round_trip() {
        for kind in MeasurementKind::ALL {
            assert_eq!(MeasurementKind::from_config_key(kind.config_key()), Some(kind));
        }
        assert_eq!(MeasurementKind::from_config_key("nope"), None);
    }

    #[test]
    fn test_display_uses_summary_name() {
        assert_eq!(MeasurementKind::AppPushability.to_string(), "App pushability");
    }
}
