use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::command::CommandSpec;

/// Main configuration structure, loaded from the JSON config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Foreground commands whose execution defines the measurement window
    #[serde(default, rename = "while")]
    pub while_commands: Vec<WhileCommand>,

    /// Platform connection settings
    #[serde(default)]
    pub cf: CfConfig,

    /// Measurements that only run when explicitly enabled
    #[serde(default)]
    pub optional_tests: OptionalTests,

    /// Tolerated failure count per measurement, keyed by config key
    #[serde(default)]
    pub allowed_failures: HashMap<String, u32>,

    /// Seconds between tick-driven samples of every measurement
    #[serde(default = "default_measurement_period_secs")]
    pub measurement_period_secs: u64,

    /// Per-request timeout of the HTTP availability client
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Collection window of one streaming-logs sample
    #[serde(default = "default_stream_logs_timeout_secs")]
    pub stream_logs_timeout_secs: u64,

    /// Directory pushed as the measured app
    #[serde(default = "default_app_path")]
    pub app_path: String,

    /// Directory pushed as the TCP responder app
    #[serde(default = "default_tcp_app_path")]
    pub tcp_app_path: String,

    /// Directory pushed as the syslog sink app
    #[serde(default = "default_syslog_sink_path")]
    pub syslog_sink_path: String,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            while_commands: vec![],
            cf: CfConfig::default(),
            optional_tests: OptionalTests::default(),
            allowed_failures: HashMap::new(),
            measurement_period_secs: default_measurement_period_secs(),
            http_timeout_secs: default_http_timeout_secs(),
            stream_logs_timeout_secs: default_stream_logs_timeout_secs(),
            app_path: default_app_path(),
            tcp_app_path: default_tcp_app_path(),
            syslog_sink_path: default_syslog_sink_path(),
            logging: LoggingConfig::default(),
        }
    }
}

const fn default_measurement_period_secs() -> u64 {
    10
}

const fn default_http_timeout_secs() -> u64 {
    30
}

const fn default_stream_logs_timeout_secs() -> u64 {
    15
}

fn default_app_path() -> String {
    "./apps/http".to_string()
}

fn default_tcp_app_path() -> String {
    "./apps/tcp".to_string()
}

fn default_syslog_sink_path() -> String {
    "./apps/syslog-sink".to_string()
}

/// One entry of the `while` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhileCommand {
    pub command: String,
    #[serde(default)]
    pub command_args: Vec<String>,
}

impl WhileCommand {
    pub fn to_command(&self) -> CommandSpec {
        CommandSpec::new(&self.command).args(self.command_args.iter().cloned())
    }
}

/// Platform API, credentials and naming.
///
/// Empty strings and zero ports mean "not set", matching how the JSON file
/// omits optional keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CfConfig {
    pub api: String,
    pub app_domain: String,
    pub admin_user: String,
    pub admin_password: String,
    pub tcp_domain: String,
    pub tcp_port: u16,
    pub available_port: u16,
    pub org: String,
    pub space: String,
    pub app_name: String,
    pub skip_ssl_validation: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionalTests {
    pub run_tcp_availability: bool,
    pub run_app_syslog_availability: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Stdout format
    #[serde(default)]
    pub format: LogFormat,

    /// Directory for JSON log files (stdout only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// File rotation policy when `log_dir` is set
    #[serde(default)]
    pub rotation: RotationPolicy,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            log_dir: None,
            rotation: RotationPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
    Pretty,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

impl Config {
    /// Fill in org, space and app names the file left empty.
    pub fn with_generated_names(mut self) -> Self {
        if self.cf.org.is_empty() {
            self.cf.org = format!("uptime-org-{}", uuid::Uuid::new_v4());
        }
        if self.cf.space.is_empty() {
            self.cf.space = format!("uptime-space-{}", uuid::Uuid::new_v4());
        }
        if self.cf.app_name.is_empty() {
            self.cf.app_name = format!("uptime-app-{}", uuid::Uuid::new_v4());
        }
        self
    }

    pub fn while_commands(&self) -> Vec<CommandSpec> {
        self.while_commands
            .iter()
            .map(WhileCommand::to_command)
            .collect()
    }
}
