use std::path::Path;

use figment::providers::{Env, Format, Json, Serialized};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to load config from {path}: {source}")]
    Extract {
        path: String,
        #[source]
        source: Box<figment::Error>,
    },

    #[error("`cf.{0}` must be set")]
    MissingField(&'static str),

    #[error("`cf.tcp_domain` and `cf.tcp_port` must be set in order to run TCP Availability tests")]
    TcpAvailabilityIncomplete,

    #[error(
        "`cf.tcp_domain` and `cf.available_port` must be set in order to run App Syslog Availability tests"
    )]
    SyslogAvailabilityIncomplete,

    #[error("At least one `while` command must be configured")]
    NoWhileCommand,

    #[error("`while` command at position {0} has an empty executable")]
    EmptyWhileCommand(usize),

    #[error("Invalid measurement_period_secs: {0}. Must be at least 1")]
    InvalidMeasurementPeriod(u64),

    #[error("Invalid stream_logs_timeout_secs: {0}. Must be at least 1")]
    InvalidStreamLogsTimeout(u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

/// Environment variable prefix for overrides, e.g.
/// `PLATFORM_UPTIME_CF__ADMIN_PASSWORD`.
pub const ENV_PREFIX: &str = "PLATFORM_UPTIME_";

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load, validate and complete the configuration at `path`.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. The JSON config file
    /// 3. Environment variables (`PLATFORM_UPTIME_*`, `__` for nesting)
    ///
    /// Org, space and app names the file leaves empty are generated.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Json::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|source| ConfigError::Extract {
                path: path.display().to_string(),
                source: Box::new(source),
            })?;

        Self::validate(&config)?;
        Ok(config.with_generated_names())
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let cf = &config.cf;
        for (field, value) in [
            ("api", &cf.api),
            ("app_domain", &cf.app_domain),
            ("admin_user", &cf.admin_user),
            ("admin_password", &cf.admin_password),
        ] {
            if value.is_empty() {
                return Err(ConfigError::MissingField(field));
            }
        }

        if config.optional_tests.run_tcp_availability
            && (cf.tcp_domain.is_empty() || cf.tcp_port == 0)
        {
            return Err(ConfigError::TcpAvailabilityIncomplete);
        }

        if config.optional_tests.run_app_syslog_availability
            && (cf.tcp_domain.is_empty() || cf.available_port == 0)
        {
            return Err(ConfigError::SyslogAvailabilityIncomplete);
        }

        if config.while_commands.is_empty() {
            return Err(ConfigError::NoWhileCommand);
        }
        if let Some(position) = config
            .while_commands
            .iter()
            .position(|cmd| cmd.command.trim().is_empty())
        {
            return Err(ConfigError::EmptyWhileCommand(position));
        }

        if config.measurement_period_secs == 0 {
            return Err(ConfigError::InvalidMeasurementPeriod(
                config.measurement_period_secs,
            ));
        }
        if config.stream_logs_timeout_secs == 0 {
            return Err(ConfigError::InvalidStreamLogsTimeout(
                config.stream_logs_timeout_secs,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::WhileCommand;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.cf.api = "api.example.com".to_string();
        config.cf.app_domain = "apps.example.com".to_string();
        config.cf.admin_user = "admin".to_string();
        config.cf.admin_password = "secret".to_string();
        config.while_commands = vec![WhileCommand {
            command: "sleep".to_string(),
            command_args: vec!["1".to_string()],
        }];
        config
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(ConfigLoader::validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_missing_api() {
        let mut config = valid_config();
        config.cf.api = String::new();

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::MissingField("api"))
        ));
    }

    #[test]
    fn test_validate_tcp_availability_requires_domain_and_port() {
        let mut config = valid_config();
        config.optional_tests.run_tcp_availability = true;
        config.cf.tcp_domain = "tcp.example.com".to_string();

        let err = ConfigLoader::validate(&config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "`cf.tcp_domain` and `cf.tcp_port` must be set in order to run TCP Availability tests"
        );

        config.cf.tcp_port = 1025;
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_validate_syslog_availability_requires_domain_and_available_port() {
        let mut config = valid_config();
        config.optional_tests.run_app_syslog_availability = true;
        config.cf.available_port = 1030;

        let err = ConfigLoader::validate(&config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "`cf.tcp_domain` and `cf.available_port` must be set in order to run App Syslog Availability tests"
        );

        config.cf.tcp_domain = "tcp.example.com".to_string();
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_validate_tcp_settings_ignored_when_tcp_disabled() {
        let mut config = valid_config();
        config.cf.tcp_port = 1025;
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_validate_requires_while_command() {
        let mut config = valid_config();
        config.while_commands.clear();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::NoWhileCommand)
        ));

        config.while_commands.push(WhileCommand::default());
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyWhileCommand(0))
        ));
    }

    #[test]
    fn test_validate_zero_period() {
        let mut config = valid_config();
        config.measurement_period_secs = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMeasurementPeriod(0))
        ));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = valid_config();
        config.logging.level = "loud".to_string();

        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidLogLevel(level)) => assert_eq!(level, "loud"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let result = ConfigLoader::load_from_file("/definitely/not/here.json");
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }
}
