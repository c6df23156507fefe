//! Argument vectors for the `cf` CLI.

use std::path::{Path, PathBuf};

use crate::domain::models::CommandSpec;

const CF: &str = "cf";

/// Builds `cf` commands bound to one `CF_HOME`.
///
/// Measurements run concurrently, so each gets its own home directory and therefore
/// its own login session and target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CfCommandGenerator {
    cf_home: PathBuf,
}

impl CfCommandGenerator {
    pub fn new(cf_home: impl Into<PathBuf>) -> Self {
        Self {
            cf_home: cf_home.into(),
        }
    }

    pub fn cf_home(&self) -> &Path {
        &self.cf_home
    }

    fn cf(&self) -> CommandSpec {
        CommandSpec::new(CF).env("CF_HOME", self.cf_home.display().to_string())
    }

    pub fn api(&self, url: &str, skip_ssl_validation: bool) -> CommandSpec {
        let cmd = self.cf().args(["api", url]);
        if skip_ssl_validation {
            cmd.arg("--skip-ssl-validation")
        } else {
            cmd
        }
    }

    pub fn auth(&self, user: &str, password: &str) -> CommandSpec {
        self.cf().args(["auth", user]).secret_arg(password)
    }

    pub fn create_org(&self, org: &str) -> CommandSpec {
        self.cf().args(["create-org", org])
    }

    pub fn create_space(&self, org: &str, space: &str) -> CommandSpec {
        self.cf().args(["create-space", space, "-o", org])
    }

    pub fn target(&self, org: &str, space: &str) -> CommandSpec {
        self.cf().args(["target", "-o", org, "-s", space])
    }

    pub fn push(&self, app: &str, path: &str) -> CommandSpec {
        self.cf().args(["push", app, "-p", path])
    }

    /// Push without the default HTTP route, for apps reached over TCP.
    pub fn push_no_route(&self, app: &str, path: &str) -> CommandSpec {
        self.push(app, path).arg("--no-route")
    }

    pub fn map_tcp_route(&self, app: &str, domain: &str, port: u16) -> CommandSpec {
        self.cf()
            .args(["map-route", app, domain, "--port"])
            .arg(port.to_string())
    }

    pub fn recent_logs(&self, app: &str) -> CommandSpec {
        self.cf().args(["logs", app, "--recent"])
    }

    /// Tail an app's logs. Runs until cancelled.
    pub fn stream_logs(&self, app: &str) -> CommandSpec {
        self.cf().args(["logs", app])
    }

    pub fn app_stats(&self, app: &str) -> CommandSpec {
        self.cf().args(["app", app])
    }

    pub fn delete(&self, app: &str) -> CommandSpec {
        self.cf().args(["delete", app, "-f", "-r"])
    }

    pub fn delete_org(&self, org: &str) -> CommandSpec {
        self.cf().args(["delete-org", org, "-f"])
    }

    pub fn log_out(&self) -> CommandSpec {
        self.cf().arg("logout")
    }

    pub fn create_user_provided_service(&self, name: &str, syslog_url: &str) -> CommandSpec {
        self.cf()
            .args(["create-user-provided-service", name, "-l", syslog_url])
    }

    pub fn bind_service(&self, app: &str, service: &str) -> CommandSpec {
        self.cf().args(["bind-service", app, service])
    }

    pub fn restage(&self, app: &str) -> CommandSpec {
        self.cf().args(["restage", app])
    }
}
