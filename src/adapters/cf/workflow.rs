//! Command sequences for each phase of a run.

use std::path::PathBuf;

use uuid::Uuid;

use super::cmd_generator::CfCommandGenerator;
use crate::domain::models::{CfConfig, CommandSpec, Config, OptionalTests};

/// Turns configuration into ready-to-run `cf` command sequences.
///
/// Every measurement-facing sequence starts by logging in and targeting the run's
/// org and space, so it works against a fresh `CF_HOME`.
#[derive(Clone)]
pub struct CfWorkflow {
    cf: CfConfig,
    optional_tests: OptionalTests,
    app_path: String,
    tcp_app_path: String,
    syslog_sink_path: String,
    generator: CfCommandGenerator,
}

impl CfWorkflow {
    /// `config` must already have its org, space and app names filled in.
    pub fn new(config: &Config, cf_home: impl Into<PathBuf>) -> Self {
        Self {
            cf: config.cf.clone(),
            optional_tests: config.optional_tests,
            app_path: config.app_path.clone(),
            tcp_app_path: config.tcp_app_path.clone(),
            syslog_sink_path: config.syslog_sink_path.clone(),
            generator: CfCommandGenerator::new(cf_home),
        }
    }

    /// Same workflow bound to another CLI home.
    pub fn with_cf_home(&self, cf_home: impl Into<PathBuf>) -> Self {
        Self {
            generator: CfCommandGenerator::new(cf_home),
            ..self.clone()
        }
    }

    pub const fn generator(&self) -> &CfCommandGenerator {
        &self.generator
    }

    pub fn app_name(&self) -> &str {
        &self.cf.app_name
    }

    pub fn app_url(&self) -> String {
        format!("http://{}.{}", self.cf.app_name, self.cf.app_domain)
    }

    pub fn tcp_app_name(&self) -> String {
        format!("{}-tcp", self.cf.app_name)
    }

    pub fn syslog_sink_name(&self) -> String {
        format!("{}-syslog-sink", self.cf.app_name)
    }

    pub fn syslog_drain_name(&self) -> String {
        format!("{}-syslog-drain", self.cf.app_name)
    }

    pub fn syslog_drain_url(&self) -> String {
        format!("syslog://{}:{}", self.cf.tcp_domain, self.cf.available_port)
    }

    /// `api` then `auth`.
    pub fn login(&self) -> Vec<CommandSpec> {
        vec![
            self.generator.api(&self.cf.api, self.cf.skip_ssl_validation),
            self.generator.auth(&self.cf.admin_user, &self.cf.admin_password),
        ]
    }

    fn login_and_target(&self) -> Vec<CommandSpec> {
        let mut commands = self.login();
        commands.push(self.generator.target(&self.cf.org, &self.cf.space));
        commands
    }

    /// Create the org and space and push every app the enabled measurements need.
    pub fn setup(&self) -> Vec<CommandSpec> {
        let g = &self.generator;
        let cf = &self.cf;

        let mut commands = self.login();
        commands.push(g.create_org(&cf.org));
        commands.push(g.create_space(&cf.org, &cf.space));
        commands.push(g.target(&cf.org, &cf.space));
        commands.push(g.push(&cf.app_name, &self.app_path));

        if self.optional_tests.run_tcp_availability {
            let tcp_app = self.tcp_app_name();
            commands.push(g.push_no_route(&tcp_app, &self.tcp_app_path));
            commands.push(g.map_tcp_route(&tcp_app, &cf.tcp_domain, cf.tcp_port));
        }

        if self.optional_tests.run_app_syslog_availability {
            let sink = self.syslog_sink_name();
            let drain = self.syslog_drain_name();
            commands.push(g.push_no_route(&sink, &self.syslog_sink_path));
            commands.push(g.map_tcp_route(&sink, &cf.tcp_domain, cf.available_port));
            commands.push(g.create_user_provided_service(&drain, &self.syslog_drain_url()));
            commands.push(g.bind_service(&cf.app_name, &drain));
            commands.push(g.restage(&cf.app_name));
        }

        commands
    }

    /// Push a throwaway app under a fresh name, then delete it.
    pub fn push_and_delete(&self) -> Vec<CommandSpec> {
        let app = format!("uptime-push-{}", Uuid::new_v4());
        let mut commands = self.login_and_target();
        commands.push(self.generator.push(&app, &self.app_path));
        commands.push(self.generator.delete(&app));
        commands
    }

    pub fn recent_logs(&self) -> Vec<CommandSpec> {
        let mut commands = self.login_and_target();
        commands.push(self.generator.recent_logs(&self.cf.app_name));
        commands
    }

    /// Ends in a `cf logs` tail that only stops when cancelled.
    pub fn stream_logs(&self) -> Vec<CommandSpec> {
        let mut commands = self.login_and_target();
        commands.push(self.generator.stream_logs(&self.cf.app_name));
        commands
    }

    pub fn app_stats(&self) -> Vec<CommandSpec> {
        let mut commands = self.login_and_target();
        commands.push(self.generator.app_stats(&self.cf.app_name));
        commands
    }

    pub fn syslog_recent_logs(&self) -> Vec<CommandSpec> {
        let mut commands = self.login_and_target();
        commands.push(self.generator.recent_logs(&self.syslog_sink_name()));
        commands
    }

    pub fn teardown(&self) -> Vec<CommandSpec> {
        let mut commands = self.login();
        commands.push(self.generator.delete_org(&self.cf.org));
        commands.push(self.generator.log_out());
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        let mut config = Config::default();
        config.cf = CfConfig {
            api: "api.example.com".to_string(),
            app_domain: "apps.example.com".to_string(),
            admin_user: "admin".to_string(),
            admin_password: "pw".to_string(),
            tcp_domain: "tcp.example.com".to_string(),
            tcp_port: 1025,
            available_port: 1030,
            org: "org".to_string(),
            space: "space".to_string(),
            app_name: "app".to_string(),
            skip_ssl_validation: true,
        };
        config
    }

    fn rendered(commands: &[CommandSpec]) -> Vec<String> {
        commands.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_setup_without_optional_measurements() {
        let workflow = CfWorkflow::new(&config(), "/tmp/home");
        assert_eq!(
            rendered(&workflow.setup()),
            vec![
                "cf api api.example.com --skip-ssl-validation",
                "cf auth admin [REDACTED]",
                "cf create-org org",
                "cf create-space space -o org",
                "cf target -o org -s space",
                "cf push app -p ./apps/http",
            ]
        );
    }

    #[test]
    fn test_setup_with_tcp_and_syslog() {
        let mut config = config();
        config.optional_tests.run_tcp_availability = true;
        config.optional_tests.run_app_syslog_availability = true;
        let workflow = CfWorkflow::new(&config, "/tmp/home");

        let setup = rendered(&workflow.setup());
        assert_eq!(
            &setup[6..],
            &[
                "cf push app-tcp -p ./apps/tcp --no-route",
                "cf map-route app-tcp tcp.example.com --port 1025",
                "cf push app-syslog-sink -p ./apps/syslog-sink --no-route",
                "cf map-route app-syslog-sink tcp.example.com --port 1030",
                "cf create-user-provided-service app-syslog-drain -l syslog://tcp.example.com:1030",
                "cf bind-service app app-syslog-drain",
                "cf restage app",
            ]
        );
    }

    #[test]
    fn test_push_and_delete_uses_fresh_app_each_time() {
        let workflow = CfWorkflow::new(&config(), "/tmp/home");
        let first = workflow.push_and_delete();
        let second = workflow.push_and_delete();

        assert_eq!(first.len(), 5);
        let pushed = &first[3].args[1];
        assert!(pushed.starts_with("uptime-push-"));
        assert_eq!(&first[4].args[1], pushed);
        assert_ne!(&second[3].args[1], pushed);
    }

    #[test]
    fn test_measurement_sequences_log_in_first() {
        let workflow = CfWorkflow::new(&config(), "/tmp/home");
        for sequence in [
            workflow.recent_logs(),
            workflow.stream_logs(),
            workflow.app_stats(),
            workflow.syslog_recent_logs(),
        ] {
            assert_eq!(sequence[0].args[0], "api");
            assert_eq!(sequence[1].args[0], "auth");
            assert_eq!(sequence[2].args[0], "target");
        }
        assert_eq!(
            workflow.syslog_recent_logs()[3].to_string(),
            "cf logs app-syslog-sink --recent"
        );
    }

    #[test]
    fn test_with_cf_home_rebinds_every_command() {
        let workflow = CfWorkflow::new(&config(), "/tmp/home").with_cf_home("/tmp/other");
        assert!(workflow
            .teardown()
            .iter()
            .all(|cmd| cmd.env == vec![("CF_HOME".to_string(), "/tmp/other".to_string())]));
        assert_eq!(workflow.app_url(), "http://app.apps.example.com");
    }

    #[test]
    fn test_teardown() {
        let workflow = CfWorkflow::new(&config(), "/tmp/home");
        assert_eq!(
            rendered(&workflow.teardown())[2..],
            ["cf delete-org org -f", "cf logout"]
        );
    }
}
