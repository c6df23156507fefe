//! Setup, measured run and teardown of one availability test.

use std::sync::Arc;

use tracing::{error, info};

use crate::domain::errors::OrchestratorError;
use crate::domain::models::{AllowedFailures, CommandSpec, RunReport};
use crate::domain::ports::CommandRunner;
use crate::services::periodic_measurement::PeriodicMeasurement;

/// Owns every measurement of a run and the commands around it.
pub struct Orchestrator {
    runner: Arc<dyn CommandRunner>,
    setup_commands: Vec<CommandSpec>,
    while_commands: Vec<CommandSpec>,
    teardown_commands: Vec<CommandSpec>,
    measurements: Vec<PeriodicMeasurement>,
    allowed_failures: AllowedFailures,
}

impl Orchestrator {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        while_commands: Vec<CommandSpec>,
        measurements: Vec<PeriodicMeasurement>,
        allowed_failures: AllowedFailures,
    ) -> Self {
        Self {
            runner,
            setup_commands: Vec::new(),
            while_commands,
            teardown_commands: Vec::new(),
            measurements,
            allowed_failures,
        }
    }

    #[must_use]
    pub fn with_setup(mut self, commands: Vec<CommandSpec>) -> Self {
        self.setup_commands = commands;
        self
    }

    #[must_use]
    pub fn with_teardown(mut self, commands: Vec<CommandSpec>) -> Self {
        self.teardown_commands = commands;
        self
    }

    pub fn measurements(&self) -> &[PeriodicMeasurement] {
        &self.measurements
    }

    pub async fn setup(&self) -> Result<(), OrchestratorError> {
        info!("Setting up");
        self.runner
            .run_in_sequence(&self.setup_commands)
            .await
            .map_err(OrchestratorError::Setup)?;
        info!("Finished setting up");
        Ok(())
    }

    /// Measure for as long as the while commands run.
    ///
    /// Measurements start before the first while command and stop, in
    /// reverse order, after the last one exits or the first one fails.
    pub async fn run(&self) -> RunReport {
        for measurement in &self.measurements {
            measurement.start();
        }

        let mut while_error = None;
        for command in &self.while_commands {
            info!("Running command: `{command}`");
            if let Err(e) = self.runner.run(command).await {
                let e = OrchestratorError::While(e);
                error!("{e}");
                while_error = Some(e.to_string());
                break;
            }
            info!("Finished command: `{command}`");
        }

        for measurement in self.measurements.iter().rev() {
            measurement.stop().await;
        }

        let reports: Vec<_> = self
            .measurements
            .iter()
            .map(|m| m.report(&self.allowed_failures))
            .collect();

        info!("Measurement summaries:");
        for report in &reports {
            if report.within_budget {
                info!("{}", report.summary);
            } else {
                error!(
                    allowed_failures = report.allowed_failures,
                    "{}", report.summary
                );
            }
        }

        let report = RunReport::new(reports, while_error);
        if report.passed {
            info!("All measurements were within their failure budgets");
        } else {
            error!("Availability test failed");
        }
        report
    }

    /// Best effort; callers invoke it whatever happened before.
    pub async fn teardown(&self) -> Result<(), OrchestratorError> {
        info!("Tearing down");
        self.runner
            .run_in_sequence(&self.teardown_commands)
            .await
            .map_err(OrchestratorError::Teardown)?;
        info!("Finished tearing down");
        Ok(())
    }
}
