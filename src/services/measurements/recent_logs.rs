use std::sync::Arc;

use async_trait::async_trait;

use super::{CapturedRunner, CommandSource};
use crate::domain::models::{MeasurementKind, SampleOutcome};
use crate::domain::ports::{BaseMeasurement, CommandRunner};
use crate::infrastructure::process::CapturedOutput;

/// Fetches the app's recent logs.
pub struct RecentLogs {
    commands: CommandSource,
    runner: CapturedRunner,
}

impl RecentLogs {
    pub fn new(
        commands: CommandSource,
        runner: Arc<dyn CommandRunner>,
        output: CapturedOutput,
    ) -> Self {
        Self {
            commands,
            runner: CapturedRunner::new(runner, output),
        }
    }
}

#[async_trait]
impl BaseMeasurement for RecentLogs {
    fn name(&self) -> &str {
        MeasurementKind::RecentLogs.display_name()
    }

    fn summary_phrase(&self) -> String {
        "fetch recent logs".to_string()
    }

    async fn perform_measurement(&self) -> SampleOutcome {
        let commands = (self.commands)();
        self.runner.run(&commands, None).await.into_outcome()
    }
}
