//! The top-level lifecycle: load config, set up, measure, tear down.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::types::Cli;
use crate::adapters::cf::CfWorkflow;
use crate::domain::models::{AllowedFailures, Config, MeasurementKind, ResultSet, RunReport};
use crate::domain::ports::{BaseMeasurement, Clock, CommandRunner};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::http::ReqwestHttpClient;
use crate::infrastructure::logging::LoggerImpl;
use crate::infrastructure::process::{CapturedOutput, ProcessRunner};
use crate::services::measurements::{
    deadline_token, AppPushability, AppStats, AppSyslogAvailability, CommandSource,
    HttpAvailability, RecentLogs, StreamSource, StreamingLogs, TcpAvailability,
};
use crate::services::{AppLogValidator, Orchestrator, PeriodicMeasurement};

pub const EXIT_PASSED: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;
pub const EXIT_SETUP_FAILED: i32 = 3;

/// Run the whole availability test and return the process exit code.
pub async fn execute(cli: Cli) -> i32 {
    let config = match ConfigLoader::load_from_file(&cli.config_file) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            return EXIT_CONFIG_ERROR;
        }
    };

    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => Some(logger),
        Err(e) => {
            eprintln!("Failed to initialize logging: {e:#}");
            None
        }
    };

    let work_dir = std::env::temp_dir().join(format!("platform-uptime-{}", Uuid::new_v4()));
    match run_with_config(&config, cli.result_file.as_deref(), &work_dir).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            EXIT_FAILED
        }
    }
}

/// Run the test with CLI homes under `work_dir`, removing it afterwards
/// however the run ends.
async fn run_with_config(
    config: &Config,
    result_file: Option<&Path>,
    work_dir: &Path,
) -> Result<i32> {
    let result = run_in_work_dir(config, result_file, work_dir).await;

    if work_dir.exists() {
        if let Err(e) = std::fs::remove_dir_all(work_dir) {
            warn!(dir = %work_dir.display(), error = %e, "Failed to remove working directory");
        }
    }

    result
}

async fn run_in_work_dir(
    config: &Config,
    result_file: Option<&Path>,
    work_dir: &Path,
) -> Result<i32> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());

    let workflow = CfWorkflow::new(config, cf_home(work_dir, "orchestrator")?);
    let measurements = build_measurements(config, &workflow, &clock, work_dir)?;
    let console: Arc<dyn CommandRunner> = Arc::new(ProcessRunner::console());

    let orchestrator = Orchestrator::new(
        console,
        config.while_commands(),
        measurements,
        AllowedFailures::from_config(&config.allowed_failures),
    )
    .with_setup(workflow.setup())
    .with_teardown(workflow.teardown());

    info!(
        org = %config.cf.org,
        space = %config.cf.space,
        app = %config.cf.app_name,
        measurements = orchestrator.measurements().len(),
        "Starting availability test"
    );

    let code = match orchestrator.setup().await {
        Err(e) => {
            error!("{e}");
            EXIT_SETUP_FAILED
        }
        Ok(()) => {
            let report = orchestrator.run().await;
            if let Some(path) = result_file {
                if let Err(e) = write_report(path, &report) {
                    error!("{e:#}");
                }
            }
            report.exit_code()
        }
    };

    if let Err(e) = orchestrator.teardown().await {
        error!("{e}");
    }

    Ok(code)
}

/// A private CLI home so measurements never share a login session.
fn cf_home(work_dir: &Path, name: &str) -> Result<PathBuf> {
    let dir = work_dir.join(name);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create CF home {}", dir.display()))?;
    Ok(dir)
}

fn captured_runner() -> (Arc<dyn CommandRunner>, CapturedOutput) {
    let output = CapturedOutput::new();
    let runner: Arc<dyn CommandRunner> =
        Arc::new(ProcessRunner::new(output.stdout_sink(), output.stderr_sink()));
    (runner, output)
}

/// One periodic measurement per enabled measurement, in report order.
pub fn build_measurements(
    config: &Config,
    workflow: &CfWorkflow,
    clock: &Arc<dyn Clock>,
    work_dir: &Path,
) -> Result<Vec<PeriodicMeasurement>> {
    let period = Duration::from_secs(config.measurement_period_secs);
    let periodic = |base: Arc<dyn BaseMeasurement>| {
        PeriodicMeasurement::new(clock.clone(), period, base, ResultSet::new(clock.clone()))
    };
    let measurement_workflow = |kind: MeasurementKind| -> Result<CfWorkflow> {
        Ok(workflow.with_cf_home(cf_home(work_dir, kind.config_key())?))
    };

    let mut measurements = Vec::new();

    let client = Arc::new(ReqwestHttpClient::new(Duration::from_secs(
        config.http_timeout_secs,
    ))?);
    measurements.push(periodic(Arc::new(HttpAvailability::new(
        workflow.app_url(),
        client,
    ))));

    let wf = measurement_workflow(MeasurementKind::AppPushability)?;
    let source: CommandSource = Arc::new(move || wf.push_and_delete());
    let (runner, output) = captured_runner();
    measurements.push(periodic(Arc::new(AppPushability::new(source, runner, output))));

    let wf = measurement_workflow(MeasurementKind::RecentLogs)?;
    let source: CommandSource = Arc::new(move || wf.recent_logs());
    let (runner, output) = captured_runner();
    measurements.push(periodic(Arc::new(RecentLogs::new(source, runner, output))));

    let wf = measurement_workflow(MeasurementKind::StreamingLogs)?;
    let window = Duration::from_secs(config.stream_logs_timeout_secs);
    let source: StreamSource = Arc::new(move || (deadline_token(window), wf.stream_logs()));
    let (runner, output) = captured_runner();
    measurements.push(periodic(Arc::new(StreamingLogs::new(
        source,
        runner,
        output,
        AppLogValidator::new(),
    ))));

    let wf = measurement_workflow(MeasurementKind::AppStats)?;
    let source: CommandSource = Arc::new(move || wf.app_stats());
    let (runner, output) = captured_runner();
    measurements.push(periodic(Arc::new(AppStats::new(source, runner, output))));

    if config.optional_tests.run_tcp_availability {
        measurements.push(periodic(Arc::new(TcpAvailability::new(
            config.cf.tcp_domain.clone(),
            config.cf.tcp_port,
        ))));
    }

    if config.optional_tests.run_app_syslog_availability {
        let wf = measurement_workflow(MeasurementKind::AppSyslogAvailability)?;
        let source: CommandSource = Arc::new(move || wf.syslog_recent_logs());
        let (runner, output) = captured_runner();
        measurements.push(periodic(Arc::new(AppSyslogAvailability::new(
            source,
            runner,
            output,
            AppLogValidator::new(),
        ))));
    }

    Ok(measurements)
}

fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    let json = serde_json::to_vec_pretty(report).context("Failed to serialize run report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write result file {}", path.display()))?;
    info!(path = %path.display(), "Wrote result file");
    Ok(())
}
