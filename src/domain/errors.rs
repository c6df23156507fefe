//! Domain errors for platform availability measurement.

use std::num::ParseIntError;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors produced while running an external command.
///
/// Precedence when several things go wrong in one run: a start failure is
/// returned before anything else, the stdout copy error before the stderr
/// copy error, and both copy errors before a wait failure.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to start `{command}`: {source}")]
    Start {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to capture {stream} of `{command}`")]
    MissingPipe {
        command: String,
        stream: &'static str,
    },

    #[error("failed to copy stdout of `{command}`: {source}")]
    CopyStdout {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to copy stderr of `{command}`: {source}")]
    CopyStderr {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for `{command}`: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed: {status}")]
    ExitStatus { command: String, status: ExitStatus },
}

/// Errors produced by the app log validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidatorError {
    #[error("cannot find any app logs")]
    NoAppLogs,

    #[error("{0}")]
    Parse(#[from] ParseIntError),
}

/// Errors produced by an HTTP availability client.
#[derive(Debug, Error)]
pub enum HttpClientError {
    #[error("{0}")]
    Request(String),

    #[error("failed to build HTTP client: {0}")]
    Build(String),
}

/// Errors of an orchestrated run's phases.
///
/// Only setup failures abort a run. A while-command failure fails the verdict
/// and teardown failures are reported after the verdict has been produced.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("setup failed: {0}")]
    Setup(#[source] RunnerError),

    #[error("while command failed: {0}")]
    While(#[source] RunnerError),

    #[error("teardown failed: {0}")]
    Teardown(#[source] RunnerError),
}

pub type RunnerResult<T> = Result<T, RunnerError>;
