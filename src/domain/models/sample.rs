/// Verdict and diagnostics of a single sample.
///
/// `message`, `stdout` and `stderr` are only surfaced when `ok` is false.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleOutcome {
    pub message: String,
    pub stdout: String,
    pub stderr: String,
    pub ok: bool,
}

impl SampleOutcome {
    pub fn success() -> Self {
        Self {
            ok: true,
            ..Self::default()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn failure_with_output(
        message: impl Into<String>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            stdout: stdout.into(),
            stderr: stderr.into(),
            ok: false,
        }
    }
}
