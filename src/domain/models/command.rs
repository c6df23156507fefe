use std::fmt;

/// Placeholder rendered in place of secret arguments.
pub const REDACTED: &str = "[REDACTED]";

/// An external command: executable, arguments and extra environment.
///
/// Arguments flagged as secret are passed to the process unchanged but are
/// rendered as [`REDACTED`] whenever the command is displayed or logged.
#[derive(Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    secret_args: Vec<usize>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            secret_args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append an argument that must never appear in logs.
    pub fn secret_arg(mut self, arg: impl Into<String>) -> Self {
        self.secret_args.push(self.args.len());
        self.args.push(arg.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn is_secret(&self, index: usize) -> bool {
        self.secret_args.contains(&index)
    }

    /// Arguments as they may be shown to a human.
    pub fn display_args(&self) -> Vec<&str> {
        self.args
            .iter()
            .enumerate()
            .map(|(i, arg)| if self.is_secret(i) { REDACTED } else { arg.as_str() })
            .collect()
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("program", &self.program)
            .field("args", &self.display_args())
            .field("env", &self.env)
            .finish()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in self.display_args() {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
