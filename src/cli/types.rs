//! CLI type definitions

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

/// Long flags that may also be spelled with a single dash, e.g. `-configFile`.
const LONG_FLAGS: [&str; 4] = ["configFile", "resultFile", "help", "version"];

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "platform-uptime")]
#[command(about = "Measure platform availability while a workload runs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the JSON configuration file
    #[arg(long = "configFile", value_name = "PATH")]
    pub config_file: PathBuf,

    /// Write a JSON report of the run to this path
    #[arg(long = "resultFile", value_name = "PATH")]
    pub result_file: Option<PathBuf>,
}

impl Cli {
    /// Parse arguments, accepting single-dash long flags.
    ///
    /// Exits with a usage message on invalid arguments.
    pub fn parse_normalized<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::parse_from(normalize_args(args))
    }

    pub fn try_parse_normalized<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_args(args))
    }
}

/// Rewrite `-configFile` style flags to `--configFile`.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 {
                return arg;
            }
            match arg.to_str() {
                Some(s) if is_single_dash_long_flag(s) => OsString::from(format!("-{s}")),
                _ => arg,
            }
        })
        .collect()
}

fn is_single_dash_long_flag(arg: &str) -> bool {
    let Some(flag) = arg.strip_prefix('-') else {
        return false;
    };
    if flag.starts_with('-') {
        return false;
    }
    let name = flag.split_once('=').map_or(flag, |(name, _)| name);
    LONG_FLAGS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_dash_flags() {
        let cli = Cli::try_parse_normalized([
            "platform-uptime",
            "-configFile",
            "/etc/uptime.json",
            "-resultFile=/tmp/result.json",
        ])
        .unwrap();

        assert_eq!(cli.config_file, PathBuf::from("/etc/uptime.json"));
        assert_eq!(cli.result_file, Some(PathBuf::from("/tmp/result.json")));
    }

    #[test]
    fn test_double_dash_flags() {
        let cli =
            Cli::try_parse_normalized(["platform-uptime", "--configFile", "c.json"]).unwrap();
        assert_eq!(cli.config_file, PathBuf::from("c.json"));
        assert!(cli.result_file.is_none());
    }

    #[test]
    fn test_config_file_is_required() {
        let err = Cli::try_parse_normalized(["platform-uptime"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_values_are_not_rewritten() {
        let args = normalize_args(["prog", "-configFile", "-x", "-h"]);
        assert_eq!(args, vec!["prog", "--configFile", "-x", "-h"]);
    }
}
