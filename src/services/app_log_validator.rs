//! Checks that fetched app logs keep moving forward.
//!
//! The sample app prints the unix epoch every second, so the newest `[APP`
//! line of a healthy log fetch always carries a larger number than the
//! previous fetch did.

use crate::domain::errors::ValidatorError;

const APP_MARKER: &str = "[APP";
const OUT_MARKER: &str = "OUT";

/// Remembers the newest epoch seen across log fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppLogValidator {
    last_number: i64,
}

impl AppLogValidator {
    pub const fn new() -> Self {
        Self { last_number: -1 }
    }

    /// Newest epoch accepted so far, `-1` before the first success.
    pub const fn last_number(&self) -> i64 {
        self.last_number
    }

    /// Whether `logs` ends with an epoch newer than any seen before.
    ///
    /// Lines whose payload is not a number (e.g. `[APP/PROC/WEB/0] OUT Exit
    /// status 143`) are skipped in favour of earlier lines. If no app line
    /// parses, the parse error of the newest app line is returned.
    pub fn is_newer(&mut self, logs: &str) -> Result<bool, ValidatorError> {
        let number = latest_epoch(logs)?;
        if self.last_number == -1 || number > self.last_number {
            self.last_number = number;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

impl Default for AppLogValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn latest_epoch(logs: &str) -> Result<i64, ValidatorError> {
    let mut parse_error = None;

    for line in logs.lines().rev().filter(|line| line.contains(APP_MARKER)) {
        let payload = line
            .rfind(OUT_MARKER)
            .map_or(line, |at| &line[at + OUT_MARKER.len()..]);

        match payload.trim().parse::<i64>() {
            Ok(number) => return Ok(number),
            Err(e) => {
                parse_error.get_or_insert(e);
            }
        }
    }

    Err(parse_error.map_or(ValidatorError::NoAppLogs, ValidatorError::Parse))
}
