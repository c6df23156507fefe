use serde::{Deserialize, Serialize};

/// Outcome of one measurement over a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementReport {
    pub name: String,
    pub summary: String,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub allowed_failures: u32,
    pub within_budget: bool,
}

/// Availability report of a run, written to the result file on request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub while_error: Option<String>,
    pub measurements: Vec<MeasurementReport>,
}

impl RunReport {
    pub fn new(measurements: Vec<MeasurementReport>, while_error: Option<String>) -> Self {
        let passed = while_error.is_none() && measurements.iter().all(|m| m.within_budget);
        Self {
            passed,
            while_error,
            measurements,
        }
    }

    pub const fn exit_code(&self) -> i32 {
        if self.passed {
            0
        } else {
            1
        }
    }
}
