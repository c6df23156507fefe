use std::collections::HashMap;

use super::measurement_kind::MeasurementKind;

/// Per-measurement failure budgets, keyed by measurement name.
///
/// A measurement with no entry tolerates zero failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedFailures {
    budgets: HashMap<String, u32>,
}

impl AllowedFailures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style budget for one measurement name.
    pub fn with(mut self, name: impl Into<String>, allowed: u32) -> Self {
        self.budgets.insert(name.into(), allowed);
        self
    }

    /// Translate the config file's `allowed_failures` keys into names.
    ///
    /// Known keys such as `app_pushability` become `App pushability`; unknown
    /// keys are kept verbatim so custom measurement names still resolve.
    pub fn from_config(entries: &HashMap<String, u32>) -> Self {
        let budgets = entries
            .iter()
            .map(|(key, allowed)| {
                let name = MeasurementKind::from_config_key(key)
                    .map_or_else(|| key.clone(), |kind| kind.display_name().to_string());
                (name, *allowed)
            })
            .collect();
        Self { budgets }
    }

    pub fn for_measurement(&self, name: &str) -> u32 {
        self.budgets.get(name).copied().unwrap_or(0)
    }

    pub fn is_within(&self, name: &str, failed: usize) -> bool {
        failed <= self.for_measurement(name) as usize
    }
}
