//! Measurement port - the "take one sample" contract.

use async_trait::async_trait;

use crate::domain::models::SampleOutcome;

/// A configured check that can take one sample at a time.
///
/// Implementations are driven serially by a periodic measurement; a check
/// that carries state between samples keeps it behind interior mutability.
#[async_trait]
pub trait BaseMeasurement: Send + Sync {
    /// Measurement identity, used in summaries and failure budgets.
    fn name(&self) -> &str;

    /// What one sample attempts, e.g. "push and delete an app".
    fn summary_phrase(&self) -> String;

    /// Take one sample. Each call is exactly one attempt.
    async fn perform_measurement(&self) -> SampleOutcome;
}
