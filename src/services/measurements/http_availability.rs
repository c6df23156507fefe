use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::models::{MeasurementKind, SampleOutcome};
use crate::domain::ports::{BaseMeasurement, HttpClient};

/// GETs the app's URL; only a 200 counts as available.
pub struct HttpAvailability {
    url: String,
    client: Arc<dyn HttpClient>,
}

impl HttpAvailability {
    pub fn new(url: impl Into<String>, client: Arc<dyn HttpClient>) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl BaseMeasurement for HttpAvailability {
    fn name(&self) -> &str {
        MeasurementKind::HttpAvailability.display_name()
    }

    fn summary_phrase(&self) -> String {
        format!("make a request to {}", self.url)
    }

    async fn perform_measurement(&self) -> SampleOutcome {
        match self.client.get_status(&self.url).await {
            Ok(200) => SampleOutcome::success(),
            Ok(status) => SampleOutcome::failure(format!("response had status {status}")),
            Err(e) => SampleOutcome::failure(e.to_string()),
        }
    }
}
