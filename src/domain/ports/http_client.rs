use async_trait::async_trait;

use crate::domain::errors::HttpClientError;

/// Minimal HTTP client used by the HTTP availability measurement.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue a GET to `url` and return the response status code.
    async fn get_status(&self, url: &str) -> Result<u16, HttpClientError>;
}
