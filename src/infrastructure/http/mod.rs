//! reqwest-backed [`HttpClient`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use tracing::trace;

use crate::domain::errors::HttpClientError;
use crate::domain::ports::HttpClient;

/// Pooled HTTP client with a per-request timeout.
///
/// Redirects follow the reqwest default policy.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    http_client: ReqwestClient,
}

impl ReqwestHttpClient {
    pub fn new(timeout: Duration) -> Result<Self, HttpClientError> {
        let http_client = ReqwestClient::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(2)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| HttpClientError::Build(e.to_string()))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get_status(&self, url: &str) -> Result<u16, HttpClientError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| HttpClientError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        trace!(url, status, "HTTP response");
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_returns_status_code() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_body("<strong>Hello!</strong>")
            .create_async()
            .await;

        let client = ReqwestHttpClient::new(Duration::from_secs(5)).unwrap();
        let status = client.get_status(&server.url()).await.unwrap();

        assert_eq!(status, 200);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_not_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .with_status(503)
            .create_async()
            .await;

        let client = ReqwestHttpClient::new(Duration::from_secs(5)).unwrap();
        assert_eq!(client.get_status(&server.url()).await.unwrap(), 503);
    }

    #[tokio::test]
    async fn test_connection_failure_is_request_error() {
        let client = ReqwestHttpClient::new(Duration::from_secs(1)).unwrap();
        let err = client.get_status("http://127.0.0.1:1/").await.unwrap_err();
        assert!(matches!(err, HttpClientError::Request(_)));
    }
}
