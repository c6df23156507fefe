use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::domain::models::{MeasurementKind, SampleOutcome};
use crate::domain::ports::BaseMeasurement;

/// Greeting sent to the TCP app and expected back in its reply.
pub const GREETING: &str = "Hello from Uptimer.";

const DIAL_TIMEOUT: Duration = Duration::from_secs(5);
const READ_TIMEOUT: Duration = Duration::from_secs(5);
const READ_BUFFER_SIZE: usize = 1024;

/// Netcat-style check of the TCP route.
pub struct TcpAvailability {
    host: String,
    port: u16,
}

impl TcpAvailability {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    async fn exchange(&self) -> Result<String, String> {
        let addr = format!("{}:{}", self.host, self.port);
        let mut stream = match timeout(DIAL_TIMEOUT, TcpStream::connect(&addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(format!("failed to connect to {addr}: {e}")),
            Err(_) => return Err(format!("timed out connecting to {addr}")),
        };

        stream
            .write_all(GREETING.as_bytes())
            .await
            .map_err(|e| format!("failed to write to {addr}: {e}"))?;

        let mut buf = [0u8; READ_BUFFER_SIZE];
        let read = match timeout(READ_TIMEOUT, stream.read(&mut buf)).await {
            Ok(Ok(read)) => read,
            Ok(Err(e)) => return Err(format!("failed to read from {addr}: {e}")),
            Err(_) => return Err(format!("timed out reading from {addr}")),
        };
        if read == 0 {
            return Err("empty response".to_string());
        }

        Ok(String::from_utf8_lossy(&buf[..read]).into_owned())
    }
}

#[async_trait]
impl BaseMeasurement for TcpAvailability {
    fn name(&self) -> &str {
        MeasurementKind::TcpAvailability.display_name()
    }

    fn summary_phrase(&self) -> String {
        "perform netcat requests".to_string()
    }

    async fn perform_measurement(&self) -> SampleOutcome {
        match self.exchange().await {
            Ok(payload) if payload.contains(GREETING) => SampleOutcome::success(),
            Ok(payload) => SampleOutcome::failure_with_output(
                "TCP app returned an unexpected response",
                payload,
                "",
            ),
            Err(message) => SampleOutcome::failure(message),
        }
    }
}
