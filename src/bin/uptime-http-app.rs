//! Sample app pushed as the measured workload.
//!
//! Serves a static page on `$PORT` and prints the unix epoch to stdout every
//! second, which the log measurements check for freshness.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use axum::{http::header, response::IntoResponse, routing::get, Router};
use clap::Parser;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "uptime-http-app")]
#[command(about = "HTTP responder with a periodic epoch log")]
struct Args {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value = "8080")]
    port: u16,
}

async fn hello() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/html")], "<strong>Hello!</strong>")
}

/// Write one epoch line and flush it through to the platform's log stream.
async fn write_epoch<W>(out: &mut W, epoch: u64) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    out.write_all(format!("{epoch}\n").as_bytes()).await?;
    out.flush().await
}

async fn log_epochs() {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    let mut stdout = tokio::io::stdout();
    loop {
        interval.tick().await;
        let epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        if let Err(e) = write_epoch(&mut stdout, epoch).await {
            warn!(error = %e, "Failed to write epoch");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    tokio::spawn(log_epochs());

    let app = Router::new().route("/", get(hello));

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("HTTP app listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
