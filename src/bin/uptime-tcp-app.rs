//! Sample app reached through the platform's TCP router.
//!
//! Echoes the first chunk a client sends, appends `Message received.` and
//! closes the connection.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const REPLY: &[u8] = b"Message received.\n";
const READ_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(name = "uptime-tcp-app")]
#[command(about = "TCP echo responder")]
struct Args {
    /// Port to listen on; the platform only sets `$PORT`
    #[arg(long, env = "TCP_PORT")]
    port: Option<u16>,
}

async fn handle(mut socket: TcpStream) -> std::io::Result<()> {
    let mut buf = [0u8; 1024];
    // Clients that send nothing still get the reply.
    let received = match tokio::time::timeout(READ_TIMEOUT, socket.read(&mut buf)).await {
        Ok(read) => read?,
        Err(_) => 0,
    };

    socket.write_all(&buf[..received]).await?;
    socket.write_all(REPLY).await?;
    socket.shutdown().await
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
    let port = match args.port {
        Some(port) => port,
        None => std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080),
    };

    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("TCP app listening on {}", addr);

    loop {
        let (socket, peer) = listener.accept().await?;
        tokio::spawn(async move {
            debug!(%peer, "Accepted connection");
            if let Err(e) = handle(socket).await {
                warn!(%peer, error = %e, "Connection failed");
            }
        });
    }
}
