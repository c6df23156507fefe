//! Sample app that receives a syslog drain.
//!
//! Accepts octet-counted RFC-5424 streams on `$PORT` and prints the body of
//! every message on its own line, so the drained app's output shows up in
//! this app's logs.

use anyhow::{Context, Result};
use clap::Parser;
use platform_uptime::infrastructure::syslog::{parse, read_frame, SyslogError};
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "uptime-syslog-sink")]
#[command(about = "RFC-5424 syslog sink printing message bodies")]
struct Args {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value = "8080")]
    port: u16,
}

async fn handle(socket: TcpStream) -> Result<(), SyslogError> {
    let mut reader = BufReader::new(socket);
    let mut stdout = tokio::io::stdout();

    while let Some(frame) = read_frame(&mut reader).await? {
        match parse(&frame) {
            Ok(message) => {
                stdout.write_all(message.message.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
            Err(e) => warn!(error = %e, "Dropping malformed syslog message"),
        }
    }
    Ok(())
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

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Syslog sink listening on {}", addr);

    loop {
        let (socket, peer) = listener.accept().await?;
        tokio::spawn(async move {
            debug!(%peer, "Drain connected");
            match handle(socket).await {
                Ok(()) => debug!(%peer, "Drain disconnected"),
                Err(e) => warn!(%peer, error = %e, "Drain connection failed"),
            }
        });
    }
}
