//! Platform Uptime CLI entry point.

use platform_uptime::cli::{self, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_normalized(std::env::args_os());
    let code = cli::run::execute(cli).await;
    std::process::exit(code);
}
