use std::path::PathBuf;

use clap::{Parser, Subcommand};
use finca::core::FiscalPolicy;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "finca", about = "Personal-finance calculation engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the calculators over HTTP.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
        /// JSON fiscal policy to use instead of the built-in FY 2024-25 tables.
        #[arg(long)]
        policy: Option<PathBuf>,
    },
}

fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let Command::Serve { port, policy } = Cli::parse().command;

    let policy = match policy {
        Some(path) => match FiscalPolicy::from_json_file(&path) {
            Ok(policy) => {
                tracing::info!(path = %path.display(), fiscal_year = %policy.fiscal_year, "loaded fiscal policy");
                policy
            }
            Err(e) => {
                tracing::error!(path = %path.display(), "failed to load fiscal policy: {e}");
                std::process::exit(1);
            }
        },
        None => FiscalPolicy::FY2024_25,
    };

    if let Err(e) = finca::api::run_http_server(port, policy).await {
        tracing::error!("server error: {e}");
        std::process::exit(1);
    }
}
