//! trimax - command-line access to the Trimax content backend.
//!
//! Logs in against the JWT endpoint, keeps the token between runs, and runs
//! the site's queries so content can be checked without the web frontend.

mod commands;
mod secret;

use std::io;

use anyhow::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trimax_core::ContentClient;

/// Initialize the tracing subscriber for logging.
/// The returned guard must live until exit so buffered lines are flushed.
fn init_tracing() -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (writer, guard) = tracing_appender::non_blocking(io::stderr());
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer))
        .with(filter)
        .init();
    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _guard = init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match commands::Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}\n", e);
            eprintln!("{}", commands::USAGE);
            std::process::exit(2);
        }
    };

    if let commands::Command::Help = command {
        println!("{}", commands::USAGE);
        return Ok(());
    }
    if let commands::Command::GenSecret { bytes } = command {
        secret::print_secrets(bytes);
        return Ok(());
    }

    let client = ContentClient::from_env()?;
    info!(command = command.name(), "trimax starting");
    commands::run(&client, command).await
}
