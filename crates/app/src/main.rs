//! Storefront operator CLI

use std::process;

use clap::Parser;
use tracing::error;

use crate::cli::Cli;

mod cli;
mod config;
mod observability;

#[tokio::main]
pub async fn main() {
    // Load .env file if present (ignore if missing)
    _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(init_error) = observability::init_subscriber(&cli.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialize, eprintln is the only channel left"
        )]
        {
            eprintln!("failed to initialize logging: {init_error}");
        }

        process::exit(1);
    }

    if let Err(message) = cli.run().await {
        error!("{message}");

        #[expect(
            clippy::print_stderr,
            reason = "operators read command failures on stderr"
        )]
        {
            eprintln!("{message}");
        }

        process::exit(1);
    }
}
