//! Katharos CLI - Command-line interface for the Katharos tag cleanup platform.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing; everything goes to stderr so stdout stays
    // machine-readable for --output-json.
    let default_directive = match &cli.command {
        Commands::Clean(args) if args.verbose => "katharos=debug",
        _ => "katharos=info",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let code = match cli.command {
        Commands::Clean(args) => match commands::clean::run(args).await {
            Ok(code) => code,
            Err(error) => {
                tracing::error!(error = %format!("{error:#}"), "Run aborted");
                commands::clean::EXIT_CONFIG_ERROR
            }
        },
        Commands::Version => {
            println!("katharos {}", env!("CARGO_PKG_VERSION"));
            0
        }
    };

    std::process::exit(code);
}
