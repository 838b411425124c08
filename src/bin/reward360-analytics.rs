use anyhow::Result;
use clap::Parser;
use reward360_analytics::cli::Cli;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse first so the flags can pick the default log level
    let cli = Cli::parse();
    let default_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    // Initialize tracing with environment-based filtering
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting reward360-analytics {}", reward360_analytics::cli::VERSION);

    if let Err(e) = cli.execute().await {
        // Empty datasets and unreachable optional sources are reported, not failed
        if e.is_non_fatal() {
            info!("Command finished with notice: {}", e);
            println!("{}", e.user_message());
            return Ok(());
        }

        // Log the full error for debugging
        error!("Command execution failed: {:?}", e);

        // Display user-friendly error message
        eprintln!("Error: {}", e.user_message());

        std::process::exit(1);
    }

    info!("Command completed successfully");
    Ok(())
}
