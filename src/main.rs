// sddgen - SEPA Direct Debit file generator
// Copyright (c) 2025 sddgen Contributors
// Licensed under the MIT License

use clap::Parser;
use sddgen::cli::{Cli, Commands};
use sddgen::config::{load_config, LoggingConfig};
use sddgen::logging::init_logging;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Commands report configuration problems themselves; logging falls back
    // to console only when the file cannot be read here
    let (log_level, logging_config) = match load_config(&cli.config) {
        Ok(config) => (
            cli.log_level.clone().unwrap_or(config.application.log_level),
            config.logging,
        ),
        Err(_) => (
            cli.log_level.clone().unwrap_or_else(|| "info".to_string()),
            LoggingConfig {
                local_enabled: false,
                ..Default::default()
            },
        ),
    };

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "sddgen - SEPA Direct Debit file generator"
    );

    let exit_code = match execute_command(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    // process::exit skips destructors
    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Generate(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Status(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
