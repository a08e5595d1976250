//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for sddgen using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// sddgen - SEPA Direct Debit file generator
#[derive(Parser, Debug)]
#[command(name = "sddgen")]
#[command(version, about, long_about = None)]
#[command(author = "sddgen Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "sddgen.toml", env = "SDD_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SDD_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the pain.008 files of a schedule
    Generate(commands::generate::GenerateArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show schedule totals and generated batches
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_generate() {
        let cli = Cli::parse_from(["sddgen", "generate", "--schedule", "12"]);
        assert_eq!(cli.config, "sddgen.toml");
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.schedule, 12);
                assert!(args.bank.is_empty());
                assert!(!args.dry_run);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_banks_and_flags() {
        let cli = Cli::parse_from([
            "sddgen", "generate", "-s", "7", "--bank", "abn,ing", "--dry-run", "--yes",
        ]);
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.bank, vec!["abn", "ing"]);
                assert!(args.dry_run);
                assert!(args.yes);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_generate_requires_schedule() {
        assert!(Cli::try_parse_from(["sddgen", "generate"]).is_err());
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["sddgen", "--config", "custom.toml", "validate-config"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["sddgen", "--log-level", "debug", "validate-config"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::parse_from(["sddgen", "status", "--schedule", "3"]);
        assert!(matches!(cli.command, Commands::Status(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["sddgen", "init", "--force"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
