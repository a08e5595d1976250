//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the sddgen configuration file, including every bank's settings.

use crate::adapters::settings::{ConfigSettings, SettingsProvider};
use crate::config::load_config;
use crate::config::schema::StoreTarget;
use crate::core::validation::Validator;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        if let Err(e) = config.validate() {
            println!("❌ Configuration validation failed");
            println!("   Error: {e}");
            println!();
            return Ok(2);
        }

        if let Err(e) = Validator::new(&config.validation) {
            println!("❌ Validation rules could not be set up");
            println!("   Error: {e}");
            return Ok(2);
        }

        // Resolve every profile the way a run would
        let settings = ConfigSettings::new(config.banks.clone());
        let mut profiles = Vec::new();
        for bank in settings.banks() {
            match settings.creditor_profile(&bank, &config.initiating_party.name) {
                Ok(profile) => profiles.push((bank, profile)),
                Err(e) => {
                    println!("❌ Bank settings are invalid");
                    println!("   Error: {e}");
                    return Ok(2);
                }
            }
        }

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Initiating Party: {}", config.initiating_party.name);

        match config.store.target {
            StoreTarget::File => {
                if let Some(ref path) = config.store.path {
                    println!("  Store: file ({})", path.display());
                }
            }
            StoreTarget::PostgreSQL => {
                if let Some(ref pg_config) = config.store.postgresql {
                    use secrecy::ExposeSecret;
                    println!("  Store: PostgreSQL");
                    println!(
                        "  PostgreSQL Connection: {}",
                        pg_config
                            .connection_string
                            .expose_secret()
                            .as_ref()
                            .split('@')
                            .next_back()
                            .unwrap_or("***")
                    );
                    println!("  Max Connections: {}", pg_config.max_connections);
                }
            }
        }

        println!("  Storage Root: {}", config.output.storage_root.display());
        println!("  Flush Every: {}", config.output.flush_every);
        println!("  Handoff: {}", config.handoff.kind);
        println!("  Schema Check: {}", config.verification.enable_schema_check);
        println!("  Enforce Schema: {}", config.verification.enforce_schema);
        println!("  Banks:");
        for (bank, profile) in &profiles {
            println!(
                "    - {}: {} / {} (per file: {}, per sequence type: {}, upload: {})",
                bank,
                profile.iban,
                profile.bic,
                cap(profile.records_per_file),
                cap(profile.records_per_sequence_type),
                profile.upload
            );
        }
        println!();
        Ok(0)
    }
}

fn cap(value: u64) -> String {
    if value == 0 {
        "unlimited".to_string()
    } else {
        value.to_string()
    }
}
