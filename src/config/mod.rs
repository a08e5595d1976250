//! Configuration management for sddgen.
//!
//! This module provides TOML-based configuration loading, parsing, and
//! validation.
//!
//! # Overview
//!
//! sddgen uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `SDD_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation of every section on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sddgen::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("sddgen.toml")?;
//!
//! println!("Initiating party: {}", config.initiating_party.name);
//! for bank in &config.banks {
//!     println!("Bank: {}", bank.id);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [initiating_party]
//! name = "Stichting Voorbeeld"
//!
//! [store]
//! target = "postgresql"
//!
//! [store.postgresql]
//! connection_string = "${SDD_DATABASE_URL}"
//!
//! [output]
//! storage_root = "./storage/sdd"
//!
//! [handoff]
//! kind = "outbox"
//! outbox_dir = "./outbox"
//!
//! [[banks]]
//! id = "abn"
//!
//! [banks.settings]
//! IBAN = "NL91ABNA0417164300"
//! BIC = "ABNANL2A"
//! CREDITOR_ID = "NL98ZZZ999999990000"
//! RECORDS_PER_FILE = 1000
//! RECORDS_PER_SEQUENCE_TYPE = 500
//! UPLOAD = true
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, BankConfig, HandoffConfig, HandoffKind, InitiatingPartyConfig,
    LoggingConfig, OutputConfig, PostgreSQLConfig, SddConfig, SettingValue, StoreConfig,
    StoreTarget, ValidationConfig, VerificationConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
