// sddgen - SEPA Direct Debit file generator
// Copyright (c) 2025 sddgen Contributors
// Licensed under the MIT License

//! # sddgen - SEPA Direct Debit file generator
//!
//! sddgen turns a schedule of direct debit instructions into ISO 20022
//! pain.008.001.02 files, ready to be handed to a bank delivery pipeline.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Validating** each instruction (IBAN, BIC, amount, end-to-end id, sequence type, mandate date)
//! - **Planning** files and sequence-type batches under per-file and per-batch caps
//! - **Writing** documents as a stream, flushed to storage in bounded chunks
//! - **Verifying** written files by checksum and a structural pain.008 check
//! - **Recording** instruction statuses and schedule totals after each run
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (validation, planning, document, verification, generate)
//! - [`adapters`] - Stores, bank settings, file storage, handoff
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sddgen::adapters::handoff::create_notifier;
//! use sddgen::adapters::settings::ConfigSettings;
//! use sddgen::adapters::storage::LocalStorage;
//! use sddgen::adapters::store::create_store;
//! use sddgen::config::load_config;
//! use sddgen::core::generate::{BankDispatcher, GenerationOptions};
//! use sddgen::core::validation::Validator;
//! use sddgen::domain::ScheduleId;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("sddgen.toml")?;
//!     let store = create_store(&config.store).await?;
//!     let storage = LocalStorage::new(&config.output.storage_root)?;
//!     let notifier = create_notifier(&config.handoff)?;
//!     let validator = Validator::new(&config.validation)?;
//!     let settings = ConfigSettings::new(config.banks.clone());
//!
//!     let runs = BankDispatcher::new(
//!         store.instructions(),
//!         store.schedules(),
//!         &storage,
//!         notifier.as_ref(),
//!         &validator,
//!         &settings,
//!         config.initiating_party.name.clone(),
//!     )
//!     .with_options(GenerationOptions::from_config(&config))
//!     .dispatch(ScheduleId::new(12), &[])
//!     .await?;
//!
//!     store.persist().await?;
//!     println!("Generated for {} bank(s)", runs.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Run-level failures use [`domain::SddError`]. A rejected instruction is not
//! an error of the run: it is marked Failed with its reason and listed in the
//! [`core::generate::GenerationSummary`].
//!
//! ```rust,no_run
//! use sddgen::domain::SddError;
//!
//! fn example() -> Result<(), SddError> {
//!     let _config = sddgen::config::load_config("sddgen.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! sddgen uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(schedule_id = 12, "Starting generation");
//! warn!(instruction_id = 17, reason = "BIC is empty.", "Instruction rejected");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
