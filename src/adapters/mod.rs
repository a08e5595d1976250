//! Collaborators of a generation run.
//!
//! - [`store`] - Instruction source and schedule store traits, JSON-file store
//! - [`postgresql`] - PostgreSQL implementation of both store traits
//! - [`settings`] - Per-bank settings and creditor profiles
//! - [`storage`] - Local storage the files are written to
//! - [`handoff`] - Notifying the delivery pipeline (outbox, webhook, log)
//!
//! # Design Pattern
//!
//! Every collaborator is a trait passed into the orchestrator, so a run can be
//! exercised against the in-memory store and a temporary directory:
//!
//! ```rust,no_run
//! use sddgen::adapters::store::{create_store, StoreHandle};
//! use sddgen::config::StoreConfig;
//!
//! # async fn example(config: StoreConfig) -> Result<(), Box<dyn std::error::Error>> {
//! let store: StoreHandle = create_store(&config).await?;
//! store.schedules().test_connection().await?;
//! # Ok(())
//! # }
//! ```

pub mod handoff;
pub mod postgresql;
pub mod settings;
pub mod storage;
pub mod store;
