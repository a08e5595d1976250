//! Core generation logic for sddgen.
//!
//! # Modules
//!
//! - [`validation`] - Per-instruction field checks (IBAN, BIC, amount, ...)
//! - [`planning`] - Splitting the eligible instructions into files and batches
//! - [`document`] - Streaming pain.008.001.02 writer
//! - [`verification`] - Checksum and structural checks of written files
//! - [`generate`] - Orchestration of a run, per creditor and per bank
//!
//! # Generation Workflow
//!
//! 1. **Count**: Determine the eligible instructions for the schedule and creditor
//! 2. **Plan**: Resolve record caps and plan each file's batches
//! 3. **Write**: Stream the header, batches and transactions to storage
//! 4. **Record**: Persist each instruction's status as it is written or rejected
//! 5. **Verify**: Re-read the file, compare checksums, check its structure
//! 6. **Hand off**: Notify the delivery pipeline
//! 7. **Totals**: Replace the schedule's batch totals and mark it Pending Verification
//!
//! # Example
//!
//! ```rust,no_run
//! use sddgen::adapters::handoff::LogNotifier;
//! use sddgen::adapters::storage::LocalStorage;
//! use sddgen::adapters::store::{MemoryStore, ScheduleStore};
//! use sddgen::config::ValidationConfig;
//! use sddgen::core::generate::FileOrchestrator;
//! use sddgen::core::validation::Validator;
//! use sddgen::domain::{CreditorProfile, ScheduleId};
//!
//! # async fn example(profile: CreditorProfile) -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryStore::from_json_file("schedule.json").await?;
//! let storage = LocalStorage::new("./storage/sdd")?;
//! let validator = Validator::new(&ValidationConfig::default())?;
//!
//! let schedule = store.load_schedule(ScheduleId::new(12)).await?;
//! let summary = FileOrchestrator::new(&store, &store, &storage, &LogNotifier, &validator)
//!     .generate(&schedule, &profile)
//!     .await?;
//!
//! println!("Files: {}", summary.files.len());
//! println!("Emitted: {}", summary.emitted);
//! println!("Failed: {}", summary.failed);
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod generate;
pub mod planning;
pub mod validation;
pub mod verification;
