//! Domain models and types for sddgen.
//!
//! This module contains the core domain models and types of a SEPA Direct
//! Debit generation run.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`ScheduleId`], [`InstructionId`], [`BankId`])
//! - **Domain models** ([`Instruction`], [`Schedule`], [`CreditorProfile`])
//! - **Amount handling** ([`money`])
//! - **Error types** ([`SddError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, SddError>`]:
//!
//! ```rust
//! use sddgen::domain::{Result, ScheduleId};
//!
//! fn example() -> Result<()> {
//!     let _config = sddgen::config::load_config("sddgen.toml")?;
//!     let _schedule = ScheduleId::new(12);
//!     Ok(())
//! }
//! ```

pub mod creditor;
pub mod errors;
pub mod ids;
pub mod instruction;
pub mod money;
pub mod result;
pub mod schedule;

// Re-export commonly used types for convenience
pub use creditor::{CreditorProfile, SettingKey};
pub use errors::SddError;
pub use ids::{BankId, InstructionId, RunId, ScheduleId};
pub use instruction::{Instruction, InstructionBuilder, InstructionStatus, SequenceType, DIRECT_DEBIT};
pub use result::Result;
pub use schedule::{BatchTotal, RunTotals, Schedule, ScheduleStatus};
