//! Instruction and schedule store abstraction
//!
//! Trait-based access to the persisted instructions and schedules, with an
//! in-memory implementation (optionally backed by a JSON file) and a factory
//! that picks the backend from configuration.

pub mod dry_run;
pub mod factory;
pub mod memory;
pub mod traits;

pub use dry_run::DryRunStore;
pub use factory::{create_store, StoreHandle};
pub use memory::MemoryStore;
pub use traits::{EligibilityScope, InstructionSource, ScheduleStore};
