//! File generation
//!
//! - [`orchestrator`] - one schedule, one creditor: plan, write, verify, hand off
//! - [`dispatcher`] - runs the orchestrator for each configured bank
//! - [`summary`] - what a run produced
//! - [`workspace`] - removal of the files a run created

pub mod dispatcher;
pub mod orchestrator;
pub mod summary;
pub mod workspace;

pub use dispatcher::{BankDispatcher, BankRun};
pub use orchestrator::{FileOrchestrator, GenerationOptions};
pub use summary::{
    GeneratedFile, GenerationError, GenerationErrorType, GenerationSummary, RecordFailure,
};
pub use workspace::GeneratedFiles;
