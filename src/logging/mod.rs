//! Logging
//!
//! This module provides structured logging with support for:
//! - Console output for operators
//! - JSON log files with rotation
//! - Helper macros for the events of a generation run
//!
//! # Example
//!
//! ```no_run
//! use sddgen::logging::init_logging;
//! use sddgen::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(schedule_id = 12, "Generation requested");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a generation run
///
/// # Example
///
/// ```no_run
/// use sddgen::log_run_start;
/// use sddgen::domain::{RunId, ScheduleId};
///
/// let run_id = RunId::generate();
/// log_run_start!(&run_id, ScheduleId::new(12), "NL91ABNA0417164300", 260u64, 2u64);
/// ```
#[macro_export]
macro_rules! log_run_start {
    ($run_id:expr, $schedule_id:expr, $creditor_iban:expr, $records:expr, $files:expr) => {
        tracing::info!(
            run_id = %$run_id,
            schedule_id = %$schedule_id,
            creditor_iban = %$creditor_iban,
            records = $records,
            files = $files,
            "Starting generation run"
        );
    };
}

/// Log the completion of a generation run
///
/// # Example
///
/// ```no_run
/// use sddgen::log_run_complete;
/// use sddgen::domain::RunId;
/// use std::time::Duration;
///
/// let run_id = RunId::generate();
/// log_run_complete!(&run_id, 258u64, 2u64, Duration::from_secs(3));
/// ```
#[macro_export]
macro_rules! log_run_complete {
    ($run_id:expr, $emitted:expr, $failed:expr, $duration:expr) => {
        tracing::info!(
            run_id = %$run_id,
            emitted = $emitted,
            failed = $failed,
            duration_ms = $duration.as_millis() as u64,
            "Generation run completed"
        );
    };
}

/// Log an instruction that was not written
///
/// # Example
///
/// ```no_run
/// use sddgen::log_record_rejected;
///
/// log_record_rejected!(17, "RCUR", "amount does not validate: not a whole number of cents");
/// ```
#[macro_export]
macro_rules! log_record_rejected {
    ($instruction_id:expr, $sequence_type:expr, $reason:expr) => {
        tracing::warn!(
            instruction_id = %$instruction_id,
            sequence_type = %$sequence_type,
            reason = %$reason,
            "Instruction rejected"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use sddgen::log_error_with_context;
/// use sddgen::domain::SddError;
///
/// let error = SddError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
