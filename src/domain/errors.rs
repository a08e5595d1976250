//! Domain error types
//!
//! This module defines the run-level error hierarchy for sddgen.
//! All errors are domain-specific and don't expose third-party types.
//!
//! Record-level problems (an instruction that fails validation) are *not*
//! errors of this type: they are returned as values by the validator and
//! recorded against the instruction, see [`crate::core::validation`].

use thiserror::Error;

/// Main sddgen error type
///
/// This is the primary error type used throughout the application.
/// `EmptySchedule` and `Configuration` are the two fatal kinds a generation
/// run can end with before any file is created.
#[derive(Debug, Error)]
pub enum SddError {
    /// No eligible instructions for the schedule/creditor combination
    #[error("Empty schedule: {0}")]
    EmptySchedule(String),

    /// Configuration-related errors (including inconsistent record caps)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Validation errors that are fatal for the run
    #[error("Validation error: {0}")]
    Validation(String),

    /// Instruction/schedule store errors
    #[error("Database error: {0}")]
    Database(String),

    /// Output storage errors (append, read back, delete)
    #[error("Storage error: {0}")]
    Storage(String),

    /// XML emission or parsing errors
    #[error("XML error: {0}")]
    Xml(String),

    /// Errors raised while handing a file to the delivery pipeline
    #[error("Handoff error: {0}")]
    Handoff(String),

    /// Document writer operation called in the wrong state
    #[error("Invalid writer state: cannot {operation} while {state}")]
    InvalidState {
        /// Operation that was attempted
        operation: &'static str,
        /// State the writer was in
        state: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl SddError {
    /// Whether this error is one of the two fatal kinds raised before any file exists
    pub fn is_precondition_failure(&self) -> bool {
        matches!(self, SddError::EmptySchedule(_) | SddError::Configuration(_))
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for SddError {
    fn from(err: std::io::Error) -> Self {
        SddError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for SddError {
    fn from(err: serde_json::Error) -> Self {
        SddError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for SddError {
    fn from(err: toml::de::Error) -> Self {
        SddError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sdd_error_display() {
        let err = SddError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_invalid_state_display() {
        let err = SddError::InvalidState {
            operation: "open batch",
            state: "Closed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid writer state: cannot open batch while Closed"
        );
    }

    #[test]
    fn test_precondition_failures() {
        assert!(SddError::EmptySchedule("none".into()).is_precondition_failure());
        assert!(SddError::Configuration("caps".into()).is_precondition_failure());
        assert!(!SddError::Storage("disk".into()).is_precondition_failure());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: SddError = io_err.into();
        assert!(matches!(err, SddError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: SddError = json_err.into();
        assert!(matches!(err, SddError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: SddError = toml_err.into();
        assert!(matches!(err, SddError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_sdd_error_implements_std_error() {
        let err = SddError::Validation("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
