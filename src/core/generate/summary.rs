//! Generation summary and reporting
//!
//! This module defines structures for tracking and reporting the result of a
//! generation run.

use crate::core::verification::VerificationReport;
use crate::domain::{BatchTotal, InstructionId, RunId, RunTotals, ScheduleId};
use crate::domain::money::format_minor_units;
use serde::Serialize;
use std::time::Duration;

/// One file written during a run
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedFile {
    pub filename: String,
    pub message_id: String,
    /// Bytes written
    pub bytes: u64,
    /// Hex SHA-256
    pub checksum: String,
    /// Totals declared in the group header
    pub planned: RunTotals,
    /// Number of payment information blocks
    pub batches: usize,
    /// Transactions actually emitted
    pub emitted: u64,
    /// Instructions rejected while writing
    pub rejected: u64,
    /// Post-write checksum and structural check
    pub verification: VerificationReport,
}

impl GeneratedFile {
    /// Whether the header totals overstate what was emitted
    pub fn has_control_sum_gap(&self) -> bool {
        self.emitted != self.planned.records
    }
}

/// An instruction that was not written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordFailure {
    pub instruction_id: InstructionId,
    pub sequence_type: String,
    pub filename: String,
    pub reason: String,
}

/// Type of non-fatal run error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GenerationErrorType {
    /// An instruction status could not be persisted
    StatusUpdate,
    /// A planned instruction was gone when the file was written
    MissingInstruction,
    /// The post-write check found problems
    Verification,
    /// A generated file could not be removed from local storage
    Cleanup,
}

/// Non-fatal error with context
#[derive(Debug, Clone, Serialize)]
pub struct GenerationError {
    pub error_type: GenerationErrorType,
    pub message: String,
    /// Optional context (instruction id, filename)
    pub context: Option<String>,
}

impl GenerationError {
    pub fn new(error_type: GenerationErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Summary of one bank's generation run
#[derive(Debug, Clone, Serialize)]
pub struct GenerationSummary {
    pub run_id: RunId,
    pub schedule_id: ScheduleId,
    pub creditor_iban: String,
    /// Eligible instructions when the run started
    pub eligible: u64,
    /// Planned totals over all files
    pub totals: RunTotals,
    /// Transactions emitted over all files
    pub emitted: u64,
    /// Instructions rejected over all files
    pub failed: u64,
    pub files: Vec<GeneratedFile>,
    /// Rows written to the schedule's batch totals
    pub batch_totals: Vec<BatchTotal>,
    pub failures: Vec<RecordFailure>,
    pub errors: Vec<GenerationError>,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
}

impl GenerationSummary {
    /// Create a new empty summary
    pub fn new(run_id: RunId, schedule_id: ScheduleId, creditor_iban: impl Into<String>) -> Self {
        Self {
            run_id,
            schedule_id,
            creditor_iban: creditor_iban.into(),
            eligible: 0,
            totals: RunTotals::default(),
            emitted: 0,
            failed: 0,
            files: Vec::new(),
            batch_totals: Vec::new(),
            failures: Vec::new(),
            errors: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    /// Record a rejected instruction
    pub fn add_failure(&mut self, failure: RecordFailure) {
        self.failed += 1;
        self.failures.push(failure);
    }

    /// Record a non-fatal error
    pub fn add_error(&mut self, error: GenerationError) {
        self.errors.push(error);
    }

    /// Record a completed file
    pub fn add_file(&mut self, file: GeneratedFile) {
        self.emitted += file.emitted;
        self.totals.absorb(&file.planned);
        self.files.push(file);
    }

    /// Check if every instruction was written and nothing else went wrong
    pub fn is_successful(&self) -> bool {
        self.failed == 0 && self.errors.is_empty()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            schedule_id = %self.schedule_id,
            creditor_iban = %self.creditor_iban,
            files = self.files.len(),
            planned = self.totals.records,
            control_sum = %format_minor_units(self.totals.amount),
            emitted = self.emitted,
            failed = self.failed,
            duration_ms = self.duration.as_millis() as u64,
            "Generation summary"
        );

        for file in self.files.iter().filter(|f| f.has_control_sum_gap()) {
            tracing::warn!(
                file = %file.filename,
                declared = file.planned.records,
                emitted = file.emitted,
                "Header totals include rejected instructions"
            );
        }

        for error in &self.errors {
            tracing::warn!(
                error_type = ?error.error_type,
                message = %error.message,
                context = error.context.as_deref().unwrap_or_default(),
                "Generation error"
            );
        }
    }
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn file(planned: u64, emitted: u64) -> GeneratedFile {
        GeneratedFile {
            filename: "F.xml".into(),
            message_id: "M".into(),
            bytes: 10,
            checksum: "00".into(),
            planned: RunTotals {
                records: planned,
                amount: planned * 100,
                first_collection_date: NaiveDate::from_ymd_opt(2025, 3, 1),
            },
            batches: 1,
            emitted,
            rejected: planned - emitted,
            verification: VerificationReport::new("F.xml"),
        }
    }

    fn summary() -> GenerationSummary {
        GenerationSummary::new(RunId::generate(), ScheduleId::new(1), "NL91ABNA0417164300")
    }

    #[test]
    fn test_new_summary_is_successful() {
        let summary = summary();
        assert!(summary.is_successful());
        assert_eq!(summary.emitted, 0);
    }

    #[test]
    fn test_add_file_accumulates_totals() {
        let mut summary = summary();
        summary.add_file(file(250, 250));
        summary.add_file(file(10, 9));

        assert_eq!(summary.totals.records, 260);
        assert_eq!(summary.totals.amount, 26_000);
        assert_eq!(summary.emitted, 259);
        assert!(!summary.files[0].has_control_sum_gap());
        assert!(summary.files[1].has_control_sum_gap());
    }

    #[test]
    fn test_failure_makes_run_unsuccessful() {
        let mut summary = summary();
        summary.add_failure(RecordFailure {
            instruction_id: InstructionId::new(4),
            sequence_type: "RCUR".into(),
            filename: "F.xml".into(),
            reason: "amount does not validate: not a whole number of cents".into(),
        });
        assert_eq!(summary.failed, 1);
        assert!(!summary.is_successful());
    }

    #[test]
    fn test_error_with_context() {
        let mut summary = summary();
        summary.add_error(
            GenerationError::new(GenerationErrorType::StatusUpdate, "connection reset")
                .with_context("instruction 4"),
        );
        assert!(!summary.is_successful());
        assert_eq!(summary.errors[0].context.as_deref(), Some("instruction 4"));
    }

    #[test]
    fn test_serializes_duration_as_millis() {
        let mut summary = summary();
        summary.duration = Duration::from_millis(1500);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["duration"], 1500);
    }
}
