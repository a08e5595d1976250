//! Verification report structures
//!
//! This module defines the structures for reporting post-write checks of a
//! generated file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of verifying one generated file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// File that was checked
    pub filename: String,

    /// When the verification was performed
    pub verified_at: DateTime<Utc>,

    /// Whether the structural check ran
    pub schema_checked: bool,

    /// Number of payment information blocks seen
    pub batches: usize,

    /// Number of transactions seen
    pub transactions: usize,

    /// Whether the stored bytes hash to the digest computed while writing
    pub checksum_verified: Option<bool>,

    /// Issues found, in document order
    pub issues: Vec<SchemaIssue>,

    /// Duration of verification in milliseconds
    pub duration_ms: u64,
}

/// One structural problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaIssue {
    /// Element path, e.g. `Document/CstmrDrctDbtInitn/PmtInf[2]`
    pub path: String,

    /// What is wrong
    pub reason: String,
}

impl VerificationReport {
    /// Create a new, empty report
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            verified_at: Utc::now(),
            schema_checked: false,
            batches: 0,
            transactions: 0,
            checksum_verified: None,
            issues: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Record an issue
    pub fn record_issue(&mut self, path: impl Into<String>, reason: impl Into<String>) {
        self.issues.push(SchemaIssue {
            path: path.into(),
            reason: reason.into(),
        });
    }

    /// Set the duration of verification
    pub fn set_duration(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
    }

    /// Check if no issues were found and the checksum (if compared) matched
    pub fn is_success(&self) -> bool {
        self.issues.is_empty() && self.checksum_verified != Some(false)
    }

    /// Format the report as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str(&format!("📊 Verification Report: {}\n", self.filename));
        summary.push_str(&format!("  Verified at: {}\n", self.verified_at));
        summary.push_str(&format!("  Duration: {} ms\n", self.duration_ms));
        summary.push_str(&format!("  Batches: {}\n", self.batches));
        summary.push_str(&format!("  Transactions: {}\n", self.transactions));
        match self.checksum_verified {
            Some(true) => summary.push_str("  ✅ Checksum matches\n"),
            Some(false) => summary.push_str("  ❌ Checksum mismatch\n"),
            None => summary.push_str("  ⏭️  Checksum not compared\n"),
        }

        if !self.schema_checked {
            summary.push_str("  ⏭️  Structural check skipped\n");
        } else if self.issues.is_empty() {
            summary.push_str("  ✅ No structural issues\n");
        } else {
            summary.push_str(&format!("\n❌ Issues ({}):\n", self.issues.len()));
            for (i, issue) in self.issues.iter().enumerate() {
                summary.push_str(&format!("  {}. {}: {}\n", i + 1, issue.path, issue.reason));
            }
        }

        summary
    }
}
