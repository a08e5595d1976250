//! Post-write verification of generated files
//!
//! Re-reads a closed file from storage, compares its SHA-256 digest with the
//! one computed while writing, and runs the structural schema check.

use super::checksum::calculate_checksum_reader;
use super::report::VerificationReport;
use super::schema::StructuralSchemaCheck;
use crate::adapters::storage::FileStorage;
use crate::config::VerificationConfig;
use crate::core::document::ClosedDocument;
use crate::domain::Result;
use std::time::Instant;

/// Verifier for generated files
pub struct Verifier<'a> {
    storage: &'a dyn FileStorage,
    config: VerificationConfig,
}

impl<'a> Verifier<'a> {
    /// Create a new verifier
    pub fn new(storage: &'a dyn FileStorage, config: VerificationConfig) -> Self {
        Self { storage, config }
    }

    /// Verify one closed document
    ///
    /// # Errors
    ///
    /// Returns an error only if the file cannot be opened; findings about its
    /// content are part of the report.
    pub fn verify(&self, document: &ClosedDocument) -> Result<VerificationReport> {
        let start = Instant::now();
        let mut report = VerificationReport::new(&document.filename);

        let actual = calculate_checksum_reader(self.storage.open_reader(&document.filename)?)?;
        report.checksum_verified = Some(actual == document.checksum);
        if actual != document.checksum {
            tracing::error!(
                file = %document.filename,
                expected = %document.checksum,
                actual = %actual,
                "Stored file does not match the written bytes"
            );
        }

        if self.config.enable_schema_check {
            tracing::info!(file = %document.filename, "Structural validation started");
            let reader = self.storage.open_reader(&document.filename)?;
            StructuralSchemaCheck::new()?.check(reader, &mut report);

            if report.issues.is_empty() {
                tracing::info!(
                    file = %document.filename,
                    batches = report.batches,
                    transactions = report.transactions,
                    "Structural validation finished"
                );
            } else {
                for issue in &report.issues {
                    tracing::warn!(
                        file = %document.filename,
                        path = %issue.path,
                        reason = %issue.reason,
                        "Structural issue"
                    );
                }
            }
        }

        report.set_duration(start.elapsed().as_millis() as u64);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::LocalStorage;
    use crate::core::verification::checksum::calculate_checksum_bytes;
    use tempfile::TempDir;

    const XML: &str = "<Document xmlns=\"urn:iso:std:iso:20022:tech:xsd:pain.008.001.02\"/>";

    async fn stored(temp: &TempDir) -> (LocalStorage, ClosedDocument) {
        let storage = LocalStorage::new(temp.path()).unwrap();
        storage.append("V.xml", XML.as_bytes()).await.unwrap();
        let document = ClosedDocument {
            filename: "V.xml".into(),
            message_id: "M".into(),
            bytes: XML.len() as u64,
            checksum: calculate_checksum_bytes(XML.as_bytes()),
        };
        (storage, document)
    }

    #[tokio::test]
    async fn test_checksum_match_and_schema_disabled() {
        let temp = TempDir::new().unwrap();
        let (storage, document) = stored(&temp).await;
        let config = VerificationConfig {
            enable_schema_check: false,
            ..Default::default()
        };

        let report = Verifier::new(&storage, config).verify(&document).unwrap();
        assert_eq!(report.checksum_verified, Some(true));
        assert!(!report.schema_checked);
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn test_checksum_mismatch_detected() {
        let temp = TempDir::new().unwrap();
        let (storage, mut document) = stored(&temp).await;
        document.checksum = calculate_checksum_bytes(b"something else");

        let report = Verifier::new(&storage, VerificationConfig::default())
            .verify(&document)
            .unwrap();
        assert_eq!(report.checksum_verified, Some(false));
    }

    #[tokio::test]
    async fn test_schema_issues_reported() {
        let temp = TempDir::new().unwrap();
        let (storage, document) = stored(&temp).await;

        let report = Verifier::new(&storage, VerificationConfig::default())
            .verify(&document)
            .unwrap();
        assert!(report.schema_checked);
        assert!(report
            .issues
            .iter()
            .any(|i| i.reason == "CstmrDrctDbtInitn is missing"));
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        let (storage, mut document) = stored(&temp).await;
        document.filename = "GONE.xml".into();

        assert!(Verifier::new(&storage, VerificationConfig::default())
            .verify(&document)
            .is_err());
    }
}
