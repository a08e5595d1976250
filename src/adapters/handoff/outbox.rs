//! Outbox handoff
//!
//! Copies each ready file into an outbox directory watched by the delivery
//! pipeline, next to a `<filename>.json` manifest. The manifest is written
//! last so its presence means the copy is complete.

use super::{HandoffNotifier, ReadyFile};
use crate::domain::{Result, SddError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    filename: &'a str,
    message_id: &'a str,
    checksum: &'a str,
    upload: bool,
    handed_off_at: DateTime<Utc>,
}

/// Notifier that drops files into an outbox directory
#[derive(Debug, Clone)]
pub struct OutboxNotifier {
    dir: PathBuf,
}

impl OutboxNotifier {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl HandoffNotifier for OutboxNotifier {
    async fn file_ready(&self, file: &ReadyFile) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            SddError::Handoff(format!(
                "Failed to create outbox {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let target = self.dir.join(&file.filename);
        tokio::fs::copy(&file.path, &target).await.map_err(|e| {
            SddError::Handoff(format!(
                "Failed to copy {} to outbox: {}",
                file.filename, e
            ))
        })?;

        let manifest = Manifest {
            filename: &file.filename,
            message_id: &file.message_id,
            checksum: &file.checksum,
            upload: file.upload,
            handed_off_at: Utc::now(),
        };
        let json = serde_json::to_vec_pretty(&manifest)?;
        let manifest_path = self.dir.join(format!("{}.json", file.filename));
        tokio::fs::write(&manifest_path, json).await.map_err(|e| {
            SddError::Handoff(format!(
                "Failed to write manifest for {}: {}",
                file.filename, e
            ))
        })?;

        tracing::info!(
            file = %file.filename,
            outbox = %self.dir.display(),
            upload = file.upload,
            "File placed in outbox"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "outbox"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_copies_file_and_writes_manifest() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("A.xml");
        std::fs::write(&source, "<Document/>").unwrap();
        let outbox = temp.path().join("outbox");

        let file = ReadyFile {
            path: source,
            filename: "A.xml".to_string(),
            upload: true,
            message_id: "01032025070509-0123456789ab".to_string(),
            checksum: "abc".to_string(),
        };
        OutboxNotifier::new(&outbox).file_ready(&file).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(outbox.join("A.xml")).unwrap(),
            "<Document/>"
        );
        let manifest: serde_json::Value =
            serde_json::from_slice(&std::fs::read(outbox.join("A.xml.json")).unwrap()).unwrap();
        assert_eq!(manifest["upload"], true);
        assert_eq!(manifest["message_id"], "01032025070509-0123456789ab");
    }

    #[tokio::test]
    async fn test_missing_source_is_handoff_error() {
        let temp = TempDir::new().unwrap();
        let file = ReadyFile {
            path: temp.path().join("gone.xml"),
            filename: "gone.xml".to_string(),
            upload: false,
            message_id: "m".to_string(),
            checksum: "c".to_string(),
        };
        let err = OutboxNotifier::new(temp.path().join("outbox"))
            .file_ready(&file)
            .await
            .unwrap_err();
        assert!(matches!(err, SddError::Handoff(_)));
    }
}
