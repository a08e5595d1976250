//! Handoff to the delivery pipeline
//!
//! Once a file is closed and checked it is announced to whatever uploads it to
//! the bank. Delivery itself happens outside this crate.

pub mod log;
pub mod outbox;
pub mod webhook;

pub use log::LogNotifier;
pub use outbox::OutboxNotifier;
pub use webhook::WebhookNotifier;

use crate::config::{HandoffConfig, HandoffKind};
use crate::domain::{Result, SddError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A generated file ready for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyFile {
    /// Location of the file in local storage
    pub path: PathBuf,
    pub filename: String,
    /// Whether the pipeline should upload the file to the bank
    pub upload: bool,
    pub message_id: String,
    /// Hex SHA-256 of the file
    pub checksum: String,
}

/// Receiver of ready files
#[async_trait]
pub trait HandoffNotifier: Send + Sync {
    /// Announce a file
    ///
    /// The file may be deleted from local storage as soon as this returns, so
    /// implementations must copy or read whatever they need before returning.
    ///
    /// # Errors
    ///
    /// Returns [`SddError::Handoff`] if the pipeline did not accept the file.
    async fn file_ready(&self, file: &ReadyFile) -> Result<()>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Create the notifier selected by `handoff.kind`
///
/// # Errors
///
/// Returns an error if the selected notifier is missing its settings or the
/// HTTP client cannot be built.
pub fn create_notifier(config: &HandoffConfig) -> Result<Box<dyn HandoffNotifier>> {
    match config.kind {
        HandoffKind::Log => Ok(Box::new(LogNotifier)),
        HandoffKind::Outbox => {
            let dir = config.outbox_dir.clone().ok_or_else(|| {
                SddError::Configuration("handoff.outbox_dir is not set".to_string())
            })?;
            Ok(Box::new(OutboxNotifier::new(dir)))
        }
        HandoffKind::Webhook => Ok(Box::new(WebhookNotifier::new(config)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_notifier_by_kind() {
        let log = create_notifier(&HandoffConfig::default()).unwrap();
        assert_eq!(log.name(), "log");

        let outbox = create_notifier(&HandoffConfig {
            kind: HandoffKind::Outbox,
            outbox_dir: Some(PathBuf::from("/tmp/outbox")),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(outbox.name(), "outbox");

        assert!(create_notifier(&HandoffConfig {
            kind: HandoffKind::Outbox,
            ..Default::default()
        })
        .is_err());
    }
}
