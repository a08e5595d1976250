//! Log-only handoff, used for dry runs

use super::{HandoffNotifier, ReadyFile};
use crate::domain::Result;
use async_trait::async_trait;

/// Notifier that only records the file in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl HandoffNotifier for LogNotifier {
    async fn file_ready(&self, file: &ReadyFile) -> Result<()> {
        tracing::info!(
            file = %file.filename,
            message_id = %file.message_id,
            checksum = %file.checksum,
            upload = file.upload,
            "File ready (not delivered)"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
