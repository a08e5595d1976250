//! Files created during a run
//!
//! Every filename is registered before the first byte is appended, and
//! [`GeneratedFiles::release`] deletes all of them. The orchestrator calls it
//! on every exit path.

use crate::adapters::storage::FileStorage;

/// Files a run has created in local storage
pub struct GeneratedFiles<'a> {
    storage: &'a dyn FileStorage,
    names: Vec<String>,
}

impl<'a> GeneratedFiles<'a> {
    pub fn new(storage: &'a dyn FileStorage) -> Self {
        Self {
            storage,
            names: Vec::new(),
        }
    }

    /// Registers a file for removal
    pub fn track(&mut self, name: impl Into<String>) {
        self.names.push(name.into());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Deletes every tracked file
    ///
    /// Failures are logged and do not stop the remaining deletes. Returns the
    /// number of files that could not be removed.
    pub async fn release(self) -> usize {
        let mut failed = 0;
        for name in &self.names {
            match self.storage.delete(name).await {
                Ok(()) => tracing::debug!(file = %name, "Removed generated file"),
                Err(e) => {
                    failed += 1;
                    tracing::error!(file = %name, error = %e, "Failed to remove generated file");
                }
            }
        }
        failed
    }
}
