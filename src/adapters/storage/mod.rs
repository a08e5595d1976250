//! Output file storage
//!
//! Generated files are appended to in chunks while they are written, read
//! back once for the structural check and deleted at the end of a run.

pub mod local;

pub use local::LocalStorage;

use crate::domain::Result;
use async_trait::async_trait;
use std::io::BufRead;
use std::path::PathBuf;

/// Named-file storage under a root
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Appends bytes to a file, creating it if needed
    async fn append(&self, name: &str, bytes: &[u8]) -> Result<()>;

    /// Opens a file for streaming reads
    fn open_reader(&self, name: &str) -> Result<Box<dyn BufRead + Send>>;

    /// Absolute path of a file
    fn path(&self, name: &str) -> PathBuf;

    /// Whether a file exists
    async fn exists(&self, name: &str) -> Result<bool>;

    /// Deletes a file; deleting a missing file is not an error
    async fn delete(&self, name: &str) -> Result<()>;
}
