//! Local filesystem storage

use super::FileStorage;
use crate::domain::{Result, SddError};
use async_trait::async_trait;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Storage rooted at a local directory
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Creates the storage, creating the root directory if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be created.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root).map_err(|e| {
            SddError::Storage(format!(
                "Failed to create storage root {}: {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self { root })
    }

    /// Storage root
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn checked_path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(SddError::Storage(format!("Invalid file name '{name}'")));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl FileStorage for LocalStorage {
    async fn append(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.checked_path(name)?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| SddError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

        file.write_all(bytes)
            .await
            .map_err(|e| SddError::Storage(format!("Failed to append to {}: {}", path.display(), e)))?;
        file.flush()
            .await
            .map_err(|e| SddError::Storage(format!("Failed to flush {}: {}", path.display(), e)))?;
        Ok(())
    }

    fn open_reader(&self, name: &str) -> Result<Box<dyn BufRead + Send>> {
        let path = self.checked_path(name)?;
        let file = std::fs::File::open(&path)
            .map_err(|e| SddError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        let path = self.checked_path(name)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| SddError::Storage(format!("Failed to stat {}: {}", path.display(), e)))
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let path = self.checked_path(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SddError::Storage(format!(
                "Failed to delete {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_append_accumulates() {
        let temp = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp.path()).unwrap();

        storage.append("a.xml", b"<A>").await.unwrap();
        storage.append("a.xml", b"</A>").await.unwrap();

        let mut content = String::new();
        storage
            .open_reader("a.xml")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "<A></A>");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp.path()).unwrap();

        storage.append("b.xml", b"x").await.unwrap();
        assert!(storage.exists("b.xml").await.unwrap());
        storage.delete("b.xml").await.unwrap();
        assert!(!storage.exists("b.xml").await.unwrap());
        storage.delete("b.xml").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let temp = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp.path()).unwrap();

        assert!(storage.append("../escape.xml", b"x").await.is_err());
        assert!(storage.open_reader("..").is_err());
    }

    #[test]
    fn test_creates_missing_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("nested/out");
        let storage = LocalStorage::new(&root).unwrap();
        assert!(storage.root().is_dir());
        assert_eq!(storage.path("f.xml"), root.join("f.xml"));
    }
}
