//! Store factory
//!
//! Creates the instruction source and schedule store selected by
//! `store.target`.

use super::dry_run::DryRunStore;
use super::memory::MemoryStore;
use super::traits::{InstructionSource, ScheduleStore};
use crate::adapters::postgresql::{PostgreSQLAdapter, PostgreSQLClient};
use crate::config::schema::{StoreConfig, StoreTarget};
use crate::domain::{Result, SddError};
use std::path::PathBuf;
use std::sync::Arc;

/// Both store roles, backed by one underlying store
#[derive(Clone)]
pub struct StoreHandle {
    instructions: Arc<dyn InstructionSource>,
    schedules: Arc<dyn ScheduleStore>,
    document: Option<(Arc<MemoryStore>, PathBuf)>,
}

impl StoreHandle {
    /// Wraps an in-memory store that is not written back anywhere
    pub fn from_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            instructions: store.clone(),
            schedules: store,
            document: None,
        }
    }

    /// A handle that reads from this store and never writes to it
    pub fn dry_run(&self) -> Self {
        let store = Arc::new(DryRunStore::new(
            self.instructions.clone(),
            self.schedules.clone(),
        ));
        Self {
            instructions: store.clone(),
            schedules: store,
            document: None,
        }
    }

    /// Instruction source role
    pub fn instructions(&self) -> &dyn InstructionSource {
        self.instructions.as_ref()
    }

    /// Schedule store role
    pub fn schedules(&self) -> &dyn ScheduleStore {
        self.schedules.as_ref()
    }

    /// Writes a file-backed store back to its document
    ///
    /// Database-backed stores persist every call as it happens, so this is a
    /// no-op for them.
    pub async fn persist(&self) -> Result<()> {
        if let Some((store, path)) = &self.document {
            store.save_json_file(path).await?;
            tracing::info!(path = %path.display(), "Store document saved");
        }
        Ok(())
    }
}

/// Create the store selected by the configuration
///
/// # Errors
///
/// Returns an error if the store document cannot be loaded or the PostgreSQL
/// pool cannot be created.
pub async fn create_store(config: &StoreConfig) -> Result<StoreHandle> {
    match config.target {
        StoreTarget::File => {
            let path = config.path.clone().ok_or_else(|| {
                SddError::Configuration("store.path is required when store.target = 'file'".into())
            })?;

            tracing::info!(path = %path.display(), "Opening JSON file store");
            let store = Arc::new(MemoryStore::from_json_file(&path).await?);

            Ok(StoreHandle {
                instructions: store.clone(),
                schedules: store.clone(),
                document: Some((store, path)),
            })
        }
        StoreTarget::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                SddError::Configuration(
                    "store.postgresql is required when store.target = 'postgresql'".into(),
                )
            })?;

            tracing::info!("Creating PostgreSQL store");
            let client = PostgreSQLClient::new(pg_config.clone()).await?;
            client.ensure_schema().await?;
            let adapter = Arc::new(PostgreSQLAdapter::new(client));

            Ok(StoreHandle {
                instructions: adapter.clone(),
                schedules: adapter,
                document: None,
            })
        }
    }
}
