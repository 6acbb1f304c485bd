//! Storage contracts and the bundled backends
//!
//! The pipeline needs three things from storage:
//! - a keyed upsert store for run records, with compare-and-set on status
//! - a blob store that issues fetchable URLs
//! - an append-only event log

use crate::error::{StoreError, StoreResult};
use crate::events::RunEvent;
use crate::run::RunRecord;
use crate::status::RunStatus;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, project_id: &str) -> StoreResult<Option<RunRecord>>;

    /// Write `record` only if the stored status equals `expected`
    /// (`None` = no record yet). The check and write are atomic.
    async fn compare_and_set(
        &self,
        expected: Option<RunStatus>,
        record: RunRecord,
    ) -> StoreResult<()>;

    /// Unconditional write. Only for fields that do not change the status.
    async fn upsert(&self, record: RunRecord) -> StoreResult<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBlob {
    pub path: String,
    pub url: String,
    pub size: u64,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `path`. Existing paths are never overwritten.
    async fn put(&self, path: &str, bytes: Vec<u8>, mime: &str) -> StoreResult<StoredBlob>;

    async fn get(&self, path: &str) -> StoreResult<Vec<u8>>;
}

#[async_trait]
pub trait EventLog: Send + Sync {
    async fn append(&self, event: RunEvent) -> StoreResult<()>;

    async fn list(&self, project_id: &str) -> StoreResult<Vec<RunEvent>>;
}

// ============================================================================
// IN-MEMORY BACKENDS
// ============================================================================

#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    records: Arc<RwLock<HashMap<String, RunRecord>>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn get(&self, project_id: &str) -> StoreResult<Option<RunRecord>> {
        let records = self.records.read().await;
        Ok(records.get(project_id).cloned())
    }

    async fn compare_and_set(
        &self,
        expected: Option<RunStatus>,
        record: RunRecord,
    ) -> StoreResult<()> {
        let mut records = self.records.write().await;
        let found = records.get(&record.project_id).map(|r| r.status);
        if found != expected {
            return Err(StoreError::Conflict { expected, found });
        }
        records.insert(record.project_id.clone(), record);
        Ok(())
    }

    async fn upsert(&self, record: RunRecord) -> StoreResult<()> {
        let mut records = self.records.write().await;
        records.insert(record.project_id.clone(), record);
        Ok(())
    }
}

#[derive(Debug)]
pub struct InMemoryBlobStore {
    base_url: String,
    blobs: Arc<RwLock<HashMap<String, (Vec<u8>, String)>>>,
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new("memory://blobs")
    }
}

impl InMemoryBlobStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            blobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn paths(&self) -> Vec<String> {
        let blobs = self.blobs.read().await;
        let mut paths: Vec<String> = blobs.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub async fn mime(&self, path: &str) -> Option<String> {
        let blobs = self.blobs.read().await;
        blobs.get(path).map(|(_, mime)| mime.clone())
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, path: &str, bytes: Vec<u8>, mime: &str) -> StoreResult<StoredBlob> {
        let mut blobs = self.blobs.write().await;
        if blobs.contains_key(path) {
            return Err(StoreError::AlreadyExists(path.to_string()));
        }
        let size = bytes.len() as u64;
        blobs.insert(path.to_string(), (bytes, mime.to_string()));
        Ok(StoredBlob {
            path: path.to_string(),
            url: join_url(&self.base_url, path),
            size,
        })
    }

    async fn get(&self, path: &str) -> StoreResult<Vec<u8>> {
        let blobs = self.blobs.read().await;
        blobs
            .get(path)
            .map(|(bytes, _)| bytes.clone())
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    events: Arc<RwLock<Vec<RunEvent>>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventLog for InMemoryEventLog {
    async fn append(&self, event: RunEvent) -> StoreResult<()> {
        let mut events = self.events.write().await;
        events.push(event);
        Ok(())
    }

    async fn list(&self, project_id: &str) -> StoreResult<Vec<RunEvent>> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .filter(|e| e.project_id == project_id)
            .cloned()
            .collect())
    }
}

// ============================================================================
// FILESYSTEM BLOB STORE
// ============================================================================

/// Blob store rooted at a local directory, served under `base_url`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    fn resolve(&self, path: &str) -> StoreResult<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, std::path::Component::Normal(_)));
        if escapes || path.is_empty() {
            return Err(StoreError::Io(format!("invalid blob path: {}", path)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, path: &str, bytes: Vec<u8>, _mime: &str) -> StoreResult<StoredBlob> {
        let target = self.resolve(path)?;
        if tokio::fs::try_exists(&target)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?
        {
            return Err(StoreError::AlreadyExists(path.to_string()));
        }
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Io(e.to_string()))?;
        }
        let size = bytes.len() as u64;
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;

        Ok(StoredBlob {
            path: path.to_string(),
            url: join_url(&self.base_url, path),
            size,
        })
    }

    async fn get(&self, path: &str) -> StoreResult<Vec<u8>> {
        let target = self.resolve(path)?;
        tokio::fs::read(&target).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(path.to_string())
            } else {
                StoreError::Io(e.to_string())
            }
        })
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
