//! Document persistence for daily logs and saved routines.

use crate::context::UserContext;
use crate::error::{Result, SkinRoutineError};
use crate::routine::Routine;
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

pub const ROUTINES: &str = "routines";
pub const DAILY_LOGS: &str = "dailyLogs";

/// Key/value document storage grouped by collection.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>>;
    async fn put(&self, collection: &str, id: &str, doc: Value) -> Result<()>;
}

pub async fn get_as<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
) -> Result<Option<T>> {
    match store.get(collection, id).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

pub async fn put_as<T: Serialize + Sync>(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
    doc: &T,
) -> Result<()> {
    store.put(collection, id, serde_json::to_value(doc)?).await
}

pub async fn save_routine(
    store: &dyn DocumentStore,
    ctx: &UserContext,
    routine: &Routine,
) -> Result<()> {
    put_as(store, ROUTINES, ctx.user_id(), routine).await
}

pub async fn load_routine(store: &dyn DocumentStore, ctx: &UserContext) -> Result<Option<Routine>> {
    get_as(store, ROUTINES, ctx.user_id()).await
}

/// Collection names and document ids double as file names: ASCII letters,
/// digits, `_`, `-` and `.`, not starting with `.`.
pub(crate) fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !segment.starts_with('.')
}

fn check_segment(kind: &str, segment: &str) -> Result<()> {
    if is_valid_segment(segment) {
        Ok(())
    } else {
        Err(SkinRoutineError::Validation {
            message: format!("invalid {} '{}'", kind, segment),
        })
    }
}

/// One JSON file per document under `<root>/<collection>/<id>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, collection: &str, id: &str) -> Result<PathBuf> {
        check_segment("collection", collection)?;
        check_segment("document id", id)?;
        Ok(self.root.join(collection).join(format!("{}.json", id)))
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let path = self.path_for(collection, id)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SkinRoutineError::Storage {
                message: format!("failed to read {}: {}", path.display(), e),
            }),
        }
    }

    async fn put(&self, collection: &str, id: &str, doc: Value) -> Result<()> {
        let path = self.path_for(collection, id)?;
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        // Write-then-rename so readers never see a half-written document.
        // Each writer gets its own temp file; the last rename wins.
        let tmp = path.with_extension(format!("json.{}.tmp", Uuid::new_v4()));
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(&doc)?).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!(collection, id, "document saved");
        Ok(())
    }
}

/// Process-local store, mainly for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<HashMap<(String, String), Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        check_segment("collection", collection)?;
        check_segment("document id", id)?;
        let docs = self.docs.read().await;
        Ok(docs.get(&(collection.to_string(), id.to_string())).cloned())
    }

    async fn put(&self, collection: &str, id: &str, doc: Value) -> Result<()> {
        check_segment("collection", collection)?;
        check_segment("document id", id)?;
        let mut docs = self.docs.write().await;
        docs.insert((collection.to_string(), id.to_string()), doc);
        Ok(())
    }
}
