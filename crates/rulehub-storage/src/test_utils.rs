//! In-memory [`ObjectStore`] for tests across crates
//!
//! Objects only exist after [`MemoryObjectStore::upload`], mirroring a client
//! PUT to the presigned URL. Failures can be injected per operation.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::error::StorageError;
use crate::keys::{new_object_key, validate_key};
use crate::services::{
    DownloadUrlMode, ObjectStatus, ObjectStore, UploadTarget, STATUS_PERMANENT, STATUS_TAG,
    STATUS_TEMPORARY,
};

pub const MEMORY_BASE_URL: &str = "http://storage.test";
pub const MEMORY_BUCKET: &str = "media";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    IssueUploadTarget,
    Promote,
    ResolveDownloadUrl,
    ObjectStatus,
}

#[derive(Default)]
struct State {
    objects: HashMap<String, HashMap<String, String>>,
    issued: HashSet<String>,
    failures: HashMap<StoreOp, StorageError>,
    promotions: Vec<String>,
}

#[derive(Default)]
pub struct MemoryObjectStore {
    state: Mutex<State>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Simulate the client uploading bytes under `key`
    pub fn upload(&self, key: &str) {
        let mut tags = HashMap::new();
        tags.insert(STATUS_TAG.to_string(), STATUS_TEMPORARY.to_string());
        self.state().objects.insert(key.to_string(), tags);
    }

    pub fn fail(&self, op: StoreOp, error: StorageError) {
        self.state().failures.insert(op, error);
    }

    pub fn clear_failures(&self) {
        self.state().failures.clear();
    }

    pub fn tag(&self, key: &str) -> Option<String> {
        self.state()
            .objects
            .get(key)
            .and_then(|tags| tags.get(STATUS_TAG).cloned())
    }

    pub fn was_issued(&self, key: &str) -> bool {
        self.state().issued.contains(key)
    }

    /// Keys successfully promoted, in call order
    pub fn promotions(&self) -> Vec<String> {
        self.state().promotions.clone()
    }

    fn check(&self, op: StoreOp) -> Result<(), StorageError> {
        match self.state().failures.get(&op) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn issue_upload_target(&self) -> Result<UploadTarget, StorageError> {
        self.check(StoreOp::IssueUploadTarget)?;
        let key = new_object_key();
        self.state().issued.insert(key.clone());
        Ok(UploadTarget {
            upload_url: format!("{}/{}/{}?upload=1", MEMORY_BASE_URL, MEMORY_BUCKET, key),
            key,
            expires_at: Utc::now() + chrono::Duration::hours(1),
        })
    }

    async fn promote_to_permanent(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.check(StoreOp::Promote)?;
        let mut state = self.state();
        let tags = state
            .objects
            .get_mut(key)
            .ok_or_else(|| StorageError::ObjectNotFound(key.to_string()))?;
        tags.insert(STATUS_TAG.to_string(), STATUS_PERMANENT.to_string());
        state.promotions.push(key.to_string());
        Ok(())
    }

    async fn resolve_download_url(&self, key: &str) -> Result<String, StorageError> {
        validate_key(key)?;
        self.check(StoreOp::ResolveDownloadUrl)?;
        Ok(DownloadUrlMode::public_url(MEMORY_BASE_URL, MEMORY_BUCKET, key))
    }

    async fn object_status(&self, key: &str) -> Result<ObjectStatus, StorageError> {
        validate_key(key)?;
        self.check(StoreOp::ObjectStatus)?;
        Ok(match self.state().objects.get(key) {
            Some(tags) => ObjectStatus::from_tag(tags.get(STATUS_TAG).map(String::as_str)),
            None => ObjectStatus::Missing,
        })
    }
}
