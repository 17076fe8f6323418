use async_trait::async_trait;
use std::{collections::HashMap, time::Duration};
use tokio::sync::Mutex;

use super::{ObjectStorage, StorageError, UploadInput};

/// A call observed by [`MemoryStorage`], in the order it happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageCall {
    Upload { key: String, content_type: String, size: u64 },
    Delete { key: String },
}

#[derive(Default)]
struct Inner {
    objects: HashMap<String, Vec<u8>>,
    calls: Vec<StorageCall>,
    fail_uploads: bool,
    fail_deletes: bool,
    upload_delay: Option<Duration>,
}

/// In-process bucket that records every call. Used by tests and local runs
/// without a disk bucket.
pub struct MemoryStorage {
    base_url: String,
    inner: Mutex<Inner>,
}

impl MemoryStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            inner: Mutex::new(Inner::default()),
        }
    }

    pub async fn calls(&self) -> Vec<StorageCall> {
        self.inner.lock().await.calls.clone()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.inner.lock().await.objects.contains_key(key)
    }

    pub async fn fail_uploads(&self, fail: bool) {
        self.inner.lock().await.fail_uploads = fail;
    }

    pub async fn fail_deletes(&self, fail: bool) {
        self.inner.lock().await.fail_deletes = fail;
    }

    /// Makes every upload wait this long before it is recorded.
    pub async fn stall_uploads(&self, delay: Option<Duration>) {
        self.inner.lock().await.upload_delay = delay;
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn upload(&self, input: UploadInput) -> Result<String, StorageError> {
        let delay = self.inner.lock().await.upload_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.inner.lock().await;
        inner.calls.push(StorageCall::Upload {
            key: input.key.clone(),
            content_type: input.content_type,
            size: input.size,
        });
        if inner.fail_uploads {
            return Err(StorageError::Rejected(format!("upload of {} refused", input.key)));
        }

        let url = format!("{}/{}", self.base_url, input.key);
        inner.objects.insert(input.key, input.body);
        Ok(url)
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(StorageCall::Delete {
            key: key.to_owned(),
        });
        if inner.fail_deletes {
            return Err(StorageError::Rejected(format!("delete of {key} refused")));
        }

        inner.objects.remove(key);
        Ok(())
    }
}
