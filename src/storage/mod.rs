//! Object storage port and its providers.

pub mod local;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

pub use local::LocalStorage;
pub use memory::{MemoryStorage, StorageCall};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid object key: {0}")]
    InvalidKey(String),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("provider rejected the request: {0}")]
    Rejected(String),
}

#[derive(Clone, Debug)]
pub struct UploadInput {
    pub key: String,
    pub content_type: String,
    pub size: u64,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores the object and returns its public URL.
    async fn upload(&self, input: UploadInput) -> Result<String, StorageError>;

    /// Removes an object. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Storage key of an image from its public URL: the last path segment under
/// the `images/` folder. `None` when that segment can't name an object.
pub fn image_key_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let name = path.rsplit('/').next().unwrap_or(path);
    match name {
        "" | "." | ".." => None,
        name => Some(format!("images/{name}")),
    }
}
