use async_trait::async_trait;
use std::{
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};
use tracing::debug;

use super::{ObjectStorage, StorageError, UploadInput};

/// Bucket on the local disk. Objects are served back by the `/uploads`
/// route, so their URL is `<public_url>/uploads/<key>`.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    root: PathBuf,
    public_url: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.into().trim_end_matches('/').to_owned(),
        }
    }

    pub fn url_for(&self, key: &str) -> String {
        format!("{}/uploads/{}", self.public_url, key)
    }
}

/// Joins `key` onto `root`, refusing anything that could leave it.
pub fn resolve_key(root: &Path, key: &str) -> Result<PathBuf, StorageError> {
    let relative = Path::new(key);
    let only_normal = relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)));
    if key.is_empty() || !only_normal {
        return Err(StorageError::InvalidKey(key.to_owned()));
    }
    Ok(root.join(relative))
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn upload(&self, input: UploadInput) -> Result<String, StorageError> {
        let path = resolve_key(&self.root, &input.key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &input.body).await?;

        debug!(key = %input.key, size = input.size, content_type = %input.content_type, "Stored object");
        Ok(self.url_for(&input.key))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = resolve_key(&self.root, key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
