//! Image upload orchestration.
//!
//! An upload is validated, staged on local disk, shipped to object storage
//! by one background task, swapped in for the product's previous image and
//! recorded, in that order. The staged copy is removed on every exit path.

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::audit::{self, AuditAction, AuditClient, AuditEntity};
use crate::entities::file::{self, FileStatus, FileType};
use crate::error::AppError;
use crate::storage::{image_key_from_url, ObjectStorage, StorageError, UploadInput};
use crate::store::{FileStore, ProductStore};

/// Largest accepted file, in bytes.
pub const MAX_UPLOAD_SIZE: usize = 5 << 20;

pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/jpg", "image/webp"];

/// Longest sanitized file name kept in keys and staged paths.
pub const MAX_FILE_NAME_LEN: usize = 100;
const MAX_EXTENSION_LEN: usize = 16;

static UNSAFE_NAME_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]").unwrap());

/// Fields of the multipart upload form, as received.
#[derive(Clone, Debug, Default)]
pub struct UploadForm {
    pub product_id: Option<String>,
    pub file_name: Option<String>,
    pub data: Option<Vec<u8>>,
}

pub struct FileService {
    products: ProductStore,
    files: FileStore,
    storage: Arc<dyn ObjectStorage>,
    audit: Arc<dyn AuditClient>,
    staging_dir: PathBuf,
    upload_timeout: Duration,
}

impl FileService {
    pub fn new(
        products: ProductStore,
        files: FileStore,
        storage: Arc<dyn ObjectStorage>,
        audit: Arc<dyn AuditClient>,
        staging_dir: PathBuf,
        upload_timeout: Duration,
    ) -> Self {
        Self {
            products,
            files,
            storage,
            audit,
            staging_dir,
            upload_timeout,
        }
    }

    /// Stores a product image and returns its public URL.
    pub async fn upload_image(&self, form: UploadForm) -> Result<String, AppError> {
        if let Some(data) = &form.data {
            if data.len() > MAX_UPLOAD_SIZE {
                return Err(AppError::PayloadTooLarge {
                    limit: MAX_UPLOAD_SIZE,
                });
            }
        }

        let product_id = form
            .product_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| AppError::InvalidRequest("select product id".to_owned()))?;
        let data = form
            .data
            .ok_or_else(|| AppError::InvalidRequest("file is required".to_owned()))?;

        let content_type = sniff_image_type(&data)?;
        let name = sanitize_file_name(form.file_name.as_deref().unwrap_or_default())?;

        let file_id = Uuid::new_v4().to_string();
        let key = format!("{}/{}.{}", FileType::Image.folder(), file_id, name);
        let mut status = FileStatus::ClientUploadInProgress;

        let staged = StagedFile::write(&self.staging_dir, &format!("{file_id}.{name}"), &data).await?;
        transition(&mut status, FileStatus::UploadedByClient, &file_id);
        let upload_started_at = Utc::now();

        transition(&mut status, FileStatus::StorageUploadInProgress, &file_id);
        let url = match self.ship(&staged, &key, content_type).await {
            Ok(url) => url,
            Err(err) => {
                transition(&mut status, FileStatus::StorageUploadError, &file_id);
                return Err(err);
            }
        };
        transition(&mut status, FileStatus::UploadedToStorage, &file_id);

        match self.products.get_image(&product_id).await {
            Ok(Some(previous)) => {
                if let Some(old_key) = image_key_from_url(&previous) {
                    if let Err(err) = self.storage.delete(&old_key).await {
                        self.discard(&key).await;
                        return Err(err.into());
                    }
                    info!(product_id = %product_id, key = %old_key, "Deleted previous product image");
                }
            }
            Ok(None) => {
                self.discard(&key).await;
                return Err(product_not_found(&product_id));
            }
            Err(err) => {
                self.discard(&key).await;
                return Err(err.into());
            }
        }

        let record = file::Model {
            id: file_id.clone(),
            product_id: product_id.clone(),
            kind: FileType::Image,
            content_type: content_type.to_owned(),
            name,
            size: data.len() as i64,
            status,
            upload_started_at,
            url: url.clone(),
        };
        match self.files.attach_to_product(&record).await {
            Ok(true) => {}
            Ok(false) => {
                self.discard(&key).await;
                return Err(product_not_found(&product_id));
            }
            Err(err) => {
                self.discard(&key).await;
                return Err(err.into());
            }
        }

        audit::emit(&self.audit, AuditEntity::File, AuditAction::UploadFile, &file_id);
        info!(product_id = %product_id, file_id = %file_id, url = %url, "Uploaded product image");
        Ok(url)
    }

    /// Runs the storage upload on its own task and waits for its one result.
    async fn ship(
        &self,
        staged: &StagedFile,
        key: &str,
        content_type: &str,
    ) -> Result<String, AppError> {
        let mut task = tokio::spawn(upload_staged(
            Arc::clone(&self.storage),
            staged.path().to_owned(),
            key.to_owned(),
            content_type.to_owned(),
        ));

        match tokio::time::timeout(self.upload_timeout, &mut task).await {
            Ok(Ok(result)) => result.map_err(AppError::from),
            Ok(Err(err)) => Err(AppError::Internal(format!("upload task failed: {err}"))),
            Err(_) => {
                task.abort();
                Err(AppError::Internal(format!(
                    "upload of {key} timed out after {:?}",
                    self.upload_timeout
                )))
            }
        }
    }

    async fn discard(&self, key: &str) {
        if let Err(err) = self.storage.delete(key).await {
            warn!(key = %key, error = %err, "Failed to discard uploaded object");
        }
    }
}

async fn upload_staged(
    storage: Arc<dyn ObjectStorage>,
    path: PathBuf,
    key: String,
    content_type: String,
) -> Result<String, StorageError> {
    let body = tokio::fs::read(&path).await?;
    storage
        .upload(UploadInput {
            key,
            content_type,
            size: body.len() as u64,
            body,
        })
        .await
}

fn transition(status: &mut FileStatus, next: FileStatus, file_id: &str) {
    debug!(file_id = %file_id, from = ?*status, to = ?next, "Upload status changed");
    *status = next;
}

fn product_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("product {id} not found"))
}

/// Content type detected from the leading bytes, if it is an allowed image.
pub fn sniff_image_type(data: &[u8]) -> Result<&'static str, AppError> {
    let detected = infer::get(data).map(|kind| kind.mime_type());
    match detected {
        Some(mime) if ALLOWED_IMAGE_TYPES.contains(&mime) => Ok(mime),
        Some(mime) => Err(AppError::UnsupportedMediaType(mime.to_owned())),
        None => Err(AppError::UnsupportedMediaType(
            "application/octet-stream".to_owned(),
        )),
    }
}

/// Keeps the final path component, replaces anything outside
/// `[A-Za-z0-9._-]` with `_` and cuts the stem so the result fits in
/// [`MAX_FILE_NAME_LEN`].
pub fn sanitize_file_name(raw: &str) -> Result<String, AppError> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    let name = truncate_file_name(UNSAFE_NAME_CHARS.replace_all(base, "_").into_owned());

    if name.chars().all(|c| c == '.') {
        return Err(AppError::InvalidRequest("file name is empty".to_owned()));
    }
    Ok(name)
}

// Sanitized names are ASCII, so byte offsets are char boundaries.
fn truncate_file_name(name: String) -> String {
    if name.len() <= MAX_FILE_NAME_LEN {
        return name;
    }
    let extension = match name.rfind('.') {
        Some(dot) if dot > 0 && name.len() - dot <= MAX_EXTENSION_LEN => &name[dot..],
        _ => "",
    };
    format!("{}{}", &name[..MAX_FILE_NAME_LEN - extension.len()], extension)
}

/// Local copy of an upload. The file is removed when the guard drops.
struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    async fn write(dir: &Path, name: &str, data: &[u8]) -> Result<Self, AppError> {
        tokio::fs::create_dir_all(dir).await?;
        let staged = Self {
            path: dir.join(name),
        };
        tokio::fs::write(&staged.path, data).await?;
        Ok(staged)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => warn!(path = %self.path.display(), error = %err, "Failed to remove staged file"),
        }
    }
}
