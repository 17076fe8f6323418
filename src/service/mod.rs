pub mod auth;
pub mod categories;
pub mod files;
pub mod products;

use sea_orm::DatabaseConnection;
use std::{path::PathBuf, sync::Arc};

use crate::audit::AuditClient;
use crate::config::Config;
use crate::storage::ObjectStorage;
use crate::store::{CategoryStore, FileStore, ProductStore, UserStore};

pub use auth::AuthService;
pub use categories::CategoryService;
pub use files::{FileService, UploadForm};
pub use products::ProductService;

/// Everything a handler needs, shared across requests.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub products: Arc<ProductService>,
    pub categories: Arc<CategoryService>,
    pub files: Arc<FileService>,
    /// Root of the local bucket served under `/uploads`.
    pub uploads_root: PathBuf,
}

impl AppState {
    pub fn new(
        config: &Config,
        db: Arc<DatabaseConnection>,
        storage: Arc<dyn ObjectStorage>,
        audit: Arc<dyn AuditClient>,
    ) -> Self {
        let users = UserStore::new(db.clone());
        let products = ProductStore::new(db.clone());
        let categories = CategoryStore::new(db.clone());
        let files = FileStore::new(db);

        Self {
            auth: Arc::new(AuthService::new(
                users,
                config.secret.clone(),
                config.password_pepper.clone(),
                config.token_ttl,
                audit.clone(),
            )),
            products: Arc::new(ProductService::new(
                products.clone(),
                storage.clone(),
                audit.clone(),
            )),
            categories: Arc::new(CategoryService::new(categories)),
            files: Arc::new(FileService::new(
                products,
                files,
                storage,
                audit,
                config.staging_dir.clone(),
                config.upload_timeout,
            )),
            uploads_root: config.storage_dir.clone(),
        }
    }
}
