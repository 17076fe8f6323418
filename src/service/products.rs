use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::audit::{self, AuditAction, AuditClient, AuditEntity};
use crate::domain::{CreateProductInput, UpdateProductInput};
use crate::entities::product;
use crate::error::AppError;
use crate::storage::{image_key_from_url, ObjectStorage};
use crate::store::ProductStore;

pub struct ProductService {
    store: ProductStore,
    storage: Arc<dyn ObjectStorage>,
    audit: Arc<dyn AuditClient>,
}

impl ProductService {
    pub fn new(
        store: ProductStore,
        storage: Arc<dyn ObjectStorage>,
        audit: Arc<dyn AuditClient>,
    ) -> Self {
        Self {
            store,
            storage,
            audit,
        }
    }

    pub async fn create(&self, input: CreateProductInput) -> Result<String, AppError> {
        let id = self
            .store
            .create(input, Uuid::new_v4().to_string(), Utc::now())
            .await?;
        audit::emit(&self.audit, AuditEntity::Product, AuditAction::Create, &id);
        Ok(id)
    }

    pub async fn get_all(&self) -> Result<Vec<product::Model>, AppError> {
        let products = self.store.get_all().await?;
        audit::emit(&self.audit, AuditEntity::Product, AuditAction::Get, "");
        Ok(products)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<product::Model, AppError> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// An update with no fields is accepted and changes nothing.
    pub async fn update(&self, id: &str, input: UpdateProductInput) -> Result<(), AppError> {
        match self.store.update(id, input).await? {
            Some(0) => Err(not_found(id)),
            Some(_) => {
                audit::emit(&self.audit, AuditEntity::Product, AuditAction::Update, id);
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Removes the stored image first, then the row. The two steps are not
    /// atomic: a failed row delete leaves a product pointing at a missing
    /// object.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let product = self.get_by_id(id).await?;

        if let Some(key) = image_key_from_url(&product.image) {
            self.storage.delete(&key).await?;
            info!(product_id = %id, key = %key, "Deleted product image");
        }

        if self.store.delete(id).await? == 0 {
            return Err(not_found(id));
        }
        audit::emit(&self.audit, AuditEntity::Product, AuditAction::Delete, id);
        Ok(())
    }
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("product {id} not found"))
}
