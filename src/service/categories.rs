use chrono::Utc;
use uuid::Uuid;

use crate::domain::{CreateCategoryInput, UpdateCategoryInput};
use crate::entities::category;
use crate::error::AppError;
use crate::store::CategoryStore;

pub struct CategoryService {
    store: CategoryStore,
}

impl CategoryService {
    pub fn new(store: CategoryStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, input: CreateCategoryInput) -> Result<String, AppError> {
        let id = self
            .store
            .create(input, Uuid::new_v4().to_string(), Utc::now())
            .await?;
        Ok(id)
    }

    pub async fn get_all(&self) -> Result<Vec<category::Model>, AppError> {
        Ok(self.store.get_all().await?)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<category::Model, AppError> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn update(&self, id: &str, input: UpdateCategoryInput) -> Result<(), AppError> {
        match self.store.update(id, input).await? {
            Some(0) => Err(not_found(id)),
            _ => Ok(()),
        }
    }

    /// Products keep their `category_id` after the category is gone.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        match self.store.delete(id).await? {
            0 => Err(not_found(id)),
            _ => Ok(()),
        }
    }
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("category {id} not found"))
}
