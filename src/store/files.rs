use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::sync::Arc;

use crate::entities::file::{self, Entity as FileEntity};
use crate::store::products::{apply_update, ProductField};
use crate::store::update::PartialUpdate;

#[derive(Clone)]
pub struct FileStore {
    db: Arc<DatabaseConnection>,
}

impl FileStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Points the owning product at the uploaded file and records the upload,
    /// both in one transaction. Returns `false` when the product is gone.
    pub async fn attach_to_product(&self, file: &file::Model) -> Result<bool, DbErr> {
        let txn = self.db.begin().await?;

        let image = PartialUpdate::new().set(ProductField::Image, Some(file.url.clone()));
        let affected = apply_update(&txn, &file.product_id, image).await?;
        if affected != Some(1) {
            txn.rollback().await?;
            return Ok(false);
        }

        let record = file::ActiveModel {
            id: Set(file.id.clone()),
            product_id: Set(file.product_id.clone()),
            kind: Set(file.kind),
            content_type: Set(file.content_type.clone()),
            name: Set(file.name.clone()),
            size: Set(file.size),
            status: Set(file.status),
            upload_started_at: Set(file.upload_started_at),
            url: Set(file.url.clone()),
        };
        FileEntity::insert(record).exec_without_returning(&txn).await?;

        txn.commit().await?;
        Ok(true)
    }

    pub async fn for_product(&self, product_id: &str) -> Result<Vec<file::Model>, DbErr> {
        FileEntity::find()
            .filter(file::Column::ProductId.eq(product_id))
            .order_by_asc(file::Column::UploadStartedAt)
            .all(&*self.db)
            .await
    }
}
