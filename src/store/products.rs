use chrono::{DateTime, Utc};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use std::sync::Arc;

use crate::domain::{CreateProductInput, UpdateProductInput};
use crate::entities::product::{self, Entity as ProductEntity};
use crate::store::update::{self, PartialUpdate, UpdateColumn};

/// Updatable product columns, in table order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProductField {
    Title,
    Image,
    Price,
    Sale,
    SaleOldPrice,
    CategoryId,
    Type,
    Subtype,
    Description,
}

impl UpdateColumn for ProductField {
    const TABLE: &'static str = "products";

    fn name(self) -> &'static str {
        match self {
            ProductField::Title => "title",
            ProductField::Image => "image",
            ProductField::Price => "price",
            ProductField::Sale => "sale",
            ProductField::SaleOldPrice => "sale_old_price",
            ProductField::CategoryId => "category_id",
            ProductField::Type => "type",
            ProductField::Subtype => "subtype",
            ProductField::Description => "description",
        }
    }
}

impl From<UpdateProductInput> for PartialUpdate<ProductField> {
    fn from(input: UpdateProductInput) -> Self {
        PartialUpdate::new()
            .set(ProductField::Title, input.title)
            .set(ProductField::Image, input.image)
            .set(ProductField::Price, input.price.map(i64::from))
            .set(ProductField::Sale, input.sale.map(i64::from))
            .set(ProductField::SaleOldPrice, input.sale_old_price.map(i64::from))
            .set(ProductField::CategoryId, input.category_id)
            .set(ProductField::Type, input.kind)
            .set(ProductField::Subtype, input.subtype)
            .set(ProductField::Description, input.description)
    }
}

#[derive(Clone)]
pub struct ProductStore {
    db: Arc<DatabaseConnection>,
}

impl ProductStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        input: CreateProductInput,
        id: String,
        created_at: DateTime<Utc>,
    ) -> Result<String, DbErr> {
        let new_product = product::ActiveModel {
            id: Set(id.clone()),
            title: Set(input.title),
            image: Set(input.image),
            price: Set(i64::from(input.price)),
            sale: Set(i64::from(input.sale)),
            sale_old_price: Set(i64::from(input.sale_old_price)),
            category_id: Set(input.category_id),
            kind: Set(input.kind),
            subtype: Set(input.subtype),
            description: Set(input.description),
            created_at: Set(created_at),
        };

        let txn = self.db.begin().await?;
        ProductEntity::insert(new_product)
            .exec_without_returning(&txn)
            .await?;
        txn.commit().await?;

        Ok(id)
    }

    pub async fn get_all(&self) -> Result<Vec<product::Model>, DbErr> {
        ProductEntity::find()
            .order_by_asc(product::Column::CreatedAt)
            .all(&*self.db)
            .await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<product::Model>, DbErr> {
        ProductEntity::find_by_id(id.to_owned()).one(&*self.db).await
    }

    /// Current image URL of a product. `None` when the product does not exist.
    pub async fn get_image(&self, id: &str) -> Result<Option<String>, DbErr> {
        ProductEntity::find_by_id(id.to_owned())
            .select_only()
            .column(product::Column::Image)
            .into_tuple::<String>()
            .one(&*self.db)
            .await
    }

    /// Applies a partial update in its own transaction. Returns the number of
    /// rows touched, `None` when there was nothing to update.
    pub async fn update(&self, id: &str, input: UpdateProductInput) -> Result<Option<u64>, DbErr> {
        let txn = self.db.begin().await?;
        let affected = apply_update(&txn, id, input.into()).await?;
        txn.commit().await?;
        Ok(affected)
    }

    pub async fn delete(&self, id: &str) -> Result<u64, DbErr> {
        let result = ProductEntity::delete_by_id(id.to_owned())
            .exec(&*self.db)
            .await?;
        Ok(result.rows_affected)
    }
}

/// Runs a product update on any connection, so callers can fold it into a
/// larger transaction.
pub async fn apply_update<C: ConnectionTrait>(
    conn: &C,
    id: &str,
    update: PartialUpdate<ProductField>,
) -> Result<Option<u64>, DbErr> {
    update::execute(conn, id, update).await
}
