use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set, TransactionTrait};
use std::sync::Arc;

use crate::domain::{CreateCategoryInput, UpdateCategoryInput};
use crate::entities::category::{self, Entity as CategoryEntity};
use crate::store::update::{self, PartialUpdate, UpdateColumn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum CategoryField {
    Name,
}

impl UpdateColumn for CategoryField {
    const TABLE: &'static str = "categories";

    fn name(self) -> &'static str {
        match self {
            CategoryField::Name => "name",
        }
    }
}

impl From<UpdateCategoryInput> for PartialUpdate<CategoryField> {
    fn from(input: UpdateCategoryInput) -> Self {
        PartialUpdate::new().set(CategoryField::Name, input.name)
    }
}

#[derive(Clone)]
pub struct CategoryStore {
    db: Arc<DatabaseConnection>,
}

impl CategoryStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        input: CreateCategoryInput,
        id: String,
        created_at: DateTime<Utc>,
    ) -> Result<String, DbErr> {
        let new_category = category::ActiveModel {
            id: Set(id.clone()),
            name: Set(input.name),
            created_at: Set(created_at),
        };

        let txn = self.db.begin().await?;
        CategoryEntity::insert(new_category)
            .exec_without_returning(&txn)
            .await?;
        txn.commit().await?;

        Ok(id)
    }

    pub async fn get_all(&self) -> Result<Vec<category::Model>, DbErr> {
        CategoryEntity::find()
            .order_by_asc(category::Column::CreatedAt)
            .all(&*self.db)
            .await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<category::Model>, DbErr> {
        CategoryEntity::find_by_id(id.to_owned()).one(&*self.db).await
    }

    pub async fn update(&self, id: &str, input: UpdateCategoryInput) -> Result<Option<u64>, DbErr> {
        let txn = self.db.begin().await?;
        let affected = update::execute(&txn, id, PartialUpdate::from(input)).await?;
        txn.commit().await?;
        Ok(affected)
    }

    pub async fn delete(&self, id: &str) -> Result<u64, DbErr> {
        let result = CategoryEntity::delete_by_id(id.to_owned())
            .exec(&*self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
