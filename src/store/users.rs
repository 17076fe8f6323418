use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, TransactionTrait,
};
use std::sync::Arc;

use crate::entities::user::{self, Entity as UserEntity};

#[derive(Clone)]
pub struct UserStore {
    db: Arc<DatabaseConnection>,
}

impl UserStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Inserts a user whose password is already hashed.
    pub async fn create(&self, new_user: user::ActiveModel) -> Result<(), DbErr> {
        let txn = self.db.begin().await?;
        UserEntity::insert(new_user)
            .exec_without_returning(&txn)
            .await?;
        txn.commit().await?;
        Ok(())
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, DbErr> {
        UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<user::Model>, DbErr> {
        UserEntity::find_by_id(id.to_owned()).one(&*self.db).await
    }
}
