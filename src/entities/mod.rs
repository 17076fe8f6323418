pub mod category;
pub mod file;
pub mod product;
pub mod user;

use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Schema};

/// Creates every table that does not exist yet.
pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, user::Entity).await?;
    create_table(db, category::Entity).await?;
    create_table(db, product::Entity).await?;
    create_table(db, file::Entity).await?;
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    db.execute(backend.build(&table)).await?;

    for mut index in schema.create_index_from_entity(entity) {
        index.if_not_exists();
        db.execute(backend.build(&index)).await?;
    }
    Ok(())
}
