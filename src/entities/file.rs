use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Upload record. One row per image that made it to storage.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "files")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(indexed)]
    pub product_id: String,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub kind: FileType,
    pub content_type: String,
    pub name: String,
    pub size: i64,
    pub status: FileStatus,
    pub upload_started_at: DateTimeUtc,
    pub url: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumIter, DeriveActiveEnum, Serialize)]
#[sea_orm(
    enum_name = "file_type_enum",
    db_type = "String(StringLen::N(255))",
    rs_type = "String"
)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    #[sea_orm(string_value = "image")]
    Image,
}

impl FileType {
    /// Storage folder objects of this type are kept under.
    pub fn folder(self) -> &'static str {
        match self {
            FileType::Image => "images",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumIter, DeriveActiveEnum, Serialize)]
#[sea_orm(
    enum_name = "file_status_enum",
    db_type = "String(StringLen::N(255))",
    rs_type = "String"
)]
#[serde(rename_all = "kebab-case")]
pub enum FileStatus {
    #[sea_orm(string_value = "client-upload-in-progress")]
    ClientUploadInProgress,
    #[sea_orm(string_value = "uploaded-by-client")]
    UploadedByClient,
    #[sea_orm(string_value = "client-upload-error")]
    ClientUploadError,
    #[sea_orm(string_value = "storage-upload-in-progress")]
    StorageUploadInProgress,
    #[sea_orm(string_value = "uploaded-to-storage")]
    UploadedToStorage,
    #[sea_orm(string_value = "storage-upload-error")]
    StorageUploadError,
}
