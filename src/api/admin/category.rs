use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{post, put},
    Json, Router,
};
use serde_json::json;

use crate::api::{parsed, validated};
use crate::domain::{CreateCategoryInput, UpdateCategoryInput};
use crate::error::AppError;
use crate::service::AppState;

pub fn admin_category_router() -> Router {
    Router::new()
        .route("/api/categories", post(create_category))
        .route(
            "/api/categories/:id",
            put(update_category).delete(delete_category),
        )
}

async fn create_category(
    Extension(state): Extension<AppState>,
    payload: Result<Json<CreateCategoryInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let input = validated(payload)?;
    let id = state.categories.create(input).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

async fn update_category(
    Path(id): Path<String>,
    Extension(state): Extension<AppState>,
    payload: Result<Json<UpdateCategoryInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let input = parsed(payload)?;
    state.categories.update(&id, input).await?;
    Ok(Json(json!({ "status": "ok" })))
}

async fn delete_category(
    Path(id): Path<String>,
    Extension(state): Extension<AppState>,
) -> Result<impl IntoResponse, AppError> {
    state.categories.delete(&id).await?;
    Ok(Json(json!({ "status": "ok" })))
}
