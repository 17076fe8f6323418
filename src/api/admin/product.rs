use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{post, put},
    Json, Router,
};
use serde_json::json;

use crate::api::{parsed, validated};
use crate::domain::{CreateProductInput, UpdateProductInput};
use crate::error::AppError;
use crate::service::AppState;

pub fn admin_product_router() -> Router {
    Router::new()
        .route("/api/products", post(create_product))
        .route(
            "/api/products/:id",
            put(update_product).delete(delete_product),
        )
}

async fn create_product(
    Extension(state): Extension<AppState>,
    payload: Result<Json<CreateProductInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let input = validated(payload)?;
    let id = state.products.create(input).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

async fn update_product(
    Path(id): Path<String>,
    Extension(state): Extension<AppState>,
    payload: Result<Json<UpdateProductInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let input = parsed(payload)?;
    state.products.update(&id, input).await?;
    Ok(Json(json!({ "status": "ok" })))
}

async fn delete_product(
    Path(id): Path<String>,
    Extension(state): Extension<AppState>,
) -> Result<impl IntoResponse, AppError> {
    state.products.delete(&id).await?;
    Ok(Json(json!({ "status": "ok" })))
}
