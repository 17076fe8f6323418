use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::error::AppError;
use crate::service::AppState;

pub fn product_router() -> Router {
    Router::new()
        .route("/api/products", get(get_products))
        .route("/api/products/:id", get(get_product))
}

async fn get_products(Extension(state): Extension<AppState>) -> Result<impl IntoResponse, AppError> {
    let products = state.products.get_all().await?;
    Ok(Json(json!({ "data": products })))
}

async fn get_product(
    Path(id): Path<String>,
    Extension(state): Extension<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.products.get_by_id(&id).await?;
    Ok(Json(json!({ "data": product })))
}
