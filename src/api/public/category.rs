use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::error::AppError;
use crate::service::AppState;

pub fn category_router() -> Router {
    Router::new()
        .route("/api/categories", get(get_categories))
        .route("/api/categories/:id", get(get_category))
}

async fn get_categories(
    Extension(state): Extension<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let categories = state.categories.get_all().await?;
    Ok(Json(json!({ "data": categories })))
}

async fn get_category(
    Path(id): Path<String>,
    Extension(state): Extension<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let category = state.categories.get_by_id(&id).await?;
    Ok(Json(json!({ "data": category })))
}
