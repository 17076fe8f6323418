use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::json;

use crate::api::validated;
use crate::domain::{SignInInput, SignUpInput};
use crate::error::AppError;
use crate::service::AppState;

pub fn auth_router() -> Router {
    Router::new()
        .route("/auth/sign-up", post(sign_up))
        .route("/auth/sign-in", post(sign_in))
}

async fn sign_up(
    Extension(state): Extension<AppState>,
    payload: Result<Json<SignUpInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let input = validated(payload)?;
    let id = state.auth.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

async fn sign_in(
    Extension(state): Extension<AppState>,
    payload: Result<Json<SignInInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let input = validated(payload)?;
    let token = state
        .auth
        .generate_token(&input.email, &input.password)
        .await?;
    Ok(Json(json!({ "access_token": token })))
}
