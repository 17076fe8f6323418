pub mod admin;
pub mod public;
pub mod user;

use axum::{
    extract::rejection::JsonRejection,
    middleware::from_fn,
    Extension, Json, Router,
};
use tower_http::trace::TraceLayer;
use validator::Validate;

use admin::admin_api_router;
use public::public_api_router;
use user::user_api_router;

use crate::error::AppError;
use crate::middleware::logging::logging_middleware;
use crate::service::AppState;

pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .merge(public_api_router())
        .merge(user_api_router(state.clone()))
        .merge(admin_api_router(state.clone()))
        .layer(Extension(state))
        .layer(from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Unwraps a JSON body and runs its validation rules.
pub(crate) fn validated<T: Validate>(
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let Json(input) = payload.map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;
    input
        .validate()
        .map_err(|err| AppError::InvalidRequest(err.to_string()))?;
    Ok(input)
}

/// Unwraps a JSON body that has no validation rules.
pub(crate) fn parsed<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(input)| input)
        .map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))
}
