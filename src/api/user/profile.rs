use axum::{
    extract::Extension,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::middleware::auth::Principal;

pub fn profile_router() -> Router {
    Router::new().route("/auth/get-me", get(get_me))
}

async fn get_me(Extension(Principal(user)): Extension<Principal>) -> impl IntoResponse {
    Json(json!({ "data": user }))
}
