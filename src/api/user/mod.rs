pub mod profile;

use axum::{middleware::from_fn_with_state, Router};

use profile::profile_router;

use crate::middleware::auth::{auth_middleware, AuthState};
use crate::service::AppState;

/// Routes open to any signed-in user.
pub fn user_api_router(state: AppState) -> Router {
    profile_router().route_layer(from_fn_with_state(
        AuthState {
            state,
            admin_only: false,
        },
        auth_middleware,
    ))
}
