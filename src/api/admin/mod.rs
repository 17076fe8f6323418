pub mod category;
pub mod product;
pub mod upload;

use axum::{middleware::from_fn_with_state, Router};

use category::admin_category_router;
use product::admin_product_router;
use upload::upload_router;

use crate::middleware::auth::{auth_middleware, AuthState};
use crate::service::AppState;

pub fn admin_api_router(state: AppState) -> Router {
    Router::new()
        .merge(admin_category_router())
        .merge(admin_product_router())
        .merge(upload_router())
        .route_layer(from_fn_with_state(
            AuthState {
                state,
                admin_only: true,
            },
            auth_middleware,
        ))
}
