use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::entities::user::{self, Role};
use crate::error::AppError;
use crate::service::AppState;

/// Authenticated user as loaded by the middleware, inserted into request
/// extensions so handlers don't load it again.
#[derive(Clone, Debug)]
pub struct Principal(pub user::Model);

#[derive(Clone)]
pub struct AuthState {
    pub state: AppState,
    pub admin_only: bool,
}

pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|value| value.to_str().unwrap_or_default());
    let token = bearer_token(header_value)?;

    let user = auth.state.auth.get_me(token).await?;
    if auth.admin_only && user.role != Role::Admin {
        return Err(AppError::Unauthorized("you don't have admin role".to_owned()));
    }

    req.extensions_mut().insert(Principal(user));
    Ok(next.run(req).await)
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(header_value: Option<&str>) -> Result<&str, AppError> {
    let value = match header_value {
        Some(value) if !value.is_empty() => value,
        _ => return Err(unauthorized("empty auth header")),
    };

    let parts: Vec<&str> = value.split(' ').collect();
    let [scheme, token] = parts.as_slice() else {
        return Err(unauthorized("invalid auth header"));
    };
    if *scheme != "Bearer" {
        return Err(unauthorized("invalid bearer"));
    }
    if token.is_empty() {
        return Err(unauthorized("empty token"));
    }
    Ok(token)
}

fn unauthorized(message: &str) -> AppError {
    AppError::Unauthorized(message.to_owned())
}
