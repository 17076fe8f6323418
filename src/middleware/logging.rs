use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{error, info, warn};

/// Failure detail attached to error responses. The client only sees the
/// public message; this is what ends up in the server log.
#[derive(Clone, Debug)]
pub struct ErrorDetail(pub String);

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed = start.elapsed();
    match response.extensions().get::<ErrorDetail>() {
        Some(ErrorDetail(detail)) if status.is_server_error() => error!(
            method = %method,
            uri = %uri,
            status = %status,
            elapsed = ?elapsed,
            detail = %detail,
            "Failed to process request"
        ),
        Some(ErrorDetail(detail)) => warn!(
            method = %method,
            uri = %uri,
            status = %status,
            elapsed = ?elapsed,
            detail = %detail,
            "Rejected request"
        ),
        None => info!(
            method = %method,
            uri = %uri,
            status = %status,
            elapsed = ?elapsed,
            "Processed request"
        ),
    }

    response
}
