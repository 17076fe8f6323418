use axum::{
    body::Body,
    extract::{Extension, Path},
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::io::ErrorKind;
use tokio_util::io::ReaderStream;

use crate::error::AppError;
use crate::service::AppState;
use crate::storage::local::resolve_key;

pub fn uploads_router() -> Router {
    Router::new().route("/uploads/*key", get(serve_object))
}

/// Streams an object out of the local bucket.
async fn serve_object(
    Path(key): Path<String>,
    Extension(state): Extension<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let not_found = || AppError::NotFound(format!("object {key} not found"));

    let path = resolve_key(&state.uploads_root, &key).map_err(|_| not_found())?;
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => return Err(not_found()),
        Err(err) => return Err(err.into()),
    };

    let content_type = mime_guess::from_path(&path)
        .first_raw()
        .unwrap_or("application/octet-stream");

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("inline"),
    );

    Ok((headers, Body::from_stream(ReaderStream::new(file))))
}
