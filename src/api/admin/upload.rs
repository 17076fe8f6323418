use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Extension, Multipart},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::json;

use crate::error::AppError;
use crate::service::{files::MAX_UPLOAD_SIZE, AppState, UploadForm};

/// Room for multipart boundaries, headers and the `productId` field.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn upload_router() -> Router {
    Router::new()
        .route("/api/file/upload", post(upload))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + MULTIPART_OVERHEAD))
}

async fn upload(
    Extension(state): Extension<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("productId") => {
                form.product_id = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("file") => {
                form.file_name = field.file_name().map(str::to_owned);
                let data = field.bytes().await.map_err(multipart_error)?;
                form.data = Some(data.to_vec());
            }
            _ => {}
        }
    }

    let url = state.files.upload_image(form).await?;
    Ok(Json(json!({ "image_url": url })))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge {
            limit: MAX_UPLOAD_SIZE,
        }
    } else {
        AppError::InvalidRequest(err.body_text())
    }
}
