//! services/api/src/web/uploads.rs
//!
//! Image uploads for course thumbnails and proof-of-payment screenshots.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::web::{rest::HttpError, state::AppState};

const FILE_FIELD: &str = "image";

/// The multipart form accepted by the upload endpoint.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    /// Publicly fetchable URL of the stored image.
    pub url: String,
}

/// POST /uploads - Store an image and return its URL
#[utoipa::path(
    post,
    path = "/uploads",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image stored", body = UploadResponse),
        (status = 400, description = "No image part, or the body is too large"),
        (status = 502, description = "The image host failed"),
        (status = 503, description = "No image host is configured")
    )
)]
pub async fn upload_image_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpError> {
    let images = state
        .images
        .clone()
        .ok_or_else(|| HttpError::Unavailable("Image uploads are not configured".to_string()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HttpError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| HttpError::BadRequest(e.body_text()))?;
        if data.is_empty() {
            return Err(HttpError::BadRequest("The image is empty".to_string()));
        }

        let url = images
            .upload(&file_name, &data)
            .await
            .map_err(|e| HttpError::Upstream(e.to_string()))?;

        return Ok((StatusCode::CREATED, Json(UploadResponse { url })));
    }

    Err(HttpError::BadRequest(format!(
        "Expected a multipart field named '{}'",
        FILE_FIELD
    )))
}
