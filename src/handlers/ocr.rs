//! OCR text-extraction handler.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthContext;
use crate::config;
use crate::error::{ApiError, ApiResult};
use crate::services::ocr::allowed_content_type;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub text: String,
    pub length: usize,
}

/// POST /api/ocr/extract - multipart upload, forwarded to the OCR service
pub async fn extract_text(
    State(state): State<AppState>,
    _auth: AuthContext,
    mut multipart: Multipart,
) -> ApiResult<Json<ExtractResponse>> {
    let ocr = state
        .ocr
        .as_ref()
        .ok_or_else(|| ApiError::Config("OCR extraction is not configured".to_string()))?;

    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Malformed upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = allowed_content_type(&filename).ok_or_else(|| {
            ApiError::validation("Invalid file type. Only images and PDFs are accepted.")
        })?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(format!("Failed to read upload: {e}")))?;
        if bytes.len() > config::MAX_UPLOAD_BYTES {
            return Err(ApiError::validation("File exceeds the 10 MiB upload limit"));
        }

        upload = Some((content_type.to_string(), bytes.to_vec()));
        break;
    }

    let (content_type, bytes) =
        upload.ok_or_else(|| ApiError::validation("No file was uploaded"))?;

    let text = ocr.extract(&content_type, bytes).await?;
    let length = text.chars().count();

    Ok(Json(ExtractResponse { text, length }))
}
