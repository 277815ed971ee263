//! HTTP client for the external OCR service.
//!
//! The service accepts a raw document body (image or PDF) and responds
//! with `{"text": "..."}`. Text cleanup is the service's concern, not
//! ours.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;

use crate::config::{self, OcrConfig};
use crate::error::{ApiError, ApiResult};

#[derive(Deserialize)]
struct OcrResponse {
    text: String,
}

/// Map an accepted upload extension to its content type.
/// Returns `None` for anything the extractor does not support.
pub fn allowed_content_type(filename: &str) -> Option<&'static str> {
    let extension = filename.rsplit_once('.').map(|(_, ext)| ext)?;
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

/// Client for the OCR extraction service.
#[derive(Clone)]
pub struct OcrClient {
    client: Client,
    url: String,
}

impl OcrClient {
    pub fn new(config: &OcrConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config::UPSTREAM_TIMEOUT_SECS))
            .build()
            .map_err(ApiError::Upstream)?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    /// Send a document to the OCR service and return the extracted text.
    pub async fn extract(&self, content_type: &str, body: Vec<u8>) -> ApiResult<String> {
        tracing::debug!("sending {} bytes of {} for extraction", body.len(), content_type);

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(ApiError::Upstream)?;

        if !response.status().is_success() {
            return Err(ApiError::UpstreamStatus(format!(
                "OCR service returned {}",
                response.status()
            )));
        }

        let extracted: OcrResponse = response.json().await.map_err(ApiError::Upstream)?;
        Ok(extracted.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_extensions() {
        assert_eq!(allowed_content_type("scan.jpg"), Some("image/jpeg"));
        assert_eq!(allowed_content_type("scan.JPEG"), Some("image/jpeg"));
        assert_eq!(allowed_content_type("page.png"), Some("image/png"));
        assert_eq!(allowed_content_type("notes.pdf"), Some("application/pdf"));
    }

    #[test]
    fn test_rejected_extensions() {
        assert_eq!(allowed_content_type("malware.exe"), None);
        assert_eq!(allowed_content_type("essay.docx"), None);
        assert_eq!(allowed_content_type("noextension"), None);
        assert_eq!(allowed_content_type(""), None);
    }

    #[test]
    fn test_extension_found_after_last_dot() {
        assert_eq!(allowed_content_type("archive.tar.pdf"), Some("application/pdf"));
        assert_eq!(allowed_content_type("photo.png.exe"), None);
    }
}
