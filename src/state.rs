//! Application state passed to all handlers.

use crate::db::DbPool;
use crate::services::{AiClient, OcrClient};

#[derive(Clone)]
pub struct AppState {
    /// Shared database (users, sessions, collections, cards)
    pub db: DbPool,

    /// Chat-completions client; `None` when no API key is configured
    pub ai: Option<AiClient>,

    /// OCR service client; `None` when no endpoint is configured
    pub ocr: Option<OcrClient>,
}

impl AppState {
    pub fn new(db: DbPool, ai: Option<AiClient>, ocr: Option<OcrClient>) -> Self {
        Self { db, ai, ocr }
    }
}
