//! Clients for the two external collaborators: the card-generation AI and
//! the OCR extraction service.

pub mod ai;
pub mod ocr;

pub use ai::{AiClient, Difficulty, GeneratedCard};
pub use ocr::OcrClient;
