//! Application configuration.
//!
//! Values load once at startup with priority: config.toml > environment
//! (.env is read first) > defaults. Fixed product constants live here too.

use serde::Deserialize;
use std::path::PathBuf;

// ==================== Server Configuration ====================

/// Address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Default port (overridable via config.toml or PORT)
pub const DEFAULT_PORT: u16 = 5000;

// ==================== Session Configuration ====================

/// Bearer-token session lifetime in hours (1 week)
pub const SESSION_DURATION_HOURS: i64 = 24 * 7;

/// Probability threshold for expired-session cleanup (0-255, lower = more
/// frequent). 25 means ~10% chance per authenticated request.
pub const SESSION_CLEANUP_THRESHOLD: u8 = 25;

// ==================== Plan Quotas ====================

/// AI generations granted to a new free-plan account
pub const FREE_PLAN_GENERATIONS: i64 = 15;

/// Collection slots granted to a new free-plan account; also the refund cap
pub const FREE_PLAN_COLLECTIONS: i64 = 10;

// ==================== AI Generation ====================

/// Most cards a single generation request may produce
pub const MAX_GENERATED_CARDS: usize = 30;

/// Cards generated when the request does not say how many
pub const DEFAULT_GENERATED_CARDS: usize = 5;

// ==================== Uploads ====================

/// Upload size cap for OCR extraction (10 MiB)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

// ==================== External Services ====================

/// Timeout for calls to the AI and OCR services
pub const UPSTREAM_TIMEOUT_SECS: u64 = 60;

/// Chat-completions endpoint used when none is configured
pub const DEFAULT_AI_API_URL: &str = "https://api.deepseek.com/v1/chat/completions";

/// Model requested from the chat-completions endpoint
pub const DEFAULT_AI_MODEL: &str = "deepseek-chat";

// ==================== Loading ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    database: Option<DatabaseSection>,
    server: Option<ServerSection>,
    ai: Option<AiSection>,
    ocr: Option<OcrSection>,
}

#[derive(Debug, Deserialize)]
struct DatabaseSection {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
    port: Option<u16>,
    frontend_origins: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct AiSection {
    api_url: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OcrSection {
    url: Option<String>,
}

/// Settings for the chat-completions service. Absent when no API key is
/// configured; the generate endpoint then fails at request time.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
}

/// Settings for the external OCR service.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub url: String,
}

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub port: u16,
    pub frontend_origins: Vec<String>,
    pub ai: Option<AiConfig>,
    pub ocr: Option<OcrConfig>,
}

impl Config {
    /// Load configuration with priority: config.toml > env > default
    pub fn load() -> Self {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let file = std::fs::read_to_string("config.toml")
            .ok()
            .and_then(|contents| match toml::from_str::<ConfigFile>(&contents) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    tracing::warn!("Ignoring malformed config.toml: {}", e);
                    None
                }
            })
            .unwrap_or_default();

        let database_path = file
            .database
            .as_ref()
            .and_then(|d| d.path.clone())
            .or_else(|| std::env::var("DATABASE_PATH").ok())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/cardly.db"));

        let port = file
            .server
            .as_ref()
            .and_then(|s| s.port)
            .or_else(|| std::env::var("PORT").ok().and_then(|p| p.parse().ok()))
            .unwrap_or(DEFAULT_PORT);

        let frontend_origins = file
            .server
            .as_ref()
            .and_then(|s| s.frontend_origins.clone())
            .or_else(|| {
                std::env::var("FRONTEND_URL")
                    .ok()
                    .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            })
            .unwrap_or_else(|| {
                vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ]
            });

        let ai_section = file.ai.unwrap_or(AiSection {
            api_url: None,
            api_key: None,
            model: None,
        });
        let api_key = ai_section
            .api_key
            .or_else(|| std::env::var("DEEPSEEK_API_KEY").ok());
        let ai = api_key.map(|api_key| AiConfig {
            api_url: ai_section
                .api_url
                .or_else(|| std::env::var("DEEPSEEK_API_URL").ok())
                .unwrap_or_else(|| DEFAULT_AI_API_URL.to_string()),
            api_key,
            model: ai_section
                .model
                .or_else(|| std::env::var("AI_MODEL").ok())
                .unwrap_or_else(|| DEFAULT_AI_MODEL.to_string()),
        });

        let ocr = file
            .ocr
            .and_then(|o| o.url)
            .or_else(|| std::env::var("OCR_SERVICE_URL").ok())
            .map(|url| OcrConfig { url });

        Self {
            database_path,
            port,
            frontend_origins,
            ai,
            ocr,
        }
    }

    /// Get the full server bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", SERVER_ADDR, self.port)
    }
}
