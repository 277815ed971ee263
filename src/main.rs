use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cardly::services::{AiClient, OcrClient};
use cardly::state::AppState;
use cardly::{app, config, db};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cardly=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = config::Config::load();
  tracing::info!("Using database at {}", config.database_path.display());

  let pool = db::init_db(&config.database_path).expect("Failed to initialize database");

  let ai = match &config.ai {
    Some(ai_config) => Some(AiClient::new(ai_config).expect("Failed to build AI client")),
    None => {
      tracing::warn!("No AI API key configured; card generation is disabled");
      None
    }
  };
  let ocr = match &config.ocr {
    Some(ocr_config) => Some(OcrClient::new(ocr_config).expect("Failed to build OCR client")),
    None => {
      tracing::warn!("No OCR service configured; text extraction is disabled");
      None
    }
  };

  let state = AppState::new(pool, ai, ocr);
  let app = app::router(state, &config.frontend_origins);

  let bind_addr = config.bind_addr();
  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://localhost:{}", config.port);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
