pub mod api;
pub mod config;
pub mod gemini;
pub mod middleware;
pub mod recommend;
pub mod server;
pub mod util;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::gemini::GeminiClient;
use crate::recommend::{fallback, Recommender};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Completion client error: {0}")]
    Client(#[from] gemini::CompletionError),
    #[error("Server error: {0}")]
    Server(String),
}

/// Wire the Gemini client and fallback strategy into a recommender.
pub fn build_recommender(config: &config::Config) -> Result<Recommender, ServerError> {
    let client = GeminiClient::new(&config.gemini)?;
    let fallback = fallback::from_config(config.image_fallback);
    Ok(Recommender::new(Arc::new(client), Arc::from(fallback)))
}

pub async fn run(config: config::Config) -> Result<(), ServerError> {
    if config.debug_logs {
        info!("Debug logging enabled");
    }
    if config.gemini.api_key.is_empty() {
        warn!("No Gemini API key configured; upstream calls will be rejected");
    }
    info!(
        text_model = %config.gemini.text_model,
        vision_model = %config.gemini.vision_model,
        timeout_secs = config.gemini.timeout_secs,
        "Using Gemini"
    );

    let recommender = Arc::new(build_recommender(&config)?);

    let address = config.listen.address.as_deref().unwrap_or("[::]");
    let port = &config.listen.port;
    let addr: SocketAddr = format!("{}:{}", address, port)
        .parse()
        .map_err(|e| ServerError::Server(format!("Invalid address: {}", e)))?;

    let tls_paths = match (&config.listen.tlscert, &config.listen.tlskey) {
        (Some(cert), Some(key)) => Some((cert.clone(), key.clone())),
        _ => None,
    };

    let state = server::AppState::new(config, recommender);
    let app = server::build_router(state);

    if let Some((cert_path, key_path)) = tls_paths {
        info!("Loading TLS certificate from {}", cert_path);
        info!("Loading TLS key from {}", key_path);

        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(&cert_path, &key_path)
            .await
            .map_err(|e| ServerError::Server(format!("Failed to load TLS config: {}", e)))?;

        info!("Serving HTTPS on {}", addr);

        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service())
            .await
            .map_err(|e| ServerError::Server(format!("Server error: {}", e)))?;
    } else {
        info!("Serving HTTP on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Server(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Server(format!("Server error: {}", e)))?;
    }

    Ok(())
}
