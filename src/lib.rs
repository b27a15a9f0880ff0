pub mod ai;
pub mod api;
pub mod config;
pub mod db;
pub mod ingredients;
pub mod middleware;
pub mod recipes;
pub mod server;
pub mod util;
pub mod youtube;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::ai::RecipeGenerator;
use crate::db::RecipeRepo;
use crate::youtube::VideoSearch;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Database error: {0}")]
    Database(#[from] db::DbError),
    #[error("AI client error: {0}")]
    Ai(#[from] ai::AiError),
    #[error("YouTube client error: {0}")]
    Youtube(#[from] youtube::YoutubeError),
    #[error("Server error: {0}")]
    Server(String),
}

pub async fn run(config_path: &str, debug_logs: bool) -> Result<(), ServerError> {
    let mut config = config::Config::from_file(config_path)?;
    config.debug_logs = debug_logs;

    info!("Using config file: {}", config_path);
    if debug_logs {
        info!("Debug logging enabled");
    }

    let db_path = config
        .get_database_path()
        .ok_or_else(|| ServerError::Server("No database path configured".to_string()))?;

    info!("Opening database at {}", db_path);
    let db = Arc::new(db::SqliteRepository::new(&db_path).await?);

    let seeded = db.seed_recipes(&db::seed::sample_recipes()).await?;
    if seeded > 0 {
        info!("Seeded {} sample recipes", seeded);
    }

    db.clone().start_background_tasks(config.auth.token_days);

    let ai: Option<Arc<dyn RecipeGenerator>> = match ai::GeminiClient::from_config(&config.gemini)? {
        Some(client) => {
            info!("Using Gemini model {}", client.model());
            Some(Arc::new(client))
        }
        None => {
            warn!("No Gemini API key configured, serving built-in recipes only");
            None
        }
    };

    let videos: Option<Arc<dyn VideoSearch>> =
        match youtube::YoutubeClient::from_config(&config.youtube)? {
            Some(client) => Some(Arc::new(client)),
            None => {
                warn!("No YouTube API key configured, video search disabled");
                None
            }
        };

    let address = config.listen.address.as_deref().unwrap_or("[::]");
    let addr: SocketAddr = format!("{}:{}", address, config.listen.port)
        .parse()
        .map_err(|e| ServerError::Server(format!("Invalid address: {}", e)))?;

    let tls = match (&config.listen.tlscert, &config.listen.tlskey) {
        (Some(cert), Some(key)) => Some((cert.clone(), key.clone())),
        _ => None,
    };

    let state = server::AppState::new(config, db, ai, videos);
    let app = server::build_router(state);

    if let Some((cert_path, key_path)) = tls {
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
