use axum::{
    extract::Request,
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::fmt::Display;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{error, warn};

use crate::ai::RecipeGenerator;
use crate::api::ApiError;
use crate::config::{Config, CorsConfig};
use crate::db::SqliteRepository;
use crate::recipes::SuggestionCache;
use crate::youtube::VideoSearch;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<SqliteRepository>,
    pub ai: Option<Arc<dyn RecipeGenerator>>,
    pub videos: Option<Arc<dyn VideoSearch>>,
    pub suggestions: Arc<SuggestionCache>,
}

impl AppState {
    pub fn new(
        config: Config,
        db: Arc<SqliteRepository>,
        ai: Option<Arc<dyn RecipeGenerator>>,
        videos: Option<Arc<dyn VideoSearch>>,
    ) -> Self {
        let suggestions = Arc::new(SuggestionCache::new(config.cache.capacity));
        Self {
            config: Arc::new(config),
            db,
            ai,
            videos,
            suggestions,
        }
    }

    /// Log an internal failure. The cause is only shown to clients in
    /// development mode.
    pub fn server_error(&self, message: &str, err: impl Display) -> ApiError {
        error!("{}: {}", message, err);
        let api_error = ApiError::internal(message);
        if self.config.development {
            api_error.with_details(err.to_string())
        } else {
            api_error
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(root_handler))
        .merge(crate::api::routes());

    router = match state.config.appdir {
        Some(ref appdir) => router.fallback_service(ServeDir::new(appdir)),
        None => router.fallback(fallback_handler),
    };

    router
        .layer(axum::middleware::from_fn(crate::middleware::log_request))
        .layer(cors_layer(&state.config.cors))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]);

    let origins: Vec<HeaderValue> = config
        .origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        layer.allow_origin(Any).allow_headers(Any)
    } else {
        layer
            .allow_origin(origins)
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
            ])
            .allow_credentials(true)
    }
}

async fn root_handler() -> impl IntoResponse {
    Json(json!({ "message": "Server is running" }))
}

async fn fallback_handler(req: Request) -> impl IntoResponse {
    if req.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::ai::testing::CannedGenerator;
    use crate::db::seed::sample_recipes;
    use crate::db::RecipeRepo;
    use crate::youtube::{CookingVideo, VideoSummary, YoutubeError};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::header;
    use serde_json::Value;
    use tower::ServiceExt;

    pub struct StubVideos;

    #[async_trait]
    impl VideoSearch for StubVideos {
        async fn find_cooking_video(&self, query: &str) -> Result<Option<CookingVideo>, YoutubeError> {
            if query == "nothing" {
                return Ok(None);
            }
            Ok(Some(CookingVideo {
                video_id: "vid123".to_string(),
                title: format!("{} recipe", query),
                view_count: Some("4200".to_string()),
                channel_title: "Test Kitchen".to_string(),
            }))
        }

        async fn search_videos(&self, query: &str, max: usize) -> Result<Vec<VideoSummary>, YoutubeError> {
            Ok((0..max.min(3))
                .map(|i| VideoSummary {
                    id: format!("v{}", i),
                    title: format!("{} {}", query, i),
                    thumbnail: None,
                    channel_title: "Test Kitchen".to_string(),
                    description: String::new(),
                    view_count: 5000 - i as u64,
                    like_count: 0,
                    duration: None,
                })
                .collect())
        }
    }

    pub async fn test_state(ai: Option<CannedGenerator>) -> AppState {
        let mut config = Config::default();
        config.auth.bcrypt_cost = 4;
        let db = Arc::new(SqliteRepository::new("sqlite::memory:").await.unwrap());
        db.seed_recipes(&sample_recipes()).await.unwrap();
        AppState::new(
            config,
            db,
            ai.map(|g| Arc::new(g) as Arc<dyn RecipeGenerator>),
            Some(Arc::new(StubVideos)),
        )
    }

    pub async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = axum::http::Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    /// Register a user and return its token.
    pub async fn register_user(app: &Router, username: &str) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(serde_json::json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "secret1"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["token"].as_str().unwrap().to_string()
    }
}
