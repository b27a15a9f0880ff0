//! JSON HTTP API.

pub mod ai;
pub mod auth;
pub mod error;
pub mod extract;
pub mod recipes;
pub mod types;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::server::AppState;

pub use auth::AuthUser;
pub use error::{ApiError, ApiResult};
pub use extract::{ApiJson, ApiQuery};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/profile", put(auth::update_profile))
        .route(
            "/api/recipes",
            get(recipes::list_recipes).post(recipes::create_recipe),
        )
        .route("/api/recipes/recommendations", post(recipes::recommendations))
        .route("/api/recipes/by-ingredients", post(recipes::by_ingredients))
        .route(
            "/api/recipes/youtube-search/:query",
            get(recipes::youtube_search),
        )
        .route(
            "/api/recipes/:id",
            get(recipes::get_recipe)
                .put(recipes::update_recipe)
                .delete(recipes::delete_recipe),
        )
        .route("/api/videos/search", get(recipes::search_videos))
        .route("/api/ai/analyze", post(ai::analyze))
}
