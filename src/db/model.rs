use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub created: Option<String>,
    pub lastlogin: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub userid: String,
    pub created: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn is_expired(&self, max_age_days: i64, now: DateTime<Utc>) -> bool {
        match self.created {
            Some(created) => now - created > chrono::Duration::days(max_age_days),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub cooking_time: i64,
    pub cuisine_type: Option<String>,
    pub difficulty_level: Option<String>,
    pub servings: Option<i64>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub created_by: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

/// Filters for a recipe listing. `page` starts at 1.
#[derive(Debug, Clone)]
pub struct RecipeQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub cuisine: Option<String>,
    pub ingredients: Vec<String>,
}

impl Default for RecipeQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            search: None,
            cuisine: None,
            ingredients: Vec::new(),
        }
    }
}

impl RecipeQuery {
    pub fn offset(&self) -> u32 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone)]
pub struct RecipePage {
    pub recipes: Vec<Recipe>,
    pub total: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Invalid stored JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
}

pub type DbResult<T> = Result<T, DbError>;
