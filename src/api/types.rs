use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::{Recipe, User};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecipeListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub cuisine: Option<String>,
    /// Comma separated.
    pub ingredients: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDto {
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
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Recipe> for RecipeDto {
    fn from(r: Recipe) -> Self {
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            ingredients: r.ingredients,
            instructions: r.instructions,
            cooking_time: r.cooking_time,
            cuisine_type: r.cuisine_type,
            difficulty_level: r.difficulty_level,
            servings: r.servings,
            image_url: r.image_url,
            video_url: r.video_url,
            created_by: r.created_by,
            created_at: r.created,
            updated_at: r.updated,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub pages: i64,
}

impl Pagination {
    pub fn new(total: i64, page: u32, limit: u32) -> Self {
        let limit_i = i64::from(limit.max(1));
        Self {
            total,
            page,
            limit,
            pages: (total + limit_i - 1) / limit_i,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeListResponse {
    pub recipes: Vec<RecipeDto>,
    pub pagination: Pagination,
}

/// Body for creating or editing a recipe. On edit, absent fields are kept.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<Vec<String>>,
    pub cooking_time: Option<i64>,
    pub cuisine_type: Option<String>,
    pub difficulty_level: Option<String>,
    pub servings: Option<i64>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub mood: Option<String>,
    pub user_preferences: Option<Value>,
}

/// `includePartialMatches` may be sent too; it has no effect.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientsRequest {
    pub ingredients: Option<Value>,
    pub max_additional_ingredients: Option<u32>,
}

impl IngredientsRequest {
    /// The ingredient list when it is a non-empty array of strings.
    pub fn ingredient_list(&self) -> Option<Vec<String>> {
        let items = self.ingredients.as_ref()?.as_array()?;
        if items.is_empty() {
            return None;
        }
        items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct RecipesResponse<T> {
    pub recipes: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct VideoSearchQuery {
    pub q: Option<String>,
    pub max: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub prompt: Option<String>,
}
