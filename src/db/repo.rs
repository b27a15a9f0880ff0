use async_trait::async_trait;

use super::model::*;

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn get_user_by_email(&self, email: &str) -> DbResult<User>;
    async fn get_user_by_id(&self, id: &str) -> DbResult<User>;
    /// True when either the username or the email is already taken.
    async fn user_exists(&self, username: &str, email: &str) -> DbResult<bool>;
    async fn insert_user(&self, user: &User) -> DbResult<()>;
    async fn update_user(&self, user: &User) -> DbResult<()>;
}

#[async_trait]
pub trait AccessTokenRepo: Send + Sync {
    async fn get_token(&self, token: &str) -> DbResult<AccessToken>;
    async fn insert_token(&self, token: &AccessToken) -> DbResult<()>;
    async fn delete_token(&self, token: &str) -> DbResult<()>;
}

#[async_trait]
pub trait RecipeRepo: Send + Sync {
    async fn search_recipes(&self, query: &RecipeQuery) -> DbResult<RecipePage>;
    async fn get_recipe(&self, id: &str) -> DbResult<Recipe>;
    async fn insert_recipe(&self, recipe: &Recipe) -> DbResult<()>;
    async fn update_recipe(&self, recipe: &Recipe) -> DbResult<()>;
    async fn delete_recipe(&self, id: &str) -> DbResult<()>;
    /// Insert recipes whose title is not yet present. Returns how many were added.
    async fn seed_recipes(&self, recipes: &[Recipe]) -> DbResult<u64>;
}
