use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use super::model::*;
use super::repo::*;

const RECIPE_COLUMNS: &str = "id, title, description, ingredients, instructions, cooking_time, \
     cuisine_type, difficulty_level, servings, image_url, video_url, created_by, created, updated";

type RecipeRow = (
    String,
    String,
    Option<String>,
    String,
    String,
    i64,
    Option<String>,
    Option<String>,
    Option<i64>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

pub struct SqliteRepository {
    pool: SqlitePool,
    token_cache: Arc<RwLock<HashMap<String, AccessToken>>>,
}

impl SqliteRepository {
    pub async fn new(db_path: &str) -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str(db_path)?.create_if_missing(true);

        // Every connection to an in-memory database sees its own database,
        // so those get a single connection that is never recycled.
        let pool_options = if db_path.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(options).await?;

        let repo = Self {
            pool,
            token_cache: Arc::new(RwLock::new(HashMap::new())),
        };

        repo.init_schema().await?;

        info!("Database initialized at {}", db_path);

        Ok(repo)
    }

    async fn init_schema(&self) -> DbResult<()> {
        let schema = include_str!("schema.sql");
        sqlx::query(schema).execute(&self.pool).await?;
        Ok(())
    }

    /// Periodically drop access tokens older than `token_days`.
    pub fn start_background_tasks(self: Arc<Self>, token_days: i64) {
        let repo = Arc::clone(&self);
        tokio::spawn(async move {
            repo.token_purge_loop(token_days).await;
        });
    }

    async fn token_purge_loop(&self, token_days: i64) {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(3600));
        loop {
            interval.tick().await;
            match self.purge_expired_tokens(token_days).await {
                Ok(0) => {}
                Ok(n) => info!("Purged {} expired access tokens", n),
                Err(e) => error!("Failed to purge expired tokens: {}", e),
            }
        }
    }

    pub async fn purge_expired_tokens(&self, token_days: i64) -> DbResult<u64> {
        let now = Utc::now();
        let cutoff = (now - chrono::Duration::days(token_days)).to_rfc3339();

        {
            let mut cache = self.token_cache.write().await;
            cache.retain(|_, t| !t.is_expired(token_days, now));
        }

        let result = sqlx::query("DELETE FROM accesstokens WHERE created IS NULL OR created < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

fn parse_timestamp(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    })
}

fn recipe_from_row(r: RecipeRow) -> DbResult<Recipe> {
    Ok(Recipe {
        id: r.0,
        title: r.1,
        description: r.2,
        ingredients: serde_json::from_str(&r.3)?,
        instructions: serde_json::from_str(&r.4)?,
        cooking_time: r.5,
        cuisine_type: r.6,
        difficulty_level: r.7,
        servings: r.8,
        image_url: r.9,
        video_url: r.10,
        created_by: r.11,
        created: parse_timestamp(r.12),
        updated: parse_timestamp(r.13),
    })
}

fn map_insert_error(e: sqlx::Error, what: String) -> DbError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            DbError::AlreadyExists(what)
        }
        _ => DbError::Sqlx(e),
    }
}

/// WHERE clause and its bind values for a recipe listing.
fn recipe_filter(query: &RecipeQuery) -> (String, Vec<String>) {
    let mut conditions = Vec::new();
    let mut binds = Vec::new();

    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        conditions.push("(title LIKE ? OR description LIKE ? OR cuisine_type LIKE ?)".to_string());
        let pattern = format!("%{}%", search.trim());
        binds.extend(std::iter::repeat(pattern).take(3));
    }

    if let Some(cuisine) = query.cuisine.as_deref().filter(|s| !s.trim().is_empty()) {
        conditions.push("cuisine_type LIKE ?".to_string());
        binds.push(format!("%{}%", cuisine.trim()));
    }

    let ingredients: Vec<&str> = query
        .ingredients
        .iter()
        .map(|i| i.trim())
        .filter(|i| !i.is_empty())
        .collect();
    if !ingredients.is_empty() {
        let any = vec!["ingredients LIKE ?"; ingredients.len()].join(" OR ");
        conditions.push(format!("({})", any));
        binds.extend(ingredients.iter().map(|i| format!("%{}%", i.to_lowercase())));
    }

    if conditions.is_empty() {
        (String::new(), binds)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), binds)
    }
}

#[async_trait]
impl UserRepo for SqliteRepository {
    async fn get_user_by_email(&self, email: &str) -> DbResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, email, password, created, lastlogin FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => DbError::NotFound(format!("User not found: {}", email)),
            _ => DbError::Sqlx(e),
        })
    }

    async fn get_user_by_id(&self, id: &str) -> DbResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, email, password, created, lastlogin FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => DbError::NotFound(format!("User not found: {}", id)),
            _ => DbError::Sqlx(e),
        })
    }

    async fn user_exists(&self, username: &str, email: &str) -> DbResult<bool> {
        let (count,) = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM users WHERE email = ? OR username = ?",
        )
        .bind(email)
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn insert_user(&self, user: &User) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO users (id, username, email, password, created, lastlogin) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.created)
        .bind(&user.lastlogin)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, format!("User {}", user.username)))?;
        Ok(())
    }

    async fn update_user(&self, user: &User) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE users SET username = ?, email = ?, password = ?, lastlogin = ? WHERE id = ?",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.lastlogin)
        .bind(&user.id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, format!("User {}", user.username)))?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("User not found: {}", user.id)));
        }
        Ok(())
    }
}

#[async_trait]
impl AccessTokenRepo for SqliteRepository {
    async fn get_token(&self, token: &str) -> DbResult<AccessToken> {
        {
            let cache = self.token_cache.read().await;
            if let Some(t) = cache.get(token) {
                return Ok(t.clone());
            }
        }

        let result = sqlx::query_as::<_, (String, String, Option<String>)>(
            "SELECT token, userid, created FROM accesstokens WHERE token = ?",
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => DbError::NotFound("Token not found".to_string()),
            _ => DbError::Sqlx(e),
        })?;

        let access_token = AccessToken {
            token: result.0,
            userid: result.1,
            created: parse_timestamp(result.2),
        };

        let mut cache = self.token_cache.write().await;
        cache.insert(token.to_string(), access_token.clone());

        Ok(access_token)
    }

    async fn insert_token(&self, token: &AccessToken) -> DbResult<()> {
        sqlx::query("INSERT OR REPLACE INTO accesstokens (token, userid, created) VALUES (?, ?, ?)")
            .bind(&token.token)
            .bind(&token.userid)
            .bind(token.created.as_ref().map(|dt| dt.to_rfc3339()))
            .execute(&self.pool)
            .await?;

        let mut cache = self.token_cache.write().await;
        cache.insert(token.token.clone(), token.clone());
        Ok(())
    }

    async fn delete_token(&self, token: &str) -> DbResult<()> {
        {
            let mut cache = self.token_cache.write().await;
            cache.remove(token);
        }

        sqlx::query("DELETE FROM accesstokens WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RecipeRepo for SqliteRepository {
    async fn search_recipes(&self, query: &RecipeQuery) -> DbResult<RecipePage> {
        let (filter, binds) = recipe_filter(query);

        let count_sql = format!("SELECT COUNT(*) FROM recipes{}", filter);
        let mut count_query = sqlx::query_as::<_, (i64,)>(&count_sql);
        for b in &binds {
            count_query = count_query.bind(b);
        }
        let (total,) = count_query.fetch_one(&self.pool).await?;

        let list_sql = format!(
            "SELECT {} FROM recipes{} ORDER BY created DESC, rowid DESC LIMIT ? OFFSET ?",
            RECIPE_COLUMNS, filter
        );
        debug!(sql = %list_sql, "recipe search");
        let mut list_query = sqlx::query_as::<_, RecipeRow>(&list_sql);
        for b in &binds {
            list_query = list_query.bind(b);
        }
        let rows = list_query
            .bind(query.limit as i64)
            .bind(query.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        let recipes = rows
            .into_iter()
            .map(recipe_from_row)
            .collect::<DbResult<Vec<_>>>()?;

        Ok(RecipePage { recipes, total })
    }

    async fn get_recipe(&self, id: &str) -> DbResult<Recipe> {
        let sql = format!("SELECT {} FROM recipes WHERE id = ?", RECIPE_COLUMNS);
        let row = sqlx::query_as::<_, RecipeRow>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => DbError::NotFound(format!("Recipe not found: {}", id)),
                _ => DbError::Sqlx(e),
            })?;
        recipe_from_row(row)
    }

    async fn insert_recipe(&self, recipe: &Recipe) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO recipes
            (id, title, description, ingredients, instructions, cooking_time, cuisine_type,
             difficulty_level, servings, image_url, video_url, created_by, created, updated)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&recipe.id)
        .bind(&recipe.title)
        .bind(&recipe.description)
        .bind(serde_json::to_string(&recipe.ingredients)?)
        .bind(serde_json::to_string(&recipe.instructions)?)
        .bind(recipe.cooking_time)
        .bind(&recipe.cuisine_type)
        .bind(&recipe.difficulty_level)
        .bind(recipe.servings)
        .bind(&recipe.image_url)
        .bind(&recipe.video_url)
        .bind(&recipe.created_by)
        .bind(recipe.created.as_ref().map(|dt| dt.to_rfc3339()))
        .bind(recipe.updated.as_ref().map(|dt| dt.to_rfc3339()))
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, format!("Recipe {}", recipe.title)))?;
        Ok(())
    }

    async fn update_recipe(&self, recipe: &Recipe) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE recipes
            SET title = ?, description = ?, ingredients = ?, instructions = ?, cooking_time = ?,
                cuisine_type = ?, difficulty_level = ?, servings = ?, image_url = ?, video_url = ?,
                updated = ?
            WHERE id = ?",
        )
        .bind(&recipe.title)
        .bind(&recipe.description)
        .bind(serde_json::to_string(&recipe.ingredients)?)
        .bind(serde_json::to_string(&recipe.instructions)?)
        .bind(recipe.cooking_time)
        .bind(&recipe.cuisine_type)
        .bind(&recipe.difficulty_level)
        .bind(recipe.servings)
        .bind(&recipe.image_url)
        .bind(&recipe.video_url)
        .bind(recipe.updated.as_ref().map(|dt| dt.to_rfc3339()))
        .bind(&recipe.id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, format!("Recipe {}", recipe.title)))?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("Recipe not found: {}", recipe.id)));
        }
        Ok(())
    }

    async fn delete_recipe(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("Recipe not found: {}", id)));
        }
        Ok(())
    }

    async fn seed_recipes(&self, recipes: &[Recipe]) -> DbResult<u64> {
        let mut added = 0;
        for recipe in recipes {
            match self.insert_recipe(recipe).await {
                Ok(()) => added += 1,
                Err(DbError::AlreadyExists(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_repo() -> SqliteRepository {
        SqliteRepository::new("sqlite::memory:").await.unwrap()
    }

    fn recipe(id: &str, title: &str, cuisine: &str, ingredients: &[&str]) -> Recipe {
        Recipe {
            id: id.to_string(),
            title: title.to_string(),
            description: Some(format!("{} description", title)),
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
            instructions: vec!["Cook".to_string()],
            cooking_time: 20,
            cuisine_type: Some(cuisine.to_string()),
            difficulty_level: Some("Easy".to_string()),
            servings: Some(2),
            image_url: None,
            video_url: None,
            created_by: None,
            created: Some(Utc::now()),
            updated: None,
        }
    }

    #[tokio::test]
    async fn test_recipe_roundtrip_and_search() {
        let repo = memory_repo().await;
        repo.insert_recipe(&recipe("1", "Pasta Bake", "Italian", &["200g pasta", "cheese"]))
            .await
            .unwrap();
        repo.insert_recipe(&recipe("2", "Fried Rice", "Asian", &["rice", "2 eggs"]))
            .await
            .unwrap();
        repo.insert_recipe(&recipe("3", "Risotto", "Italian", &["rice", "parmesan"]))
            .await
            .unwrap();

        let fetched = repo.get_recipe("2").await.unwrap();
        assert_eq!(fetched.ingredients, vec!["rice", "2 eggs"]);

        let italian = repo
            .search_recipes(&RecipeQuery { cuisine: Some("italian".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(italian.total, 2);

        let rice = repo
            .search_recipes(&RecipeQuery {
                ingredients: vec!["Rice".into(), "tofu".into()],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(rice.total, 2);

        let paged = repo
            .search_recipes(&RecipeQuery { page: 2, limit: 2, ..Default::default() })
            .await
            .unwrap();
        assert_eq!(paged.total, 3);
        assert_eq!(paged.recipes.len(), 1);

        let found = repo
            .search_recipes(&RecipeQuery { search: Some("bake".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(found.recipes.len(), 1);
        assert_eq!(found.recipes[0].id, "1");
    }

    #[tokio::test]
    async fn test_recipe_duplicate_title_and_delete() {
        let repo = memory_repo().await;
        let r = recipe("1", "Soup", "French", &["water"]);
        repo.insert_recipe(&r).await.unwrap();

        let dup = recipe("2", "Soup", "French", &["water"]);
        assert!(matches!(repo.insert_recipe(&dup).await, Err(DbError::AlreadyExists(_))));
        assert_eq!(repo.seed_recipes(&[dup, recipe("3", "Stew", "Irish", &[])]).await.unwrap(), 1);

        repo.delete_recipe("1").await.unwrap();
        assert!(matches!(repo.get_recipe("1").await, Err(DbError::NotFound(_))));
        assert!(matches!(repo.delete_recipe("1").await, Err(DbError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_users_and_tokens() {
        let repo = memory_repo().await;
        let user = User {
            id: "u1".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "hash".to_string(),
            created: None,
            lastlogin: None,
        };
        repo.insert_user(&user).await.unwrap();
        assert!(repo.user_exists("alice", "other@example.com").await.unwrap());
        assert!(repo.user_exists("bob", "alice@example.com").await.unwrap());
        assert!(!repo.user_exists("bob", "bob@example.com").await.unwrap());
        assert_eq!(repo.get_user_by_email("alice@example.com").await.unwrap().id, "u1");

        let token = AccessToken {
            token: "tok".to_string(),
            userid: "u1".to_string(),
            created: Some(Utc::now() - chrono::Duration::days(40)),
        };
        repo.insert_token(&token).await.unwrap();
        assert_eq!(repo.get_token("tok").await.unwrap().userid, "u1");

        assert_eq!(repo.purge_expired_tokens(30).await.unwrap(), 1);
        assert!(matches!(repo.get_token("tok").await, Err(DbError::NotFound(_))));
    }
}
