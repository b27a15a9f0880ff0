use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::{debug, warn};

use super::auth::AuthUser;
use super::error::{ApiError, ApiResult};
use super::extract::{ApiJson, ApiQuery};
use super::types::*;
use crate::ai::{self, fallback, prompts, GeneratedRecipe};
use crate::db::{DbError, Recipe, RecipeQuery, RecipeRepo};
use crate::ingredients::Pantry;
use crate::recipes::{match_pantry, remember, SuggestedRecipe};
use crate::server::AppState;
use crate::youtube::{CookingVideo, VideoSummary};

const MAX_PAGE_SIZE: u32 = 100;
const DEFAULT_VIDEO_COUNT: usize = 8;

/// Ask the model, or serve the built-in recipes when it is missing or fails.
async fn generate_or_fallback(
    state: &AppState,
    request: &str,
    builtin: impl FnOnce() -> Vec<GeneratedRecipe>,
) -> Vec<GeneratedRecipe> {
    let Some(ref generator) = state.ai else {
        debug!("No AI client configured, using built-in recipes");
        return builtin();
    };
    match ai::generate_recipes(generator.as_ref(), request).await {
        Ok(recipes) => recipes,
        Err(e) => {
            warn!("AI recipe generation failed, using built-in recipes: {}", e);
            builtin()
        }
    }
}

pub async fn list_recipes(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<RecipeListQuery>,
) -> ApiResult<Json<RecipeListResponse>> {
    let query = RecipeQuery {
        page: params.page.unwrap_or(1).max(1),
        limit: params.limit.unwrap_or(10).clamp(1, MAX_PAGE_SIZE),
        search: params.search,
        cuisine: params.cuisine,
        ingredients: params
            .ingredients
            .as_deref()
            .map(|list| list.split(',').map(|i| i.trim().to_string()).collect())
            .unwrap_or_default(),
    };

    let page = state
        .db
        .search_recipes(&query)
        .await
        .map_err(|e| state.server_error("Failed to fetch recipes", e))?;

    Ok(Json(RecipeListResponse {
        recipes: page.recipes.into_iter().map(RecipeDto::from).collect(),
        pagination: Pagination::new(page.total, query.page, query.limit),
    }))
}

pub async fn get_recipe(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Response> {
    if let Some(suggestion) = state.suggestions.get(&id).await {
        return Ok(Json(suggestion).into_response());
    }

    match state.db.get_recipe(&id).await {
        Ok(recipe) => Ok(Json(RecipeDto::from(recipe)).into_response()),
        Err(DbError::NotFound(_)) => Err(ApiError::not_found("Recipe not found")),
        Err(e) => Err(state.server_error("Failed to fetch recipe", e)),
    }
}

fn required_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required_list(value: &Option<Vec<String>>) -> Option<Vec<String>> {
    value.clone().filter(|list| !list.is_empty())
}

pub async fn create_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(input): ApiJson<RecipeInput>,
) -> ApiResult<impl IntoResponse> {
    let (Some(title), Some(ingredients), Some(instructions)) = (
        required_text(&input.title),
        required_list(&input.ingredients),
        required_list(&input.instructions),
    ) else {
        return Err(ApiError::bad_request(
            "Title, ingredients and instructions are required",
        ));
    };

    let now = Utc::now();
    let recipe = Recipe {
        id: uuid::Uuid::new_v4().to_string(),
        title,
        description: input.description,
        ingredients,
        instructions,
        cooking_time: input.cooking_time.unwrap_or(30),
        cuisine_type: input.cuisine_type,
        difficulty_level: input.difficulty_level,
        servings: input.servings,
        image_url: input.image_url,
        video_url: input.video_url,
        created_by: Some(auth.id),
        created: Some(now),
        updated: Some(now),
    };

    state.db.insert_recipe(&recipe).await.map_err(|e| match e {
        DbError::AlreadyExists(_) => ApiError::bad_request("Recipe already exists"),
        e => state.server_error("Failed to create recipe", e),
    })?;

    Ok((StatusCode::CREATED, Json(RecipeDto::from(recipe))))
}

/// Load a recipe for modification by `user`.
async fn owned_recipe(state: &AppState, id: &str, user: &AuthUser) -> ApiResult<Recipe> {
    let recipe = match state.db.get_recipe(id).await {
        Ok(recipe) => recipe,
        Err(DbError::NotFound(_)) => return Err(ApiError::not_found("Recipe not found")),
        Err(e) => return Err(state.server_error("Failed to fetch recipe", e)),
    };
    if recipe.created_by.as_deref() != Some(user.id.as_str()) {
        return Err(ApiError::forbidden("Not authorized to modify this recipe"));
    }
    Ok(recipe)
}

pub async fn update_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<RecipeInput>,
) -> ApiResult<Json<RecipeDto>> {
    let mut recipe = owned_recipe(&state, &id, &auth).await?;

    if let Some(title) = required_text(&input.title) {
        recipe.title = title;
    }
    if let Some(ingredients) = required_list(&input.ingredients) {
        recipe.ingredients = ingredients;
    }
    if let Some(instructions) = required_list(&input.instructions) {
        recipe.instructions = instructions;
    }
    if let Some(cooking_time) = input.cooking_time {
        recipe.cooking_time = cooking_time;
    }
    if input.description.is_some() {
        recipe.description = input.description;
    }
    if input.cuisine_type.is_some() {
        recipe.cuisine_type = input.cuisine_type;
    }
    if input.difficulty_level.is_some() {
        recipe.difficulty_level = input.difficulty_level;
    }
    if input.servings.is_some() {
        recipe.servings = input.servings;
    }
    if input.image_url.is_some() {
        recipe.image_url = input.image_url;
    }
    if input.video_url.is_some() {
        recipe.video_url = input.video_url;
    }
    recipe.updated = Some(Utc::now());

    state.db.update_recipe(&recipe).await.map_err(|e| match e {
        DbError::AlreadyExists(_) => ApiError::bad_request("Recipe already exists"),
        DbError::NotFound(_) => ApiError::not_found("Recipe not found"),
        e => state.server_error("Failed to update recipe", e),
    })?;

    Ok(Json(RecipeDto::from(recipe)))
}

pub async fn delete_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    owned_recipe(&state, &id, &auth).await?;

    state.db.delete_recipe(&id).await.map_err(|e| match e {
        DbError::NotFound(_) => ApiError::not_found("Recipe not found"),
        e => state.server_error("Failed to delete recipe", e),
    })?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn recommendations(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RecommendationRequest>,
) -> ApiResult<Json<RecipesResponse<SuggestedRecipe>>> {
    let Some(mood) = required_text(&req.mood) else {
        return Err(ApiError::bad_request("Mood is required"));
    };

    let prompt = prompts::mood_prompt(&mood, req.user_preferences.as_ref());
    let generated = generate_or_fallback(&state, &prompt, || fallback::mood_recipes(&mood)).await;

    let recipes: Vec<SuggestedRecipe> = generated.into_iter().map(SuggestedRecipe::new).collect();
    remember(&state.suggestions, &recipes).await;

    Ok(Json(RecipesResponse { recipes }))
}

pub async fn by_ingredients(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<IngredientsRequest>,
) -> ApiResult<Json<RecipesResponse<SuggestedRecipe>>> {
    let Some(ingredients) = req.ingredient_list() else {
        return Err(ApiError::bad_request("Valid ingredients array is required"));
    };

    let pantry = Pantry::new(&ingredients);
    debug!(pantry = ?pantry.normalized().collect::<Vec<_>>(), "Normalized pantry");

    let prompt = prompts::ingredients_prompt(&ingredients, req.max_additional_ingredients);
    let generated = generate_or_fallback(&state, &prompt, fallback::pantry_recipes).await;

    let recipes = match_pantry(generated, &pantry);
    remember(&state.suggestions, &recipes).await;

    Ok(Json(RecipesResponse { recipes }))
}

pub async fn youtube_search(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> ApiResult<Json<Option<CookingVideo>>> {
    let Some(ref videos) = state.videos else {
        debug!("No YouTube client configured");
        return Ok(Json(None));
    };

    videos
        .find_cooking_video(&query)
        .await
        .map(Json)
        .map_err(|e| state.server_error("Failed to search YouTube", e))
}

pub async fn search_videos(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<VideoSearchQuery>,
) -> ApiResult<Json<Vec<VideoSummary>>> {
    let Some(q) = required_text(&params.q) else {
        return Err(ApiError::bad_request("Search query is required"));
    };
    let Some(ref videos) = state.videos else {
        return Err(ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Video search is not configured",
        ));
    };

    let max = params.max.unwrap_or(DEFAULT_VIDEO_COUNT).clamp(1, 25);
    match videos.search_videos(&q, max).await {
        Ok(found) => Ok(Json(found)),
        Err(e) => {
            warn!("Video search for {:?} failed: {}", q, e);
            Err(ApiError::new(StatusCode::BAD_GATEWAY, "Failed to search videos"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::CannedGenerator;
    use crate::server::build_router;
    use crate::server::testing::*;
    use axum::http::Method;
    use serde_json::json;

    const AI_ANSWER: &str = r#"```json
{"recipes": [
  {"title": "Fried Rice", "requiredIngredients": ["2 cups rice", "eggs"], "ingredients": ["rice", "eggs", "soy sauce"]},
  {"title": "Egg Fried Noodles", "requiredIngredients": ["noodles", "eggs", "spring onions"]},
  {"title": "Rice Pudding", "requiredIngredients": ["rice", "milk", "sugar", "vanilla"],}
]}
```"#;

    #[tokio::test]
    async fn test_list_recipes() {
        let app = build_router(test_state(None).await);

        let (status, body) = send(&app, Method::GET, "/api/recipes?limit=3", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recipes"].as_array().unwrap().len(), 3);
        assert_eq!(body["pagination"], json!({"total": 4, "page": 1, "limit": 3, "pages": 2}));
        assert!(body["recipes"][0]["cookingTime"].is_number());

        let (_, body) = send(&app, Method::GET, "/api/recipes?cuisine=italian", None, None).await;
        assert_eq!(body["pagination"]["total"], 1);
        assert_eq!(body["recipes"][0]["title"], "Classic Spaghetti Carbonara");

        let (_, body) =
            send(&app, Method::GET, "/api/recipes?ingredients=chicken,tofu", None, None).await;
        assert_eq!(body["pagination"]["total"], 2);
    }

    #[tokio::test]
    async fn test_by_ingredients_marks_missing() {
        let app = build_router(test_state(Some(CannedGenerator::ok(AI_ANSWER))).await);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/recipes/by-ingredients",
            None,
            Some(json!({"ingredients": ["Rice", "fresh eggs"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let recipes = body["recipes"].as_array().unwrap();
        assert_eq!(recipes.len(), 3);
        assert!(recipes[0].get("missingIngredients").is_none());
        assert_eq!(recipes[1]["missingIngredients"], json!(["noodles", "spring onions"]));
        assert_eq!(recipes[2]["missingIngredients"], json!(["milk", "sugar", "vanilla"]));

        let id = recipes[1]["id"].as_str().unwrap();
        let (status, body) = send(&app, Method::GET, &format!("/api/recipes/{}", id), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Egg Fried Noodles");
        assert_eq!(body["missingIngredients"], json!(["noodles", "spring onions"]));
    }

    #[tokio::test]
    async fn test_by_ingredients_returns_every_recipe() {
        let app = build_router(test_state(Some(CannedGenerator::ok(AI_ANSWER))).await);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/recipes/by-ingredients",
            None,
            Some(json!({
                "ingredients": ["rice"],
                "includePartialMatches": false,
                "maxAdditionalIngredients": 1
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let recipes = body["recipes"].as_array().unwrap();
        assert_eq!(recipes.len(), 3);
        assert_eq!(recipes[1]["missingIngredients"], json!(["noodles", "eggs", "spring onions"]));
    }

    #[tokio::test]
    async fn test_same_title_suggestions_kept_apart() {
        let answer = r#"{"recipes": [
            {"title": "Fried Rice", "description": "first", "requiredIngredients": ["rice"]},
            {"title": "Fried Rice", "description": "second", "requiredIngredients": ["rice", "eggs"]}
        ]}"#;
        let app = build_router(test_state(Some(CannedGenerator::ok(answer))).await);

        let (_, body) = send(
            &app,
            Method::POST,
            "/api/recipes/by-ingredients",
            None,
            Some(json!({"ingredients": ["rice"]})),
        )
        .await;
        let first = body["recipes"][0]["id"].as_str().unwrap();
        let second = body["recipes"][1]["id"].as_str().unwrap();
        assert_ne!(first, second);

        let (status, fetched) = send(&app, Method::GET, &format!("/api/recipes/{}", first), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["description"], "first");
        let (_, fetched) = send(&app, Method::GET, &format!("/api/recipes/{}", second), None, None).await;
        assert_eq!(fetched["description"], "second");
        assert_eq!(fetched["missingIngredients"], json!(["eggs"]));
    }

    #[tokio::test]
    async fn test_malformed_input_is_bad_request() {
        let app = build_router(test_state(None).await);

        for payload in [
            json!({"ingredients": ["rice"], "maxAdditionalIngredients": -1}),
            json!({"ingredients": ["rice"], "maxAdditionalIngredients": "3"}),
        ] {
            let (status, body) =
                send(&app, Method::POST, "/api/recipes/by-ingredients", None, Some(payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "Invalid request body");
        }

        let (status, body) = send(&app, Method::GET, "/api/recipes?page=abc", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid query string");

        let (status, body) = send(&app, Method::POST, "/api/recipes/recommendations", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request body");
    }

    #[tokio::test]
    async fn test_by_ingredients_validation_and_fallback() {
        let app = build_router(test_state(None).await);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/recipes/by-ingredients",
            None,
            Some(json!({"ingredients": []})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Valid ingredients array is required");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/recipes/by-ingredients",
            None,
            Some(json!({"ingredients": ["pasta", "garlic", "olive oil"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let recipes = body["recipes"].as_array().unwrap();
        assert_eq!(recipes[0]["title"], "Simple Pasta Dish");
        assert!(recipes[0].get("missingIngredients").is_none());
        assert_eq!(recipes[1]["missingIngredients"], json!(["Eggs", "Butter", "Salt"]));
    }

    #[tokio::test]
    async fn test_recommendations() {
        let app = build_router(test_state(Some(CannedGenerator::failing("quota"))).await);

        let (status, body) =
            send(&app, Method::POST, "/api/recipes/recommendations", None, Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Mood is required");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/recipes/recommendations",
            None,
            Some(json!({"mood": "stressed"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recipes"][0]["title"], "Comforting Mac and Cheese");

        let id = body["recipes"][0]["id"].as_str().unwrap();
        let (status, _) = send(&app, Method::GET, &format!("/api/recipes/{}", id), None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_recipe_ownership() {
        let app = build_router(test_state(None).await);
        let owner = register_user(&app, "owner").await;
        let other = register_user(&app, "other").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/recipes",
            Some(&owner),
            Some(json!({"title": "Toast", "ingredients": ["bread"]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Title, ingredients and instructions are required");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/recipes",
            Some(&owner),
            Some(json!({"title": "Toast", "ingredients": ["bread"], "instructions": ["toast"]})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["cookingTime"], 30);
        let uri = format!("/api/recipes/{}", body["id"].as_str().unwrap());

        let (status, _) = send(&app, Method::PUT, &uri, Some(&other), Some(json!({"cookingTime": 5}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) =
            send(&app, Method::PUT, &uri, Some(&owner), Some(json!({"cookingTime": 5}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cookingTime"], 5);
        assert_eq!(body["title"], "Toast");

        let (status, _) = send(&app, Method::DELETE, &uri, Some(&other), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = send(&app, Method::DELETE, &uri, Some(&owner), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, body) = send(&app, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Recipe not found");
    }

    #[tokio::test]
    async fn test_seeded_recipes_are_read_only() {
        let app = build_router(test_state(None).await);
        let token = register_user(&app, "dan").await;

        let (_, body) = send(&app, Method::GET, "/api/recipes?search=omelet", None, None).await;
        let uri = format!("/api/recipes/{}", body["recipes"][0]["id"].as_str().unwrap());
        let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_video_endpoints() {
        let app = build_router(test_state(None).await);

        let (status, body) =
            send(&app, Method::GET, "/api/recipes/youtube-search/pancakes", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["videoId"], "vid123");
        assert_eq!(body["viewCount"], "4200");

        let (_, body) = send(&app, Method::GET, "/api/recipes/youtube-search/nothing", None, None).await;
        assert!(body.is_null());

        let (status, body) = send(&app, Method::GET, "/api/videos/search?q=curry&max=2", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (status, _) = send(&app, Method::GET, "/api/videos/search", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
