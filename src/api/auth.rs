use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use tracing::{debug, info};

use super::error::{ApiError, ApiResult};
use super::extract::ApiJson;
use super::types::*;
use crate::db::{AccessToken, AccessTokenRepo, DbError, User, UserRepo};
use crate::server::AppState;

/// The user behind a valid bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("Access token is required"))?;

        let access = match state.db.get_token(token).await {
            Ok(access) => access,
            Err(DbError::NotFound(_)) => return Err(invalid_token()),
            Err(e) => return Err(state.server_error("Authentication failed", e)),
        };

        if access.is_expired(state.config.auth.token_days, Utc::now()) {
            debug!(userid = %access.userid, "Rejecting expired token");
            return Err(invalid_token());
        }

        Ok(AuthUser {
            id: access.userid,
            token: access.token,
        })
    }
}

fn invalid_token() -> ApiError {
    ApiError::forbidden("Invalid or expired token")
}

/// Second word of the Authorization header, whatever the scheme.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .split_whitespace()
        .nth(1)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

async fn hash_password(password: String, cost: u32) -> Result<String, String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())
}

async fn verify_password(password: String, hash: String) -> Result<bool, String> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())
}

async fn issue_token(state: &AppState, userid: &str) -> Result<String, DbError> {
    let token = AccessToken {
        token: uuid::Uuid::new_v4().to_string(),
        userid: userid.to_string(),
        created: Some(Utc::now()),
    };
    state.db.insert_token(&token).await?;
    Ok(token.token)
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    const FAILED: &str = "Failed to register user";

    let (Some(username), Some(email), Some(password)) = (
        non_empty(&req.username),
        non_empty(&req.email),
        req.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::bad_request("All fields are required"));
    };

    let exists = state
        .db
        .user_exists(username, email)
        .await
        .map_err(|e| state.server_error(FAILED, e))?;
    if exists {
        return Err(ApiError::bad_request("User already exists"));
    }

    let hashed = hash_password(password.to_string(), state.config.auth.bcrypt_cost)
        .await
        .map_err(|e| state.server_error(FAILED, e))?;

    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        username: username.to_string(),
        email: email.to_string(),
        password: hashed,
        created: Some(Utc::now().to_rfc3339()),
        lastlogin: None,
    };
    state.db.insert_user(&user).await.map_err(|e| match e {
        DbError::AlreadyExists(_) => ApiError::bad_request("User already exists"),
        e => state.server_error(FAILED, e),
    })?;

    let token = issue_token(&state, &user.id)
        .await
        .map_err(|e| state.server_error(FAILED, e))?;

    info!(username = %user.username, "Registered new user");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    const FAILED: &str = "Failed to login";

    let (Some(email), Some(password)) = (
        non_empty(&req.email),
        req.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::bad_request("All fields are required"));
    };

    let mut user = match state.db.get_user_by_email(email).await {
        Ok(user) => user,
        Err(DbError::NotFound(_)) => return Err(ApiError::unauthorized("Invalid credentials")),
        Err(e) => return Err(state.server_error(FAILED, e)),
    };

    let valid = verify_password(password.to_string(), user.password.clone())
        .await
        .map_err(|e| state.server_error(FAILED, e))?;
    if !valid {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    user.lastlogin = Some(Utc::now().to_rfc3339());
    state
        .db
        .update_user(&user)
        .await
        .map_err(|e| state.server_error(FAILED, e))?;

    let token = issue_token(&state, &user.id)
        .await
        .map_err(|e| state.server_error(FAILED, e))?;

    Ok(Json(AuthResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        token,
    }))
}

pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> ApiResult<StatusCode> {
    state
        .db
        .delete_token(&auth.token)
        .await
        .map_err(|e| state.server_error("Failed to logout", e))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<UserResponse>> {
    match state.db.get_user_by_id(&auth.id).await {
        Ok(user) => Ok(Json(user.into())),
        Err(DbError::NotFound(_)) => Err(ApiError::not_found("User not found")),
        Err(e) => Err(state.server_error("Failed to get user", e)),
    }
}

pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Json<UserResponse>> {
    const FAILED: &str = "Failed to update profile";

    let mut user = match state.db.get_user_by_id(&auth.id).await {
        Ok(user) => user,
        Err(DbError::NotFound(_)) => return Err(ApiError::not_found("User not found")),
        Err(e) => return Err(state.server_error(FAILED, e)),
    };

    let mut changed = false;
    if let Some(username) = non_empty(&req.username) {
        user.username = username.to_string();
        changed = true;
    }
    if let Some(email) = non_empty(&req.email) {
        user.email = email.to_string();
        changed = true;
    }
    if let Some(new_password) = req.new_password.as_deref().filter(|p| !p.is_empty()) {
        let current = req.current_password.clone().unwrap_or_default();
        let valid = verify_password(current, user.password.clone())
            .await
            .map_err(|e| state.server_error(FAILED, e))?;
        if !valid {
            return Err(ApiError::unauthorized("Current password is incorrect"));
        }
        user.password = hash_password(new_password.to_string(), state.config.auth.bcrypt_cost)
            .await
            .map_err(|e| state.server_error(FAILED, e))?;
        changed = true;
    }

    if !changed {
        return Err(ApiError::bad_request("No fields to update"));
    }

    state.db.update_user(&user).await.map_err(|e| match e {
        DbError::AlreadyExists(_) => ApiError::bad_request("User already exists"),
        e => state.server_error(FAILED, e),
    })?;

    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::build_router;
    use crate::server::testing::*;
    use axum::http::{HeaderValue, Method};
    use serde_json::json;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer"));
        assert_eq!(bearer_token(&headers), None);
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let app = build_router(test_state(None).await);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"username": "ann", "email": "ann@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "All fields are required");

        register_user(&app, "ann").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"username": "other", "email": "ann@example.com", "password": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "User already exists");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "ann@example.com", "password": "wrong"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid credentials");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "ann@example.com", "password": "secret1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "ann");
        let token = body["token"].as_str().unwrap().to_string();

        let (status, body) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "ann@example.com");
        assert!(body.get("password").is_none());
    }

    #[tokio::test]
    async fn test_token_required() {
        let app = build_router(test_state(None).await);

        let (status, body) = send(&app, Method::GET, "/api/auth/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Access token is required");

        let (status, body) = send(&app, Method::GET, "/api/auth/me", Some("bogus"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Invalid or expired token");
    }

    #[tokio::test]
    async fn test_expired_token() {
        let state = test_state(None).await;
        let app = build_router(state.clone());
        state
            .db
            .insert_token(&AccessToken {
                token: "old".to_string(),
                userid: "u1".to_string(),
                created: Some(Utc::now() - chrono::Duration::days(31)),
            })
            .await
            .unwrap();

        let (status, _) = send(&app, Method::GET, "/api/auth/me", Some("old"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_update_profile() {
        let app = build_router(test_state(None).await);
        let token = register_user(&app, "bob").await;

        let (status, body) =
            send(&app, Method::PUT, "/api/auth/profile", Some(&token), Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No fields to update");

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/auth/profile",
            Some(&token),
            Some(json!({"newPassword": "n3w", "currentPassword": "nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Current password is incorrect");

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/auth/profile",
            Some(&token),
            Some(json!({"username": "robert", "newPassword": "n3w", "currentPassword": "secret1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "robert");

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "bob@example.com", "password": "n3w"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_logout() {
        let app = build_router(test_state(None).await);
        let token = register_user(&app, "cat").await;

        let (status, _) = send(&app, Method::POST, "/api/auth/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
