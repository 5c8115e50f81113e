use axum::{Json, extract::State, http::{HeaderMap, StatusCode}};
use groupframe_db::models::User;
use groupframe_services::auth::Role;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{error::ApiError, extractors::auth::AdminUser, state::AppState};

use super::access_cookie;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 3, max = 40))]
    pub username: String,
    #[validate(length(min = 1, max = 100))]
    pub display_name: String,
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub display_name: String,
}

impl UserResponse {
    fn from_user(user: User) -> Result<Self, ApiError> {
        let id = user
            .id
            .ok_or_else(|| ApiError::Internal("User has no id".to_string()))?;
        Ok(Self {
            id: id.to_hex(),
            email: user.email,
            username: user.username,
            display_name: user.display_name,
        })
    }
}

/// `login` is an email when it contains `@`, a username otherwise.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, HeaderMap, Json<AuthResponse>), ApiError> {
    body.validate()?;
    let password_hash = state.auth.hash_password(&body.password)?;

    let user = state
        .users
        .create(
            body.email.trim().to_string(),
            body.username.trim().to_string(),
            body.display_name.trim().to_string(),
            password_hash,
        )
        .await?;

    let (headers, response) = issue_session(&state, user)?;
    tracing::info!(user_id = %response.user.id, "Admin registered");
    Ok((StatusCode::CREATED, headers, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    let login = body
        .login
        .or(body.email)
        .or(body.username)
        .ok_or_else(|| ApiError::BadRequest("Either username or email is required".to_string()))?;

    let user = state
        .users
        .find_by_login(login.trim())
        .await
        .map_err(|_| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let password_hash = user
        .password_hash
        .as_ref()
        .ok_or_else(|| ApiError::Unauthorized("No password set".to_string()))?;

    if !state.auth.verify_password(&body.password, password_hash)? {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }
    if let Some(id) = user.id {
        state.users.touch_login(id).await?;
    }

    let (headers, response) = issue_session(&state, user)?;
    Ok((headers, Json(response)))
}

pub async fn logout() -> Result<HeaderMap, ApiError> {
    access_cookie("", 0)
}

pub async fn me(
    State(state): State<AppState>,
    auth: AdminUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.base.find_by_id(auth.user_id).await?;
    Ok(Json(UserResponse::from_user(user)?))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    let claims = state.auth.verify_refresh_token(&body.refresh_token)?;
    if claims.role != Role::Admin {
        return Err(ApiError::Forbidden("Insufficient role".to_string()));
    }
    let user = state.users.base.find_by_id(claims.subject_id()?).await?;
    if !user.is_active {
        return Err(ApiError::Unauthorized("Account disabled".to_string()));
    }

    let (headers, response) = issue_session(&state, user)?;
    Ok((headers, Json(response)))
}

fn issue_session(state: &AppState, user: User) -> Result<(HeaderMap, AuthResponse), ApiError> {
    let user_id = user
        .id
        .ok_or_else(|| ApiError::Internal("User has no id".to_string()))?;
    let user = UserResponse::from_user(user)?;
    let tokens = state.auth.generate_tokens(user_id, Role::Admin)?;
    let headers = access_cookie(&tokens.access_token, tokens.expires_in)?;

    Ok((
        headers,
        AuthResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            user,
        },
    ))
}
