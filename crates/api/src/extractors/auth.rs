use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use bson::oid::ObjectId;
use groupframe_services::auth::{Claims, Role};

use crate::{error::ApiError, state::AppState};

/// An admin authenticated by an access token (Authorization header or
/// `access_token` cookie).
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub user_id: ObjectId,
    pub claims: Claims,
}

/// An ambassador authenticated by an OTP-issued access token.
#[derive(Debug, Clone)]
pub struct AmbassadorUser {
    pub ambassador_id: ObjectId,
    pub claims: Claims,
}

impl<S> FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let claims = access_claims(&app_state, &parts.headers, Role::Admin)?;
        let user_id = claims.subject_id()?;
        Ok(AdminUser { user_id, claims })
    }
}

impl<S> FromRequestParts<S> for AmbassadorUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let claims = access_claims(&app_state, &parts.headers, Role::Ambassador)?;
        let ambassador_id = claims.subject_id()?;
        Ok(AmbassadorUser {
            ambassador_id,
            claims,
        })
    }
}

fn access_claims(state: &AppState, headers: &HeaderMap, role: Role) -> Result<Claims, ApiError> {
    let token = request_token(headers)
        .ok_or_else(|| ApiError::Unauthorized("No token provided".to_string()))?;
    let claims = state.auth.verify_access_token(&token)?;
    if claims.role != role {
        return Err(ApiError::Forbidden("Insufficient role".to_string()));
    }
    Ok(claims)
}

/// Bearer header first, then the `access_token` cookie.
pub fn request_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.to_string())
        .or_else(|| {
            headers
                .get(header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        cookie
                            .trim()
                            .strip_prefix("access_token=")
                            .filter(|s| !s.is_empty())
                            .map(|s| s.to_string())
                    })
                })
        })
}

/// Authorizes a read of `order_id` by the render flow. A `?token=` query
/// value wins over header and cookie. Render tokens must be scoped to the
/// order; admin access tokens are accepted for any order.
pub fn authorize_render(
    state: &AppState,
    headers: &HeaderMap,
    query_token: Option<&str>,
    order_id: ObjectId,
) -> Result<Claims, ApiError> {
    let token = query_token
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .or_else(|| request_token(headers))
        .ok_or_else(|| ApiError::Unauthorized("No token provided".to_string()))?;

    if let Ok(claims) = state.auth.verify_render_token(&token, order_id) {
        return Ok(claims);
    }
    let claims = state.auth.verify_access_token(&token)?;
    if claims.role != Role::Admin {
        return Err(ApiError::Forbidden("Insufficient role".to_string()));
    }
    Ok(claims)
}

/// Helper trait for extracting AppState from composite state types
pub trait FromRef<T> {
    fn from_ref(input: &T) -> Self;
}

impl FromRef<AppState> for AppState {
    fn from_ref(input: &AppState) -> Self {
        input.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(header::COOKIE, HeaderValue::from_static("access_token=xyz"));
        assert_eq!(request_token(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; access_token=xyz; lang=en"),
        );
        assert_eq!(request_token(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn cleared_cookie_is_no_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("access_token="));
        assert_eq!(request_token(&headers), None);
    }
}
