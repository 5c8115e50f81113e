pub mod ambassador;
pub mod auth;
pub mod dashboard;
pub mod order;
pub mod render;
pub mod reward;
pub mod task;
pub mod waitlist;

use axum::http::{HeaderMap, HeaderValue, header};
use bson::oid::ObjectId;

use crate::error::ApiError;

pub(crate) fn parse_id(value: &str, what: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(value).map_err(|_| ApiError::BadRequest(format!("Invalid {what}")))
}

/// `Set-Cookie` for the access token; a zero `max_age` clears it.
pub(crate) fn access_cookie(token: &str, max_age: u64) -> Result<HeaderMap, ApiError> {
    let cookie = format!(
        "access_token={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        token, max_age
    );
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie).map_err(|e| ApiError::Internal(e.to_string()))?,
    );
    Ok(headers)
}

pub(crate) fn rfc3339(value: bson::DateTime) -> String {
    value.try_to_rfc3339_string().unwrap_or_default()
}
