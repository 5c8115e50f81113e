use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use groupframe_db::models::{Ambassador, AmbassadorWaitlist, WaitlistStatus};
use groupframe_services::dao::base::{PaginatedResult, PaginationParams};
use groupframe_services::dao::waitlist::NewWaitlistEntry;
use groupframe_services::otp::normalize_phone;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{error::ApiError, extractors::auth::AdminUser, state::AppState};

use super::{parse_id, rfc3339};

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "valid_phone"))]
    pub phone: String,
    #[validate(length(min = 1, max = 200))]
    pub college: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 100))]
    pub state: String,
    #[validate(range(min = 2000, max = 2100))]
    pub graduation_year: u16,
}

fn valid_phone(phone: &str) -> Result<(), ValidationError> {
    match normalize_phone(phone) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("phone")),
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    pub status: Option<WaitlistStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewRequest {
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WaitlistResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub college: String,
    pub city: String,
    pub state: String,
    pub graduation_year: u16,
    pub status: WaitlistStatus,
    pub reviewed_at: Option<String>,
    pub review_note: Option<String>,
    pub ambassador_id: Option<String>,
    pub created_at: String,
}

impl From<AmbassadorWaitlist> for WaitlistResponse {
    fn from(entry: AmbassadorWaitlist) -> Self {
        let (reviewed_at, review_note) = match entry.review {
            Some(review) => (Some(rfc3339(review.reviewed_at)), review.note),
            None => (None, None),
        };
        Self {
            id: entry.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: entry.name,
            email: entry.email,
            phone: entry.phone,
            college: entry.college,
            city: entry.city,
            state: entry.state,
            graduation_year: entry.graduation_year,
            status: entry.status,
            reviewed_at,
            review_note,
            ambassador_id: entry.ambassador_id.map(|id| id.to_hex()),
            created_at: rfc3339(entry.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApprovalResponse {
    pub application: WaitlistResponse,
    pub ambassador_id: String,
    pub referral_code: String,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<(StatusCode, Json<WaitlistResponse>), ApiError> {
    body.validate()?;
    let phone = normalize_phone(&body.phone)
        .ok_or_else(|| ApiError::Validation("Invalid phone number".to_string()))?;

    let entry = state
        .waitlist
        .create(NewWaitlistEntry {
            name: body.name.trim().to_string(),
            email: body.email.trim().to_string(),
            phone,
            college: body.college.trim().to_string(),
            city: body.city.trim().to_string(),
            state: body.state.trim().to_string(),
            graduation_year: body.graduation_year,
        })
        .await?;

    tracing::info!(college = %entry.college, "Ambassador application received");
    Ok((StatusCode::CREATED, Json(entry.into())))
}

pub async fn list(
    State(state): State<AppState>,
    _auth: AdminUser,
    Query(filter): Query<StatusFilter>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedResult<WaitlistResponse>>, ApiError> {
    let result = state.waitlist.list(filter.status, &params).await?;
    Ok(Json(result.map(WaitlistResponse::from)))
}

pub async fn approve(
    State(state): State<AppState>,
    auth: AdminUser,
    Path(id): Path<String>,
    body: Option<Json<ReviewRequest>>,
) -> Result<Json<ApprovalResponse>, ApiError> {
    let id = parse_id(&id, "waitlist id")?;
    let note = body.and_then(|Json(b)| b.note);

    let (entry, ambassador): (AmbassadorWaitlist, Ambassador) = state
        .ambassador_service
        .approve(id, auth.user_id, note)
        .await?;

    Ok(Json(ApprovalResponse {
        application: entry.into(),
        ambassador_id: ambassador.id.map(|id| id.to_hex()).unwrap_or_default(),
        referral_code: ambassador.referral_code,
    }))
}

pub async fn reject(
    State(state): State<AppState>,
    auth: AdminUser,
    Path(id): Path<String>,
    body: Option<Json<ReviewRequest>>,
) -> Result<Json<WaitlistResponse>, ApiError> {
    let id = parse_id(&id, "waitlist id")?;
    let note = body.and_then(|Json(b)| b.note);

    let entry = state
        .ambassador_service
        .reject(id, auth.user_id, note)
        .await?;
    Ok(Json(entry.into()))
}
