use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
};
use groupframe_db::models::RewardStatus;
use groupframe_services::auth::Role;
use groupframe_services::dao::base::{DaoError, PaginatedResult, PaginationParams};
use groupframe_services::dashboard::RewardStats;
use groupframe_services::otp::normalize_phone;
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, extractors::auth::AmbassadorUser, state::AppState};

use super::{access_cookie, reward::RewardResponse, rfc3339};

#[derive(Debug, Deserialize)]
pub struct OtpRequest {
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct OtpVerifyRequest {
    pub phone: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct OtpSentResponse {
    pub sent: bool,
    pub expires_in: u64,
}

#[derive(Debug, Serialize)]
pub struct AmbassadorResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub college: String,
    pub referral_code: String,
    pub total_referrals: u32,
    pub total_earned_paise: u64,
    pub last_login_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AmbassadorAuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub ambassador: AmbassadorResponse,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub ambassador: AmbassadorResponse,
    pub rewards: RewardStats,
}

#[derive(Debug, Deserialize)]
pub struct RewardFilter {
    pub status: Option<RewardStatus>,
}

fn phone_or_reject(raw: &str) -> Result<String, ApiError> {
    normalize_phone(raw).ok_or_else(|| ApiError::Validation("Invalid phone number".to_string()))
}

pub async fn request_otp(
    State(state): State<AppState>,
    Json(body): Json<OtpRequest>,
) -> Result<Json<OtpSentResponse>, ApiError> {
    let phone = phone_or_reject(&body.phone)?;
    match state.ambassadors.find_by_phone(&phone).await {
        Ok(_) => {}
        Err(DaoError::NotFound) => {
            return Err(ApiError::NotFound(
                "No active ambassador with this phone".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    }

    let expires_in = state.otp.request_code(&phone).await?;
    Ok(Json(OtpSentResponse {
        sent: true,
        expires_in,
    }))
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<OtpVerifyRequest>,
) -> Result<(HeaderMap, Json<AmbassadorAuthResponse>), ApiError> {
    let phone = phone_or_reject(&body.phone)?;
    state.otp.verify_code(&phone, &body.code).await?;

    let ambassador = state
        .ambassadors
        .find_by_phone(&phone)
        .await
        .map_err(|_| ApiError::Unauthorized("Ambassador is no longer active".to_string()))?;
    let ambassador_id = ambassador
        .id
        .ok_or_else(|| ApiError::Internal("Ambassador has no id".to_string()))?;
    state.ambassadors.touch_login(ambassador_id).await?;

    let tokens = state.auth.generate_tokens(ambassador_id, Role::Ambassador)?;
    let headers = access_cookie(&tokens.access_token, tokens.expires_in)?;
    tracing::info!(ambassador_id = %ambassador_id, "Ambassador logged in");

    Ok((
        headers,
        Json(AmbassadorAuthResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            ambassador: AmbassadorResponse::from(ambassador),
        }),
    ))
}

pub async fn me(
    State(state): State<AppState>,
    auth: AmbassadorUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let (ambassador, rewards) = futures::try_join!(
        state.ambassadors.base.find_by_id(auth.ambassador_id),
        state.dashboard.ambassador_rewards(auth.ambassador_id),
    )?;
    if !ambassador.is_active {
        return Err(ApiError::Forbidden("Ambassador is not active".to_string()));
    }
    Ok(Json(ProfileResponse {
        ambassador: ambassador.into(),
        rewards,
    }))
}

pub async fn rewards(
    State(state): State<AppState>,
    auth: AmbassadorUser,
    Query(filter): Query<RewardFilter>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedResult<RewardResponse>>, ApiError> {
    let result = state
        .rewards
        .list(filter.status, Some(auth.ambassador_id), &params)
        .await?;
    Ok(Json(result.map(RewardResponse::from)))
}

impl From<groupframe_db::models::Ambassador> for AmbassadorResponse {
    fn from(a: groupframe_db::models::Ambassador) -> Self {
        Self {
            id: a.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: a.name,
            email: a.email,
            phone: a.phone,
            college: a.college,
            referral_code: a.referral_code,
            total_referrals: a.total_referrals,
            total_earned_paise: a.total_earned_paise,
            last_login_at: a.last_login_at.map(rfc3339),
        }
    }
}
