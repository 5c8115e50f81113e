use axum::{
    Json,
    extract::{Path, Query, State},
};
use groupframe_db::models::{Reward, RewardStatus};
use groupframe_services::dao::base::{PaginatedResult, PaginationParams};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, extractors::auth::AdminUser, state::AppState};

use super::{parse_id, rfc3339};

#[derive(Debug, Deserialize)]
pub struct RewardFilter {
    pub status: Option<RewardStatus>,
    pub ambassador_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RewardResponse {
    pub id: String,
    pub ambassador_id: String,
    pub order_id: String,
    pub order_number: String,
    pub amount_paise: u64,
    pub status: RewardStatus,
    pub paid_at: Option<String>,
    pub created_at: String,
}

impl From<Reward> for RewardResponse {
    fn from(reward: Reward) -> Self {
        Self {
            id: reward.id.map(|id| id.to_hex()).unwrap_or_default(),
            ambassador_id: reward.ambassador_id.to_hex(),
            order_id: reward.order_id.to_hex(),
            order_number: reward.order_number,
            amount_paise: reward.amount_paise,
            status: reward.status,
            paid_at: reward.paid_at.map(rfc3339),
            created_at: rfc3339(reward.created_at),
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    _auth: AdminUser,
    Query(filter): Query<RewardFilter>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedResult<RewardResponse>>, ApiError> {
    let ambassador_id = filter
        .ambassador_id
        .as_deref()
        .map(|id| parse_id(id, "ambassador id"))
        .transpose()?;
    let result = state
        .rewards
        .list(filter.status, ambassador_id, &params)
        .await?;
    Ok(Json(result.map(RewardResponse::from)))
}

pub async fn pay(
    State(state): State<AppState>,
    auth: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<RewardResponse>, ApiError> {
    let id = parse_id(&id, "reward id")?;
    let reward = state.order_service.pay_reward(id, auth.user_id).await?;
    Ok(Json(reward.into()))
}
