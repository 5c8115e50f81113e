use axum::{Json, extract::State};
use groupframe_services::dashboard::DashboardStats;

use crate::{error::ApiError, extractors::auth::AdminUser, state::AppState};

pub async fn stats(
    State(state): State<AppState>,
    _auth: AdminUser,
) -> Result<Json<DashboardStats>, ApiError> {
    Ok(Json(state.dashboard.stats().await?))
}
