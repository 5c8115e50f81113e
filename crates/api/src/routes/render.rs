use axum::{
    Json,
    extract::{Path, Query, State},
    http::HeaderMap,
};
use groupframe_render::RenderOrder;
use groupframe_services::render::to_render_order;
use serde::Deserialize;

use crate::{error::ApiError, extractors::auth::authorize_render, state::AppState};

use super::parse_id;

#[derive(Debug, Deserialize)]
pub struct RenderQuery {
    pub token: Option<String>,
}

/// Order payload for the render flow. Takes a render token scoped to this
/// order or an admin session.
pub async fn order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<RenderQuery>,
) -> Result<Json<RenderOrder>, ApiError> {
    let id = parse_id(&id, "order id")?;
    let claims = authorize_render(&state, &headers, query.token.as_deref(), id)?;
    let order = state.orders.find_by_id(id).await?;
    tracing::debug!(order_id = %id, token_type = ?claims.token_type, "Render order served");
    Ok(Json(to_render_order(&order)))
}
