use axum::{
    Json,
    body::Body,
    extract::{Path, Query, State},
    http::header,
    response::Response,
};
use groupframe_db::models::{BackgroundTask, TaskCategory, TaskStatus};
use groupframe_services::dao::base::{PaginatedResult, PaginationParams};
use serde::Serialize;

use crate::{error::ApiError, extractors::auth::AdminUser, state::AppState};

use super::{parse_id, rfc3339};

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: String,
    pub order_id: Option<String>,
    pub task_type: String,
    pub category: TaskCategory,
    pub status: TaskStatus,
    pub progress: u8,
    pub logs: Vec<String>,
    pub file_name: Option<String>,
    pub error: Option<String>,
    pub created_at: String,
    pub completed_at: Option<String>,
}

impl From<BackgroundTask> for TaskResponse {
    fn from(t: BackgroundTask) -> Self {
        Self {
            id: t.id.map(|id| id.to_hex()).unwrap_or_default(),
            order_id: t.order_id.map(|id| id.to_hex()),
            task_type: t.task_type,
            category: t.category,
            status: t.status,
            progress: t.progress,
            logs: t.logs,
            file_name: t.file_name,
            error: t.error,
            created_at: rfc3339(t.created_at),
            completed_at: t.completed_at.map(rfc3339),
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    auth: AdminUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedResult<TaskResponse>>, ApiError> {
    let result = state.tasks.list_user_tasks(auth.user_id, &params).await?;
    Ok(Json(result.map(TaskResponse::from)))
}

pub async fn get(
    State(state): State<AppState>,
    _auth: AdminUser,
    Path(task_id): Path<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task_id = parse_id(&task_id, "task id")?;
    let task = state.tasks.get_task(task_id).await?;
    Ok(Json(task.into()))
}

pub async fn download(
    State(state): State<AppState>,
    _auth: AdminUser,
    Path(task_id): Path<String>,
) -> Result<Response, ApiError> {
    let task_id = parse_id(&task_id, "task id")?;
    let task = state.tasks.get_task(task_id).await?;

    if task.status != TaskStatus::Completed {
        return Err(ApiError::Conflict("Task has not completed".to_string()));
    }
    let file_path = task
        .file_path
        .ok_or_else(|| ApiError::NotFound("Task has no file".to_string()))?;
    let file_name = task.file_name.unwrap_or_else(|| "download".to_string());

    let contents = tokio::fs::read(&file_path)
        .await
        .map_err(|_| ApiError::NotFound("File not found on disk".to_string()))?;

    let content_type = if file_name.ends_with(".png") {
        "image/png"
    } else if file_name.ends_with(".pdf") {
        "application/pdf"
    } else {
        "application/octet-stream"
    };

    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        )
        .body(Body::from(contents))
        .map_err(|e| ApiError::Internal(e.to_string()))
}
