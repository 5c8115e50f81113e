use std::future::Future;
use std::sync::Arc;

use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use groupframe_db::models::{BackgroundTask, TaskCategory, TaskStatus};
use tracing::{error, info};

use crate::dao::base::{DaoResult, PaginatedResult, PaginationParams};

use super::task_store::TaskStore;

/// Outputs are kept for a day.
const TASK_TTL_MS: i64 = 24 * 60 * 60 * 1000;

pub struct TaskService {
    store: Arc<TaskStore>,
}

impl TaskService {
    pub fn new(db: &Database) -> Self {
        Self {
            store: Arc::new(TaskStore::new(db)),
        }
    }

    pub fn store(&self) -> &Arc<TaskStore> {
        &self.store
    }

    pub async fn create_task(
        &self,
        user_id: ObjectId,
        order_id: Option<ObjectId>,
        task_type: &str,
        category: TaskCategory,
        params: serde_json::Value,
    ) -> DaoResult<BackgroundTask> {
        let now = DateTime::now();
        let task = BackgroundTask {
            id: None,
            user_id,
            order_id,
            task_type: task_type.to_string(),
            category,
            status: TaskStatus::Pending,
            params,
            logs: Vec::new(),
            progress: 0,
            file_path: None,
            file_name: None,
            error: None,
            started_at: None,
            completed_at: None,
            expires_at: DateTime::from_millis(now.timestamp_millis() + TASK_TTL_MS),
            created_at: now,
            updated_at: now,
        };

        let id = self.store.insert(&task).await?;
        self.store.get(id).await
    }

    pub async fn get_task(&self, task_id: ObjectId) -> DaoResult<BackgroundTask> {
        self.store.get(task_id).await
    }

    pub async fn list_user_tasks(
        &self,
        user_id: ObjectId,
        params: &PaginationParams,
    ) -> DaoResult<PaginatedResult<BackgroundTask>> {
        self.store
            .db_dao
            .find_paginated(
                doc! { "user_id": user_id },
                Some(doc! { "created_at": -1 }),
                params,
            )
            .await
    }

    /// Runs `job` detached. The job reports completion itself through the
    /// store; an `Err` marks the task failed.
    pub fn spawn_task<F>(&self, task_id: ObjectId, job: F)
    where
        F: Future<Output = Result<(), String>> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            if let Err(e) = store.start(task_id).await {
                error!(?task_id, error = %e, "Could not mark task as started");
            }

            match job.await {
                Ok(()) => info!(?task_id, "Background task completed"),
                Err(message) => {
                    error!(?task_id, error = %message, "Background task failed");
                    if let Err(e) = store.fail(task_id, message).await {
                        error!(?task_id, error = %e, "Could not record task failure");
                    }
                }
            }
        });
    }
}
