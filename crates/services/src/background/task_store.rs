use bson::{doc, oid::ObjectId, DateTime};
use dashmap::DashMap;
use mongodb::Database;
use groupframe_db::models::{BackgroundTask, TaskStatus};

use crate::dao::base::{enum_to_bson, BaseDao, DaoResult};

/// Task rows live in MongoDB; running tasks are mirrored in memory so
/// status polling does not hit the database.
pub struct TaskStore {
    pub db_dao: BaseDao<BackgroundTask>,
    pub cache: DashMap<ObjectId, BackgroundTask>,
}

impl TaskStore {
    pub fn new(db: &Database) -> Self {
        Self {
            db_dao: BaseDao::new(db, BackgroundTask::COLLECTION),
            cache: DashMap::new(),
        }
    }

    pub async fn insert(&self, task: &BackgroundTask) -> DaoResult<ObjectId> {
        let id = self.db_dao.insert_one(task).await?;
        let mut cached = task.clone();
        cached.id = Some(id);
        self.cache.insert(id, cached);
        Ok(id)
    }

    pub async fn get(&self, id: ObjectId) -> DaoResult<BackgroundTask> {
        if let Some(task) = self.cache.get(&id) {
            return Ok(task.clone());
        }
        let task = self.db_dao.find_by_id(id).await?;
        if !is_finished(&task.status) {
            self.cache.insert(id, task.clone());
        }
        Ok(task)
    }

    pub async fn start(&self, id: ObjectId) -> DaoResult<()> {
        let now = DateTime::now();
        self.db_dao
            .update_by_id(
                id,
                doc! {
                    "$set": { "status": enum_to_bson(&TaskStatus::Processing)?, "started_at": now },
                    "$push": { "logs": "Task started" },
                },
            )
            .await?;

        if let Some(mut task) = self.cache.get_mut(&id) {
            task.status = TaskStatus::Processing;
            task.started_at = Some(now);
            task.logs.push("Task started".to_string());
            task.updated_at = now;
        }
        Ok(())
    }

    pub async fn update_progress(
        &self,
        id: ObjectId,
        progress: u8,
        log_entry: Option<String>,
    ) -> DaoResult<()> {
        let mut update = doc! { "$set": { "progress": progress as i32 } };
        if let Some(log) = &log_entry {
            update.insert("$push", doc! { "logs": log });
        }
        self.db_dao.update_by_id(id, update).await?;

        if let Some(mut task) = self.cache.get_mut(&id) {
            task.progress = progress;
            task.logs.extend(log_entry);
            task.updated_at = DateTime::now();
        }
        Ok(())
    }

    pub async fn complete(
        &self,
        id: ObjectId,
        file_path: Option<String>,
        file_name: Option<String>,
    ) -> DaoResult<()> {
        let now = DateTime::now();
        self.db_dao
            .update_by_id(
                id,
                doc! {
                    "$set": {
                        "status": enum_to_bson(&TaskStatus::Completed)?,
                        "progress": 100,
                        "file_path": file_path.as_deref(),
                        "file_name": file_name.as_deref(),
                        "completed_at": now,
                    }
                },
            )
            .await?;
        // Finished tasks are served from MongoDB from here on.
        self.cache.remove(&id);
        Ok(())
    }

    pub async fn fail(&self, id: ObjectId, error: String) -> DaoResult<()> {
        let now = DateTime::now();
        self.db_dao
            .update_by_id(
                id,
                doc! {
                    "$set": {
                        "status": enum_to_bson(&TaskStatus::Failed)?,
                        "error": &error,
                        "completed_at": now,
                    },
                    "$push": { "logs": format!("Failed: {error}") },
                },
            )
            .await?;
        self.cache.remove(&id);
        Ok(())
    }
}

fn is_finished(status: &TaskStatus) -> bool {
    matches!(status, TaskStatus::Completed | TaskStatus::Failed)
}
