use bson::{doc, oid::ObjectId, DateTime};
use mongodb::options::ReturnDocument;
use mongodb::Database;
use groupframe_db::models::{AmbassadorWaitlist, ReviewInfo, WaitlistStatus};

use super::base::{
    enum_to_bson, map_write_error, BaseDao, DaoError, DaoResult, PaginatedResult,
    PaginationParams,
};

pub struct NewWaitlistEntry {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub college: String,
    pub city: String,
    pub state: String,
    pub graduation_year: u16,
}

pub struct WaitlistDao {
    pub base: BaseDao<AmbassadorWaitlist>,
}

impl WaitlistDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, AmbassadorWaitlist::COLLECTION),
        }
    }

    pub async fn create(&self, entry: NewWaitlistEntry) -> DaoResult<AmbassadorWaitlist> {
        let now = DateTime::now();
        let row = AmbassadorWaitlist {
            id: None,
            name: entry.name,
            email: entry.email.to_lowercase(),
            phone: entry.phone,
            college: entry.college,
            city: entry.city,
            state: entry.state,
            graduation_year: entry.graduation_year,
            status: WaitlistStatus::Pending,
            review: None,
            ambassador_id: None,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&row).await.map_err(|e| match e {
            DaoError::DuplicateKey(_) => DaoError::DuplicateKey(
                "An application with this email or phone already exists".to_string(),
            ),
            other => other,
        })?;
        self.base.find_by_id(id).await
    }

    pub async fn list(
        &self,
        status: Option<WaitlistStatus>,
        params: &PaginationParams,
    ) -> DaoResult<PaginatedResult<AmbassadorWaitlist>> {
        let mut filter = doc! {};
        if let Some(status) = status {
            filter.insert("status", enum_to_bson(&status)?);
        }
        self.base
            .find_paginated(filter, Some(doc! { "created_at": -1 }), params)
            .await
    }

    /// Moves a pending entry to `status`. Reviewed entries are terminal, so
    /// a second review is a conflict rather than an overwrite.
    pub async fn review(
        &self,
        id: ObjectId,
        status: WaitlistStatus,
        reviewer: ObjectId,
        note: Option<String>,
    ) -> DaoResult<AmbassadorWaitlist> {
        if !status.is_terminal() {
            return Err(DaoError::Validation(
                "Review must approve or reject".to_string(),
            ));
        }

        let now = DateTime::now();
        let review = ReviewInfo {
            reviewed_by: reviewer,
            reviewed_at: now,
            note,
        };
        let updated = self
            .base
            .collection()
            .find_one_and_update(
                doc! { "_id": id, "status": enum_to_bson(&WaitlistStatus::Pending)? },
                doc! {
                    "$set": {
                        "status": enum_to_bson(&status)?,
                        "review": bson::to_bson(&review)?,
                        "updated_at": now,
                    }
                },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_write_error)?;

        match updated {
            Some(row) => Ok(row),
            None => {
                let existing = self.base.find_by_id(id).await?;
                Err(DaoError::Conflict(format!(
                    "Application already {}",
                    enum_to_bson(&existing.status)?
                        .as_str()
                        .unwrap_or("reviewed")
                )))
            }
        }
    }

    /// Puts an approved entry that never got its ambassador back to
    /// pending, so the approval can be retried.
    pub async fn reopen(&self, id: ObjectId) -> DaoResult<bool> {
        self.base
            .update_one(
                doc! {
                    "_id": id,
                    "status": enum_to_bson(&WaitlistStatus::Approved)?,
                    "ambassador_id": null,
                },
                doc! {
                    "$set": { "status": enum_to_bson(&WaitlistStatus::Pending)? },
                    "$unset": { "review": "" },
                },
            )
            .await
    }

    pub async fn link_ambassador(&self, id: ObjectId, ambassador_id: ObjectId) -> DaoResult<bool> {
        self.base
            .update_by_id(id, doc! { "$set": { "ambassador_id": ambassador_id } })
            .await
    }

    pub async fn count_by_status(&self, status: WaitlistStatus) -> DaoResult<u64> {
        self.base
            .count(doc! { "status": enum_to_bson(&status)? })
            .await
    }
}
