use bson::{doc, oid::ObjectId, DateTime, Document};
use futures::TryStreamExt;
use mongodb::options::ReturnDocument;
use mongodb::Database;
use groupframe_db::models::{Reward, RewardStatus};

use super::base::{
    bson_as_u64, enum_to_bson, map_write_error, BaseDao, DaoError, DaoResult, PaginatedResult,
    PaginationParams,
};

pub struct RewardDao {
    pub base: BaseDao<Reward>,
}

impl RewardDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Reward::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        ambassador_id: ObjectId,
        order_id: ObjectId,
        order_number: String,
        amount_paise: u64,
    ) -> DaoResult<Reward> {
        let now = DateTime::now();
        let reward = Reward {
            id: None,
            ambassador_id,
            order_id,
            order_number,
            amount_paise,
            status: RewardStatus::Pending,
            paid_at: None,
            paid_by: None,
            created_at: now,
            updated_at: now,
        };
        let id = self.base.insert_one(&reward).await?;
        self.base.find_by_id(id).await
    }

    pub async fn list(
        &self,
        status: Option<RewardStatus>,
        ambassador_id: Option<ObjectId>,
        params: &PaginationParams,
    ) -> DaoResult<PaginatedResult<Reward>> {
        let mut filter = doc! {};
        if let Some(status) = status {
            filter.insert("status", enum_to_bson(&status)?);
        }
        if let Some(ambassador_id) = ambassador_id {
            filter.insert("ambassador_id", ambassador_id);
        }
        self.base
            .find_paginated(filter, Some(doc! { "created_at": -1 }), params)
            .await
    }

    /// Pending -> paid. Paying twice, or paying a cancelled reward, is a
    /// conflict.
    pub async fn mark_paid(&self, id: ObjectId, paid_by: ObjectId) -> DaoResult<Reward> {
        let now = DateTime::now();
        let updated = self
            .base
            .collection()
            .find_one_and_update(
                doc! { "_id": id, "status": enum_to_bson(&RewardStatus::Pending)? },
                doc! {
                    "$set": {
                        "status": enum_to_bson(&RewardStatus::Paid)?,
                        "paid_at": now,
                        "paid_by": paid_by,
                        "updated_at": now,
                    }
                },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_write_error)?;

        match updated {
            Some(reward) => Ok(reward),
            None => {
                let existing = self.base.find_by_id(id).await?;
                Err(DaoError::Conflict(format!(
                    "Reward is {}",
                    enum_to_bson(&existing.status)?.as_str().unwrap_or("not pending")
                )))
            }
        }
    }

    /// Cancels the still-pending rewards of an order; paid ones are kept.
    pub async fn cancel_for_order(&self, order_id: ObjectId) -> DaoResult<u64> {
        let result = self
            .base
            .collection()
            .update_many(
                doc! { "order_id": order_id, "status": enum_to_bson(&RewardStatus::Pending)? },
                doc! {
                    "$set": {
                        "status": enum_to_bson(&RewardStatus::Cancelled)?,
                        "updated_at": DateTime::now(),
                    }
                },
            )
            .await?;
        Ok(result.modified_count)
    }

    /// `(count, amount_paise)` per status, optionally for one ambassador.
    pub async fn totals_by_status(
        &self,
        ambassador_id: Option<ObjectId>,
    ) -> DaoResult<Vec<(RewardStatus, u64, u64)>> {
        let mut pipeline = Vec::with_capacity(2);
        if let Some(ambassador_id) = ambassador_id {
            pipeline.push(doc! { "$match": { "ambassador_id": ambassador_id } });
        }
        pipeline.push(doc! {
            "$group": {
                "_id": "$status",
                "count": { "$sum": 1 },
                "amount": { "$sum": "$amount_paise" },
            }
        });
        let rows: Vec<Document> = self
            .base
            .collection()
            .aggregate(pipeline)
            .await?
            .try_collect()
            .await?;

        let mut totals = Vec::with_capacity(rows.len());
        for row in rows {
            let Some(status) = row.get("_id").cloned() else {
                continue;
            };
            let status: RewardStatus = bson::from_bson(status)?;
            let count = row.get("count").and_then(bson_as_u64).unwrap_or(0);
            let amount = row.get("amount").and_then(bson_as_u64).unwrap_or(0);
            totals.push((status, count, amount));
        }
        Ok(totals)
    }
}
