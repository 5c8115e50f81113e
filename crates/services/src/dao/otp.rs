use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use groupframe_db::models::OtpCode;

use super::base::{BaseDao, DaoResult};

pub struct OtpDao {
    pub base: BaseDao<OtpCode>,
}

impl OtpDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, OtpCode::COLLECTION),
        }
    }

    /// Stores a new code and retires any earlier unused code for the phone,
    /// so only the most recent SMS can be redeemed.
    pub async fn issue(&self, phone: &str, code_hash: String, expires_at: DateTime) -> DaoResult<OtpCode> {
        self.base
            .collection()
            .update_many(
                doc! { "phone": phone, "consumed": false },
                doc! { "$set": { "consumed": true } },
            )
            .await?;

        let otp = OtpCode {
            id: None,
            phone: phone.to_string(),
            code_hash,
            attempts: 0,
            consumed: false,
            expires_at,
            created_at: DateTime::now(),
        };
        let id = self.base.insert_one(&otp).await?;
        self.base.find_by_id(id).await
    }

    /// Newest unconsumed code for `phone`, expired or not.
    pub async fn latest_open(&self, phone: &str) -> DaoResult<Option<OtpCode>> {
        Ok(self
            .base
            .collection()
            .find_one(doc! { "phone": phone, "consumed": false })
            .sort(doc! { "created_at": -1 })
            .await?)
    }

    pub async fn record_attempt(&self, id: ObjectId) -> DaoResult<()> {
        self.base
            .collection()
            .update_one(doc! { "_id": id }, doc! { "$inc": { "attempts": 1 } })
            .await?;
        Ok(())
    }

    pub async fn consume(&self, id: ObjectId) -> DaoResult<()> {
        self.base
            .collection()
            .update_one(doc! { "_id": id }, doc! { "$set": { "consumed": true } })
            .await?;
        Ok(())
    }
}
