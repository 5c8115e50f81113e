use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use groupframe_db::models::{Ambassador, AmbassadorWaitlist};

use super::base::{BaseDao, DaoError, DaoResult};

pub struct AmbassadorDao {
    pub base: BaseDao<Ambassador>,
}

impl AmbassadorDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Ambassador::COLLECTION),
        }
    }

    /// Inserts the ambassador for an approved application. Fails with
    /// `DuplicateKey` when `referral_code` collides, so callers can retry
    /// with a fresh code.
    pub async fn create_from_waitlist(
        &self,
        entry: &AmbassadorWaitlist,
        referral_code: String,
    ) -> DaoResult<Ambassador> {
        let waitlist_id = entry
            .id
            .ok_or_else(|| DaoError::Validation("Waitlist entry has no id".to_string()))?;
        let now = DateTime::now();
        let ambassador = Ambassador {
            id: None,
            waitlist_id,
            name: entry.name.clone(),
            email: entry.email.clone(),
            phone: entry.phone.clone(),
            college: entry.college.clone(),
            referral_code,
            is_active: true,
            total_referrals: 0,
            total_earned_paise: 0,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&ambassador).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_phone(&self, phone: &str) -> DaoResult<Ambassador> {
        self.base
            .find_one(doc! { "phone": phone, "is_active": true })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn find_by_referral_code(&self, code: &str) -> DaoResult<Ambassador> {
        self.base
            .find_one(doc! { "referral_code": code.trim().to_uppercase(), "is_active": true })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn record_referral(&self, id: ObjectId) -> DaoResult<bool> {
        self.base
            .update_by_id(id, doc! { "$inc": { "total_referrals": 1 } })
            .await
    }

    pub async fn add_earnings(&self, id: ObjectId, amount_paise: u64) -> DaoResult<bool> {
        self.base
            .update_by_id(
                id,
                doc! { "$inc": { "total_earned_paise": amount_paise as i64 } },
            )
            .await
    }

    pub async fn touch_login(&self, id: ObjectId) -> DaoResult<bool> {
        self.base
            .update_by_id(id, doc! { "$set": { "last_login_at": DateTime::now() } })
            .await
    }

    pub async fn count_active(&self) -> DaoResult<u64> {
        self.base.count(doc! { "is_active": true }).await
    }
}
