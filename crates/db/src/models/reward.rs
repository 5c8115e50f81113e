use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Referral reward owed to an ambassador for one order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reward {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub ambassador_id: ObjectId,
    pub order_id: ObjectId,
    pub order_number: String,
    pub amount_paise: u64,
    #[serde(default)]
    pub status: RewardStatus,
    pub paid_at: Option<DateTime>,
    pub paid_by: Option<ObjectId>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RewardStatus {
    #[default]
    Pending,
    Paid,
    Cancelled,
}

impl Reward {
    pub const COLLECTION: &'static str = "rewards";
}
