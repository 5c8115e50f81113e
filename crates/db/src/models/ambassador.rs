use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ambassador {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub waitlist_id: ObjectId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub college: String,
    pub referral_code: String,
    #[serde(default = "bool_true")]
    pub is_active: bool,
    #[serde(default)]
    pub total_referrals: u32,
    #[serde(default)]
    pub total_earned_paise: u64,
    pub last_login_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

fn bool_true() -> bool {
    true
}

impl Ambassador {
    pub const COLLECTION: &'static str = "ambassadors";
}
