use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// An ambassador application. `Pending` until an admin reviews it; both
/// `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmbassadorWaitlist {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub college: String,
    pub city: String,
    pub state: String,
    pub graduation_year: u16,
    #[serde(default)]
    pub status: WaitlistStatus,
    pub review: Option<ReviewInfo>,
    pub ambassador_id: Option<ObjectId>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WaitlistStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl WaitlistStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, WaitlistStatus::Pending)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewInfo {
    pub reviewed_by: ObjectId,
    pub reviewed_at: DateTime,
    pub note: Option<String>,
}

impl AmbassadorWaitlist {
    pub const COLLECTION: &'static str = "ambassador_waitlist";
}
