use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// One issued login code. Only the SHA-256 of the code is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpCode {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub phone: String,
    pub code_hash: String,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub consumed: bool,
    pub expires_at: DateTime,
    pub created_at: DateTime,
}

impl OtpCode {
    pub const COLLECTION: &'static str = "otp_codes";
}
