//! One-time login codes for ambassadors.

use std::sync::Arc;

use bson::DateTime;
use groupframe_config::SmsSettings;
use groupframe_db::models::OtpCode;
use mongodb::Database;
use rand::Rng;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info};

use crate::dao::base::DaoError;
use crate::dao::otp::OtpDao;
use crate::sms::{SmsError, SmsProvider};

pub const OTP_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum OtpError {
    #[error("No pending code for this phone")]
    NoPendingCode,
    #[error("Code expired")]
    Expired,
    #[error("Too many attempts")]
    TooManyAttempts,
    #[error("Invalid code")]
    Invalid,
    #[error(transparent)]
    Dao(#[from] DaoError),
    #[error(transparent)]
    Sms(#[from] SmsError),
}

/// Hash stored in place of the code. Salting with the phone keeps equal
/// codes for different phones from sharing a hash.
pub fn hash_code(phone: &str, code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(phone.as_bytes());
    hasher.update(b":");
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}

/// Strips spaces, dashes and brackets. Returns `None` unless what is left is
/// 10 to 15 digits, optionally prefixed with `+`.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    let valid = (10..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());
    valid.then_some(cleaned)
}

pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..OTP_LEN)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

#[derive(Debug, PartialEq, Eq)]
pub enum OtpCheck {
    Accepted,
    Expired,
    Exhausted,
    /// Wrong code; `last_attempt` means the code is now burned.
    Mismatch { last_attempt: bool },
}

pub fn check_code(otp: &OtpCode, code: &str, now: DateTime, max_attempts: u32) -> OtpCheck {
    if otp.expires_at <= now {
        return OtpCheck::Expired;
    }
    if otp.attempts >= max_attempts {
        return OtpCheck::Exhausted;
    }
    if hash_code(&otp.phone, code.trim()) == otp.code_hash {
        OtpCheck::Accepted
    } else {
        OtpCheck::Mismatch {
            last_attempt: otp.attempts + 1 >= max_attempts,
        }
    }
}

pub struct OtpService {
    dao: OtpDao,
    sms: Arc<dyn SmsProvider>,
    settings: SmsSettings,
}

impl OtpService {
    pub fn new(db: &Database, sms: Arc<dyn SmsProvider>, settings: SmsSettings) -> Self {
        Self {
            dao: OtpDao::new(db),
            sms,
            settings,
        }
    }

    /// Issues a fresh code and texts it. Returns the TTL in seconds.
    pub async fn request_code(&self, phone: &str) -> Result<u64, OtpError> {
        let code = generate_code();
        let ttl = self.settings.otp_ttl_secs;
        let expires_at =
            DateTime::from_millis(DateTime::now().timestamp_millis() + (ttl as i64) * 1000);
        self.dao
            .issue(phone, hash_code(phone, &code), expires_at)
            .await?;

        let message = format!(
            "{code} is your GroupFrame ambassador login code. It expires in {} minutes.",
            ttl.div_ceil(60)
        );
        self.sms.send(phone, &message).await?;
        info!(phone, "OTP issued");
        Ok(ttl)
    }

    pub async fn verify_code(&self, phone: &str, code: &str) -> Result<(), OtpError> {
        let otp = self
            .dao
            .latest_open(phone)
            .await?
            .ok_or(OtpError::NoPendingCode)?;
        let id = otp
            .id
            .ok_or_else(|| DaoError::Validation("OTP has no id".to_string()))?;

        match check_code(&otp, code, DateTime::now(), self.settings.otp_max_attempts) {
            OtpCheck::Accepted => {
                self.dao.consume(id).await?;
                debug!(phone, "OTP accepted");
                Ok(())
            }
            OtpCheck::Expired => {
                self.dao.consume(id).await?;
                Err(OtpError::Expired)
            }
            OtpCheck::Exhausted => {
                self.dao.consume(id).await?;
                Err(OtpError::TooManyAttempts)
            }
            OtpCheck::Mismatch { last_attempt } => {
                self.dao.record_attempt(id).await?;
                if last_attempt {
                    self.dao.consume(id).await?;
                }
                Err(OtpError::Invalid)
            }
        }
    }
}
