use std::sync::Arc;

use bson::oid::ObjectId;
use groupframe_db::models::{Ambassador, AmbassadorWaitlist, WaitlistStatus};
use tracing::{error, info, warn};

use crate::dao::ambassador::AmbassadorDao;
use crate::dao::base::{DaoError, DaoResult};
use crate::dao::waitlist::WaitlistDao;
use crate::referral::generate_referral_code;

/// Attempts before giving up on finding an unused referral code.
const CODE_ATTEMPTS: usize = 5;

/// Waitlist review workflow.
pub struct AmbassadorService {
    waitlist: Arc<WaitlistDao>,
    ambassadors: Arc<AmbassadorDao>,
}

impl AmbassadorService {
    pub fn new(waitlist: Arc<WaitlistDao>, ambassadors: Arc<AmbassadorDao>) -> Self {
        Self {
            waitlist,
            ambassadors,
        }
    }

    /// Approves a pending application and creates its ambassador with a
    /// fresh referral code. If the ambassador cannot be created the entry
    /// goes back to pending.
    pub async fn approve(
        &self,
        waitlist_id: ObjectId,
        reviewer: ObjectId,
        note: Option<String>,
    ) -> DaoResult<(AmbassadorWaitlist, Ambassador)> {
        let mut entry = self
            .waitlist
            .review(waitlist_id, WaitlistStatus::Approved, reviewer, note)
            .await?;

        let ambassador = match self.create_with_unique_code(&entry).await {
            Ok(ambassador) => ambassador,
            Err(e) => {
                warn!(waitlist_id = %waitlist_id, error = %e, "Ambassador creation failed, reopening application");
                if let Err(reopen) = self.waitlist.reopen(waitlist_id).await {
                    error!(waitlist_id = %waitlist_id, error = %reopen, "Failed to reopen application");
                }
                return Err(e);
            }
        };
        if let Some(ambassador_id) = ambassador.id {
            self.waitlist.link_ambassador(waitlist_id, ambassador_id).await?;
            entry.ambassador_id = Some(ambassador_id);
        }

        info!(
            waitlist_id = %waitlist_id,
            referral_code = %ambassador.referral_code,
            "Ambassador approved"
        );
        Ok((entry, ambassador))
    }

    pub async fn reject(
        &self,
        waitlist_id: ObjectId,
        reviewer: ObjectId,
        note: Option<String>,
    ) -> DaoResult<AmbassadorWaitlist> {
        let entry = self
            .waitlist
            .review(waitlist_id, WaitlistStatus::Rejected, reviewer, note)
            .await?;
        info!(waitlist_id = %waitlist_id, "Ambassador application rejected");
        Ok(entry)
    }

    async fn create_with_unique_code(&self, entry: &AmbassadorWaitlist) -> DaoResult<Ambassador> {
        let mut last_error = None;
        for _ in 0..CODE_ATTEMPTS {
            match self
                .ambassadors
                .create_from_waitlist(entry, generate_referral_code())
                .await
            {
                Ok(ambassador) => return Ok(ambassador),
                // Email/phone collisions are not retried: they repeat.
                Err(DaoError::DuplicateKey(msg)) if msg.contains("referral_code") => {
                    warn!("Referral code collision, retrying");
                    last_error = Some(DaoError::DuplicateKey(msg));
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_error.unwrap_or_else(|| {
            DaoError::Conflict("Could not allocate a referral code".to_string())
        }))
    }
}
