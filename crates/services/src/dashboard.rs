use std::sync::Arc;

use bson::oid::ObjectId;
use groupframe_db::models::{OrderStatus, RewardStatus, WaitlistStatus};
use serde::Serialize;

use crate::dao::ambassador::AmbassadorDao;
use crate::dao::base::DaoResult;
use crate::dao::order::OrderDao;
use crate::dao::reward::RewardDao;
use crate::dao::waitlist::WaitlistDao;

#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderStats {
    pub total: u64,
    pub new: u64,
    pub in_progress: u64,
    pub ready: u64,
    pub shipped: u64,
    pub paid_revenue_paise: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WaitlistStats {
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RewardStats {
    pub pending_count: u64,
    pub pending_paise: u64,
    pub paid_count: u64,
    pub paid_paise: u64,
    pub cancelled_count: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardStats {
    pub orders: OrderStats,
    pub waitlist: WaitlistStats,
    pub active_ambassadors: u64,
    pub rewards: RewardStats,
}

pub struct DashboardService {
    orders: Arc<OrderDao>,
    waitlist: Arc<WaitlistDao>,
    ambassadors: Arc<AmbassadorDao>,
    rewards: Arc<RewardDao>,
}

impl DashboardService {
    pub fn new(
        orders: Arc<OrderDao>,
        waitlist: Arc<WaitlistDao>,
        ambassadors: Arc<AmbassadorDao>,
        rewards: Arc<RewardDao>,
    ) -> Self {
        Self {
            orders,
            waitlist,
            ambassadors,
            rewards,
        }
    }

    pub async fn stats(&self) -> DaoResult<DashboardStats> {
        let (new, in_progress, ready, shipped) = futures::try_join!(
            self.orders.count_by_status(OrderStatus::New),
            self.orders.count_by_status(OrderStatus::InProgress),
            self.orders.count_by_status(OrderStatus::Ready),
            self.orders.count_by_status(OrderStatus::Shipped),
        )?;
        let (pending, approved, rejected) = futures::try_join!(
            self.waitlist.count_by_status(WaitlistStatus::Pending),
            self.waitlist.count_by_status(WaitlistStatus::Approved),
            self.waitlist.count_by_status(WaitlistStatus::Rejected),
        )?;

        Ok(DashboardStats {
            orders: OrderStats {
                total: new + in_progress + ready + shipped,
                new,
                in_progress,
                ready,
                shipped,
                paid_revenue_paise: self.orders.paid_revenue_paise().await?,
            },
            waitlist: WaitlistStats {
                pending,
                approved,
                rejected,
            },
            active_ambassadors: self.ambassadors.count_active().await?,
            rewards: fold_reward_totals(self.rewards.totals_by_status(None).await?),
        })
    }

    /// Reward totals for a single ambassador.
    pub async fn ambassador_rewards(&self, ambassador_id: ObjectId) -> DaoResult<RewardStats> {
        Ok(fold_reward_totals(
            self.rewards.totals_by_status(Some(ambassador_id)).await?,
        ))
    }
}

fn fold_reward_totals(rows: Vec<(RewardStatus, u64, u64)>) -> RewardStats {
    let mut stats = RewardStats::default();
    for (status, count, amount) in rows {
        match status {
            RewardStatus::Pending => {
                stats.pending_count += count;
                stats.pending_paise += amount;
            }
            RewardStatus::Paid => {
                stats.paid_count += count;
                stats.paid_paise += amount;
            }
            RewardStatus::Cancelled => stats.cancelled_count += count,
        }
    }
    stats
}
