use std::collections::HashSet;
use std::sync::Arc;

use bson::oid::ObjectId;
use chrono::Utc;
use groupframe_config::{PricingSettings, ReferralSettings};
use groupframe_db::models::{
    CustomerInfo, GridTemplateName, Order, OrderMember, OrderSettings, Reward, ShippingAddress,
};
use rand::Rng;
use tracing::{info, warn};

use crate::dao::ambassador::AmbassadorDao;
use crate::dao::base::{DaoError, DaoResult};
use crate::dao::order::{NewOrder, OrderDao};
use crate::dao::reward::RewardDao;
use crate::pricing::price_order;
use crate::referral::{is_valid_referral_code, reward_amount};

pub const MAX_MEMBERS: usize = 200;
const ORDER_NUMBER_ATTEMPTS: usize = 5;

pub struct NewMember {
    /// Generated when blank.
    pub id: Option<String>,
    pub name: String,
    pub roll_number: Option<String>,
    pub photo: Option<String>,
    pub vote: Option<String>,
}

pub struct PlaceOrder {
    pub group_name: String,
    pub customer: CustomerInfo,
    pub members: Vec<NewMember>,
    pub grid_template: GridTemplateName,
    pub shipping_address: ShippingAddress,
    pub gap: Option<u32>,
    pub referral_code: Option<String>,
}

/// Storefront order placement and the admin lifecycle around it.
pub struct OrderService {
    orders: Arc<OrderDao>,
    ambassadors: Arc<AmbassadorDao>,
    rewards: Arc<RewardDao>,
    pricing: PricingSettings,
    referral: ReferralSettings,
}

impl OrderService {
    pub fn new(
        orders: Arc<OrderDao>,
        ambassadors: Arc<AmbassadorDao>,
        rewards: Arc<RewardDao>,
        pricing: PricingSettings,
        referral: ReferralSettings,
    ) -> Self {
        Self {
            orders,
            ambassadors,
            rewards,
            pricing,
            referral,
        }
    }

    /// Prices the order, resolves the referral code and stores it. A valid
    /// code also books a pending reward for its ambassador.
    pub async fn place(&self, input: PlaceOrder) -> DaoResult<(Order, Option<Reward>)> {
        let members = normalize_members(input.members)?;

        let ambassador = match input
            .referral_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            Some(code) => {
                let code = code.to_uppercase();
                if !is_valid_referral_code(&code) {
                    return Err(DaoError::Validation(format!("Malformed referral code {code}")));
                }
                match self.ambassadors.find_by_referral_code(&code).await {
                    Ok(ambassador) => Some(ambassador),
                    Err(DaoError::NotFound) => {
                        return Err(DaoError::Validation(format!("Unknown referral code {code}")));
                    }
                    Err(e) => return Err(e),
                }
            }
            None => None,
        };

        let pricing = price_order(&self.pricing, members.len() as u32);
        let mut settings = OrderSettings::default();
        if let Some(gap) = input.gap {
            settings.gap = gap;
        }

        let mut new = NewOrder {
            order_number: generate_order_number(),
            group_name: input.group_name.trim().to_string(),
            customer: input.customer,
            members,
            grid_template: input.grid_template,
            shipping_address: input.shipping_address,
            settings,
            pricing,
            referral_code: ambassador.as_ref().map(|a| a.referral_code.clone()),
            ambassador_id: ambassador.as_ref().and_then(|a| a.id),
        };

        let mut attempt = 0;
        let order = loop {
            attempt += 1;
            match self.orders.create(&new).await {
                Ok(order) => break order,
                Err(DaoError::DuplicateKey(msg))
                    if msg.contains("order_number") && attempt < ORDER_NUMBER_ATTEMPTS =>
                {
                    warn!("Order number collision, retrying");
                    new.order_number = generate_order_number();
                }
                Err(e) => return Err(e),
            }
        };

        let order_id = order
            .id
            .ok_or_else(|| DaoError::Validation("Order has no id".to_string()))?;
        info!(
            order_id = %order_id,
            order_number = %order.order_number,
            members = order.members.len(),
            total_paise = order.pricing.total_paise,
            "Order placed"
        );

        let reward = match ambassador.and_then(|a| a.id) {
            Some(ambassador_id) => {
                let amount = reward_amount(order.pricing.total_paise, self.referral.reward_rate_bps);
                let reward = self
                    .rewards
                    .create(ambassador_id, order_id, order.order_number.clone(), amount)
                    .await?;
                self.ambassadors.record_referral(ambassador_id).await?;
                Some(reward)
            }
            None => None,
        };

        Ok((order, reward))
    }

    /// Deletes the order and cancels its pending rewards.
    pub async fn delete(&self, order_id: ObjectId) -> DaoResult<u64> {
        self.orders.delete(order_id).await?;
        let cancelled = self.rewards.cancel_for_order(order_id).await?;
        info!(order_id = %order_id, cancelled_rewards = cancelled, "Order deleted");
        Ok(cancelled)
    }

    /// Marks a reward paid and credits the ambassador.
    pub async fn pay_reward(&self, reward_id: ObjectId, admin_id: ObjectId) -> DaoResult<Reward> {
        let reward = self.rewards.mark_paid(reward_id, admin_id).await?;
        self.ambassadors
            .add_earnings(reward.ambassador_id, reward.amount_paise)
            .await?;
        info!(
            reward_id = %reward_id,
            amount_paise = reward.amount_paise,
            "Reward paid"
        );
        Ok(reward)
    }
}

/// `GF-YYYYMMDD-XXXXXX` with a random upper-case suffix.
pub fn generate_order_number() -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
    let mut rng = rand::rng();
    let suffix: String = (0..6)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    format!("GF-{}-{}", Utc::now().format("%Y%m%d"), suffix)
}

/// Trims fields, fills blank ids and enforces unique ids and valid votes.
pub fn normalize_members(members: Vec<NewMember>) -> DaoResult<Vec<OrderMember>> {
    if members.is_empty() {
        return Err(DaoError::Validation("Order needs at least one member".to_string()));
    }
    if members.len() > MAX_MEMBERS {
        return Err(DaoError::Validation(format!(
            "Order can have at most {MAX_MEMBERS} members"
        )));
    }

    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(members.len());
    for member in members {
        let name = member.name.trim().to_string();
        if name.is_empty() {
            return Err(DaoError::Validation("Member name is required".to_string()));
        }
        let id = member
            .id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
        if !seen.insert(id.clone()) {
            return Err(DaoError::Validation(format!("Duplicate member id {id}")));
        }
        normalized.push(OrderMember {
            id,
            name,
            roll_number: trimmed(member.roll_number),
            photo: trimmed(member.photo),
            vote: trimmed(member.vote),
        });
    }

    for member in &normalized {
        if let Some(vote) = &member.vote {
            if !seen.contains(vote) {
                return Err(DaoError::Validation(format!(
                    "Member {} voted for unknown member {vote}",
                    member.id
                )));
            }
        }
    }
    Ok(normalized)
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
