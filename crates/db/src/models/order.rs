use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub order_number: String,
    pub group_name: String,
    pub customer: CustomerInfo,
    pub members: Vec<OrderMember>,
    #[serde(default)]
    pub grid_template: GridTemplateName,
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub settings: OrderSettings,
    #[serde(default)]
    pub status: OrderStatus,
    pub payment: PaymentInfo,
    pub pricing: PricingBreakdown,
    pub referral_code: Option<String>,
    pub ambassador_id: Option<ObjectId>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderMember {
    pub id: String,
    pub name: String,
    pub roll_number: Option<String>,
    /// Photo URL (`https://...`) or inline `data:` URL.
    pub photo: Option<String>,
    /// Id of the member this member voted to put in the center.
    pub vote: Option<String>,
}

impl OrderMember {
    pub fn has_photo(&self) -> bool {
        self.photo.as_deref().is_some_and(|p| !p.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GridTemplateName {
    #[default]
    Square,
    Hexagonal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default = "default_country")]
    pub country: String,
}

/// Print canvas geometry in pixels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSettings {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    #[serde(default = "default_gap")]
    pub gap: u32,
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            dpi: default_dpi(),
            gap: default_gap(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    New,
    InProgress,
    Ready,
    Shipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInfo {
    #[serde(default)]
    pub status: PaymentStatus,
    pub method: Option<String>,
    pub reference: Option<String>,
    #[serde(default)]
    pub amount_paise: u64,
    pub paid_at: Option<DateTime>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

/// Amounts in paise, frozen at order time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PricingBreakdown {
    pub member_count: u32,
    pub base_paise: u64,
    pub members_paise: u64,
    pub subtotal_paise: u64,
    pub gst_rate_bps: u32,
    pub gst_paise: u64,
    pub total_paise: u64,
}

fn default_country() -> String {
    "IN".to_string()
}

fn default_width() -> u32 {
    2550
}

fn default_height() -> u32 {
    3300
}

fn default_dpi() -> u32 {
    300
}

fn default_gap() -> u32 {
    20
}

impl Order {
    pub const COLLECTION: &'static str = "orders";

    pub fn photographed_members(&self) -> usize {
        self.members.iter().filter(|m| m.has_photo()).count()
    }
}
