use axum::{
    Json,
    body::Body,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::Response,
};
use bson::DateTime;
use chrono::Utc;
use groupframe_db::models::{
    CustomerInfo, GridTemplateName, Order, OrderMember, OrderSettings, OrderStatus, PaymentInfo,
    PaymentStatus, PricingBreakdown, ShippingAddress,
};
use groupframe_render::grid::{GridDimensions, center_cell, check_eligibility};
use groupframe_render::{GridTemplate, VariantListing};
use groupframe_services::dao::base::{PaginatedResult, PaginationParams};
use groupframe_services::export::invoice::invoice_number;
use groupframe_services::export::render_invoice;
use groupframe_services::orders::{NewMember, PlaceOrder};
use groupframe_services::otp::normalize_phone;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{error::ApiError, extractors::auth::AdminUser, state::AppState};

use super::{parse_id, rfc3339, task::TaskResponse};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, max = 200))]
    pub group_name: String,
    #[validate(nested)]
    pub customer: CustomerRequest,
    #[validate(length(min = 1, max = 200))]
    pub members: Vec<MemberRequest>,
    #[serde(default)]
    pub grid_template: GridTemplateName,
    #[validate(nested)]
    pub shipping_address: AddressRequest,
    #[validate(range(max = 200))]
    pub gap: Option<u32>,
    pub referral_code: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CustomerRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "valid_phone"))]
    pub phone: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MemberRequest {
    pub id: Option<String>,
    pub name: String,
    pub roll_number: Option<String>,
    pub photo: Option<String>,
    pub vote: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddressRequest {
    #[validate(length(min = 1, max = 200))]
    pub line1: String,
    pub line2: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 100))]
    pub state: String,
    #[validate(length(min = 3, max = 12))]
    pub postal_code: String,
    pub country: Option<String>,
}

fn valid_phone(phone: &str) -> Result<(), ValidationError> {
    match normalize_phone(phone) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("phone")),
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    pub status: PaymentStatus,
    pub method: Option<String>,
    pub reference: Option<String>,
    /// Defaults to the order total.
    pub amount_paise: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub variant_id: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub status: PaymentStatus,
    pub method: Option<String>,
    pub reference: Option<String>,
    pub amount_paise: u64,
    pub paid_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub order_number: String,
    pub group_name: String,
    pub customer: CustomerInfo,
    pub members: Vec<OrderMember>,
    pub grid_template: GridTemplateName,
    pub shipping_address: ShippingAddress,
    pub settings: OrderSettings,
    pub status: OrderStatus,
    pub payment: PaymentResponse,
    pub pricing: PricingBreakdown,
    pub referral_code: Option<String>,
    pub ambassador_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.map(|id| id.to_hex()).unwrap_or_default(),
            order_number: order.order_number,
            group_name: order.group_name,
            customer: order.customer,
            members: order.members,
            grid_template: order.grid_template,
            shipping_address: order.shipping_address,
            settings: order.settings,
            status: order.status,
            payment: PaymentResponse {
                status: order.payment.status,
                method: order.payment.method,
                reference: order.payment.reference,
                amount_paise: order.payment.amount_paise,
                paid_at: order.payment.paid_at.map(rfc3339),
            },
            pricing: order.pricing,
            referral_code: order.referral_code,
            ambassador_id: order.ambassador_id.map(|id| id.to_hex()),
            created_at: rfc3339(order.created_at),
            updated_at: rfc3339(order.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EligibilityResponse {
    pub order_id: String,
    pub eligible: bool,
    pub reason: Option<String>,
    pub member_count: usize,
    pub photographed_members: usize,
    pub grid: GridDimensions,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub cancelled_rewards: u64,
}

#[derive(Debug, Serialize)]
pub struct RenderTokenResponse {
    pub token: String,
    pub expires_in: u64,
    pub url: String,
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    body.validate()?;
    let customer_phone = normalize_phone(&body.customer.phone)
        .ok_or_else(|| ApiError::Validation("Invalid phone number".to_string()))?;

    let input = PlaceOrder {
        group_name: body.group_name,
        customer: CustomerInfo {
            name: body.customer.name.trim().to_string(),
            email: body.customer.email.trim().to_lowercase(),
            phone: customer_phone,
        },
        members: body
            .members
            .into_iter()
            .map(|m| NewMember {
                id: m.id,
                name: m.name,
                roll_number: m.roll_number,
                photo: m.photo,
                vote: m.vote,
            })
            .collect(),
        grid_template: body.grid_template,
        shipping_address: ShippingAddress {
            line1: body.shipping_address.line1.trim().to_string(),
            line2: body
                .shipping_address
                .line2
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
            city: body.shipping_address.city.trim().to_string(),
            state: body.shipping_address.state.trim().to_string(),
            postal_code: body.shipping_address.postal_code.trim().to_string(),
            country: body
                .shipping_address
                .country
                .map(|c| c.trim().to_uppercase())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| "IN".to_string()),
        },
        gap: body.gap,
        referral_code: body.referral_code,
    };

    let (order, _reward) = state.order_service.place(input).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

pub async fn eligibility(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EligibilityResponse>, ApiError> {
    let id = parse_id(&id, "order id")?;
    let order = state.orders.find_by_id(id).await?;

    let member_count = order.members.len();
    let photographed_members = order.members.iter().filter(|m| m.has_photo()).count();
    let verdict = check_eligibility(member_count, photographed_members);
    let template = match order.grid_template {
        GridTemplateName::Square => GridTemplate::Square,
        GridTemplateName::Hexagonal => GridTemplate::Hexagonal,
    };

    Ok(Json(EligibilityResponse {
        order_id: id.to_hex(),
        eligible: verdict.eligible,
        reason: verdict.reason,
        member_count,
        photographed_members,
        grid: center_cell(member_count, template),
    }))
}

pub async fn list(
    State(state): State<AppState>,
    _auth: AdminUser,
    Query(filter): Query<StatusFilter>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedResult<OrderResponse>>, ApiError> {
    let result = state.orders.list(filter.status, &params).await?;
    Ok(Json(result.map(OrderResponse::from)))
}

pub async fn get(
    State(state): State<AppState>,
    _auth: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let id = parse_id(&id, "order id")?;
    let order = state.orders.find_by_id(id).await?;
    Ok(Json(order.into()))
}

pub async fn update_status(
    State(state): State<AppState>,
    _auth: AdminUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let id = parse_id(&id, "order id")?;
    let order = state.orders.set_status(id, body.status).await?;
    tracing::info!(order_id = %id, status = ?body.status, "Order status updated");
    Ok(Json(order.into()))
}

pub async fn record_payment(
    State(state): State<AppState>,
    _auth: AdminUser,
    Path(id): Path<String>,
    Json(body): Json<RecordPaymentRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let id = parse_id(&id, "order id")?;
    let current = state.orders.find_by_id(id).await?;

    let paid = body.status == PaymentStatus::Paid;
    let payment = PaymentInfo {
        status: body.status,
        method: body.method.filter(|m| !m.trim().is_empty()),
        reference: body.reference.filter(|r| !r.trim().is_empty()),
        amount_paise: body.amount_paise.unwrap_or(current.pricing.total_paise),
        paid_at: if paid {
            Some(current.payment.paid_at.unwrap_or_else(DateTime::now))
        } else {
            None
        },
    };
    let order = state.orders.record_payment(id, &payment).await?;
    tracing::info!(order_id = %id, status = ?payment.status, "Payment recorded");
    Ok(Json(order.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    _auth: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = parse_id(&id, "order id")?;
    let cancelled_rewards = state.order_service.delete(id).await?;
    Ok(Json(DeleteResponse {
        deleted: true,
        cancelled_rewards,
    }))
}

/// Step one of the render flow: the variants an admin can pick from.
pub async fn variants(
    State(state): State<AppState>,
    _auth: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<VariantListing>, ApiError> {
    let id = parse_id(&id, "order id")?;
    // Surface a missing order as 404 before the flow turns it into a fetch error.
    state.orders.find_by_id(id).await?;
    let listing = state.render.flow()?.bootstrap(&id.to_hex(), None).await?;
    Ok(Json(listing))
}

pub async fn render(
    State(state): State<AppState>,
    auth: AdminUser,
    Path(id): Path<String>,
    Json(body): Json<RenderRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let id = parse_id(&id, "order id")?;
    let order = state.orders.find_by_id(id).await?;
    let task = state
        .render
        .start_render(auth.user_id, &order, body.variant_id.trim())
        .await?;
    Ok((StatusCode::ACCEPTED, Json(task.into())))
}

pub async fn invoice(
    State(state): State<AppState>,
    _auth: AdminUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, "order id")?;
    let order = state.orders.find_by_id(id).await?;
    let file_name = format!("{}.pdf", invoice_number(&order));
    let pdf = render_invoice(&order, Utc::now());

    Response::builder()
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        )
        .body(Body::from(pdf))
        .map_err(|e| ApiError::Internal(e.to_string()))
}

pub async fn render_token(
    State(state): State<AppState>,
    auth: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<RenderTokenResponse>, ApiError> {
    let id = parse_id(&id, "order id")?;
    state.orders.find_by_id(id).await?;
    let (token, expires_in) = state.auth.generate_render_token(auth.user_id, id)?;
    let url = format!(
        "{}/render/order/{}?token={}",
        state.settings.render.api_base.trim_end_matches('/'),
        id.to_hex(),
        token
    );
    Ok(Json(RenderTokenResponse {
        token,
        expires_in,
        url,
    }))
}
