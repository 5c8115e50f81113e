use bson::{doc, oid::ObjectId, DateTime, Document};
use futures::TryStreamExt;
use mongodb::Database;
use groupframe_db::models::{
    CustomerInfo, GridTemplateName, Order, OrderMember, OrderSettings, OrderStatus, PaymentInfo,
    PaymentStatus, PricingBreakdown, ShippingAddress,
};

use super::base::{
    bson_as_u64, enum_to_bson, BaseDao, DaoError, DaoResult, PaginatedResult, PaginationParams,
};

pub struct NewOrder {
    pub order_number: String,
    pub group_name: String,
    pub customer: CustomerInfo,
    pub members: Vec<OrderMember>,
    pub grid_template: GridTemplateName,
    pub shipping_address: ShippingAddress,
    pub settings: OrderSettings,
    pub pricing: PricingBreakdown,
    pub referral_code: Option<String>,
    pub ambassador_id: Option<ObjectId>,
}

pub struct OrderDao {
    pub base: BaseDao<Order>,
}

impl OrderDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Order::COLLECTION),
        }
    }

    pub async fn create(&self, new: &NewOrder) -> DaoResult<Order> {
        let now = DateTime::now();
        let order = Order {
            id: None,
            order_number: new.order_number.clone(),
            group_name: new.group_name.clone(),
            customer: new.customer.clone(),
            members: new.members.clone(),
            grid_template: new.grid_template,
            shipping_address: new.shipping_address.clone(),
            settings: new.settings.clone(),
            status: OrderStatus::New,
            payment: PaymentInfo {
                status: PaymentStatus::Pending,
                method: None,
                reference: None,
                amount_paise: 0,
                paid_at: None,
            },
            pricing: new.pricing.clone(),
            referral_code: new.referral_code.clone(),
            ambassador_id: new.ambassador_id,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&order).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_id(&self, id: ObjectId) -> DaoResult<Order> {
        self.base.find_by_id(id).await
    }

    pub async fn list(
        &self,
        status: Option<OrderStatus>,
        params: &PaginationParams,
    ) -> DaoResult<PaginatedResult<Order>> {
        let mut filter = doc! {};
        if let Some(status) = status {
            filter.insert("status", enum_to_bson(&status)?);
        }
        self.base
            .find_paginated(filter, Some(doc! { "created_at": -1 }), params)
            .await
    }

    pub async fn set_status(&self, id: ObjectId, status: OrderStatus) -> DaoResult<Order> {
        let found = self
            .base
            .update_by_id(id, doc! { "$set": { "status": enum_to_bson(&status)? } })
            .await?;
        if !found {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(id).await
    }

    pub async fn record_payment(&self, id: ObjectId, payment: &PaymentInfo) -> DaoResult<Order> {
        let found = self
            .base
            .update_by_id(id, doc! { "$set": { "payment": bson::to_bson(payment)? } })
            .await?;
        if !found {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(id).await
    }

    pub async fn delete(&self, id: ObjectId) -> DaoResult<()> {
        if self.base.delete_by_id(id).await? {
            Ok(())
        } else {
            Err(DaoError::NotFound)
        }
    }

    pub async fn count_by_status(&self, status: OrderStatus) -> DaoResult<u64> {
        self.base
            .count(doc! { "status": enum_to_bson(&status)? })
            .await
    }

    /// Sum of `pricing.total_paise` over orders whose payment is `paid`.
    pub async fn paid_revenue_paise(&self) -> DaoResult<u64> {
        let pipeline = vec![
            doc! { "$match": { "payment.status": enum_to_bson(&PaymentStatus::Paid)? } },
            doc! { "$group": { "_id": null, "total": { "$sum": "$pricing.total_paise" } } },
        ];
        let rows: Vec<Document> = self
            .base
            .collection()
            .aggregate(pipeline)
            .await?
            .try_collect()
            .await?;
        Ok(rows
            .first()
            .and_then(|row| row.get("total"))
            .and_then(bson_as_u64)
            .unwrap_or(0))
    }
}
