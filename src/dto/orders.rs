use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Order, OrderStatus};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OrderLineRequest {
    pub item_id: String,
    pub qty: i32,
    /// Defaults to the item's current sale price.
    pub sale_price: Option<f64>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    /// Generated when omitted.
    pub id: Option<String>,
    /// `YYYY-MM-DD`; defaults to today.
    pub date: Option<String>,
    pub customer: Option<String>,
    pub ticket_number: Option<String>,
    pub billing_address: Option<String>,
    pub phone_number: Option<String>,
    pub tags: Option<String>,
    /// Computed from the lines when omitted.
    pub total: Option<f64>,
    #[schema(value_type = Option<String>)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub items: Vec<OrderLineRequest>,
}

/// Sparse patch: absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub date: Option<String>,
    pub customer: Option<String>,
    pub ticket_number: Option<String>,
    pub billing_address: Option<String>,
    pub phone_number: Option<String>,
    pub tags: Option<String>,
    pub total: Option<f64>,
    #[schema(value_type = Option<String>)]
    pub status: Option<OrderStatus>,
}

impl UpdateOrderRequest {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.customer.is_none()
            && self.ticket_number.is_none()
            && self.billing_address.is_none()
            && self.phone_number.is_none()
            && self.tags.is_none()
            && self.total.is_none()
            && self.status.is_none()
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<Order>)]
    pub items: Vec<Order>,
}
