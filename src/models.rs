use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::{
    items::Model as ItemModel, order_items::Model as OrderItemModel, orders::Model as OrderModel,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Item {
    pub id: String,
    pub sku: Option<String>,
    pub name: String,
    pub category: Option<String>,
    pub quantity: i32,
    pub reorder_level: i32,
    pub cost_price: f64,
    pub sale_price: f64,
    pub description: Option<String>,
}

impl From<ItemModel> for Item {
    fn from(model: ItemModel) -> Self {
        Self {
            id: model.id,
            sku: model.sku,
            name: model.name,
            category: model.category,
            quantity: model.quantity,
            reorder_level: model.reorder_level,
            cost_price: model.cost_price,
            sale_price: model.sale_price,
            description: model.description,
        }
    }
}

/// Order lifecycle state. Unknown values are kept verbatim so the front end
/// can introduce new labels without a backend release.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Other(s) => s,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => OrderStatus::Pending,
            "processing" => OrderStatus::Processing,
            "shipped" => OrderStatus::Shipped,
            "delivered" => OrderStatus::Delivered,
            "cancelled" | "canceled" => OrderStatus::Cancelled,
            _ => OrderStatus::Other(value),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(value: OrderStatus) -> Self {
        match value {
            OrderStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderLineItem {
    pub id: i32,
    pub item_id: String,
    pub qty: i32,
    pub sale_price: f64,
}

impl From<OrderItemModel> for OrderLineItem {
    fn from(model: OrderItemModel) -> Self {
        Self {
            id: model.id,
            item_id: model.item_id,
            qty: model.qty,
            sale_price: model.sale_price,
        }
    }
}

/// An order header with its line items nested under `items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: String,
    pub date: String,
    pub customer: String,
    pub ticket_number: Option<String>,
    pub billing_address: Option<String>,
    pub phone_number: Option<String>,
    pub tags: Option<String>,
    pub total: f64,
    #[schema(value_type = String, example = "Pending")]
    pub status: OrderStatus,
    pub items: Vec<OrderLineItem>,
}

impl Order {
    pub fn from_parts(model: OrderModel, items: Vec<OrderLineItem>) -> Self {
        Self {
            id: model.id,
            date: model.date,
            customer: model.customer,
            ticket_number: model.ticket_number,
            billing_address: model.billing_address,
            phone_number: model.phone_number,
            tags: model.tags,
            total: model.total,
            status: OrderStatus::from(model.status),
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_are_case_insensitive() {
        assert_eq!(OrderStatus::from("delivered".to_string()), OrderStatus::Delivered);
        assert_eq!(OrderStatus::from("Canceled".to_string()), OrderStatus::Cancelled);
    }

    #[test]
    fn unknown_status_round_trips_verbatim() {
        let status: OrderStatus = serde_json::from_str("\"On Hold\"").unwrap();
        assert_eq!(status, OrderStatus::Other("On Hold".into()));
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"On Hold\"");
    }

    #[test]
    fn order_serializes_nested_items() {
        let order = Order {
            id: "ORD1".into(),
            date: "2023-10-01".into(),
            customer: "John Doe".into(),
            ticket_number: None,
            billing_address: None,
            phone_number: None,
            tags: None,
            total: 800.0,
            status: OrderStatus::Delivered,
            items: vec![OrderLineItem {
                id: 1,
                item_id: "id1".into(),
                qty: 1,
                sale_price: 800.0,
            }],
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["status"], "Delivered");
        assert_eq!(json["items"][0]["item_id"], "id1");
        assert_eq!(json["items"][0]["qty"], 1);
    }
}
