use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Item;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateItemRequest {
    /// Generated when omitted.
    pub id: Option<String>,
    pub sku: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i32>,
    pub reorder_level: Option<i32>,
    pub cost_price: Option<f64>,
    pub sale_price: Option<f64>,
    pub description: Option<String>,
}

/// Sparse patch: absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateItemRequest {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i32>,
    pub reorder_level: Option<i32>,
    pub cost_price: Option<f64>,
    pub sale_price: Option<f64>,
    pub description: Option<String>,
}

impl UpdateItemRequest {
    pub fn is_empty(&self) -> bool {
        self.sku.is_none()
            && self.name.is_none()
            && self.category.is_none()
            && self.quantity.is_none()
            && self.reorder_level.is_none()
            && self.cost_price.is_none()
            && self.sale_price.is_none()
            && self.description.is_none()
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ItemList {
    #[schema(value_type = Vec<Item>)]
    pub items: Vec<Item>,
}
