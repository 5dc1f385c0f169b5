use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse},
        items::{CreateItemRequest, ItemList, UpdateItemRequest},
        orders::{CreateOrderRequest, OrderLineRequest, OrderList, UpdateOrderRequest},
    },
    error::ErrorBody,
    models::{Item, Order, OrderLineItem},
    response::MessageResponse,
    routes::{auth, health, items, orders},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        items::list_items,
        items::list_low_stock,
        items::get_item,
        items::create_item,
        items::update_item,
        items::delete_item,
        orders::list_orders,
        orders::get_order,
        orders::create_order,
        orders::update_order,
        orders::delete_order
    ),
    components(
        schemas(
            Item,
            Order,
            OrderLineItem,
            ItemList,
            OrderList,
            CreateItemRequest,
            UpdateItemRequest,
            CreateOrderRequest,
            OrderLineRequest,
            UpdateOrderRequest,
            LoginRequest,
            LoginResponse,
            MessageResponse,
            ErrorBody,
            health::HealthData
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Placeholder admin login"),
        (name = "Items", description = "Stock item endpoints"),
        (name = "Orders", description = "Order endpoints; creating an order reserves stock"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
