use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::get,
};

use crate::{
    dto::items::{CreateItemRequest, ItemList, UpdateItemRequest},
    error::{AppResult, ErrorBody},
    models::Item,
    response::MessageResponse,
    services::item_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/low-stock", get(list_low_stock))
        .route(
            "/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
}

#[utoipa::path(
    get,
    path = "/api/items",
    responses(
        (status = 200, description = "All items in insertion order", body = ItemList)
    ),
    tag = "Items"
)]
pub async fn list_items(State(state): State<AppState>) -> AppResult<Json<ItemList>> {
    let items = item_service::list_items(&state).await?;
    Ok(Json(ItemList { items }))
}

#[utoipa::path(
    get,
    path = "/api/items/low-stock",
    responses(
        (status = 200, description = "Items at or below their reorder level", body = ItemList)
    ),
    tag = "Items"
)]
pub async fn list_low_stock(State(state): State<AppState>) -> AppResult<Json<ItemList>> {
    let items = item_service::list_low_stock(&state).await?;
    Ok(Json(ItemList { items }))
}

#[utoipa::path(
    get,
    path = "/api/items/{id}",
    params(
        ("id" = String, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Get item", body = Item),
        (status = 404, description = "Item not found", body = ErrorBody),
    ),
    tag = "Items"
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Item>> {
    let item = item_service::get_item(&state, &id).await?;
    Ok(Json(item))
}

#[utoipa::path(
    post,
    path = "/api/items",
    request_body = CreateItemRequest,
    responses(
        (status = 200, description = "Item created", body = MessageResponse),
        (status = 400, description = "Missing fields or duplicate id/SKU", body = ErrorBody),
    ),
    tag = "Items"
)]
pub async fn create_item(
    State(state): State<AppState>,
    payload: Result<Json<CreateItemRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(payload) = payload?;
    let item = item_service::create_item(&state, payload).await?;
    Ok(Json(MessageResponse::with_id(item.id, "Item added successfully")))
}

#[utoipa::path(
    put,
    path = "/api/items/{id}",
    params(
        ("id" = String, Path, description = "Item ID")
    ),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Item updated", body = MessageResponse),
        (status = 400, description = "Invalid or empty update", body = ErrorBody),
        (status = 404, description = "Item not found", body = ErrorBody),
    ),
    tag = "Items"
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateItemRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(payload) = payload?;
    let item = item_service::update_item(&state, &id, payload).await?;
    Ok(Json(MessageResponse::with_id(item.id, "Item updated successfully")))
}

#[utoipa::path(
    delete,
    path = "/api/items/{id}",
    params(
        ("id" = String, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item deleted", body = MessageResponse),
        (status = 400, description = "Item is referenced by existing orders", body = ErrorBody),
        (status = 404, description = "Item not found", body = ErrorBody),
    ),
    tag = "Items"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    item_service::delete_item(&state, &id).await?;
    Ok(Json(MessageResponse::with_id(id, "Item deleted successfully")))
}
