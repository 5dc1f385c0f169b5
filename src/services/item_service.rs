use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::items::{CreateItemRequest, UpdateItemRequest},
    entity::{
        items::{ActiveModel as ItemActive, Column as ItemCol, Entity as Items},
        order_items::{Column as OrderItemCol, Entity as OrderItems},
    },
    error::{AppError, AppResult},
    models::Item,
    services::stock_ledger,
    state::AppState,
};

pub async fn list_items(state: &AppState) -> AppResult<Vec<Item>> {
    let items = Items::find()
        .order_by_asc(Expr::cust("rowid"))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Item::from)
        .collect();
    Ok(items)
}

/// Items at or below their reorder level, emptiest first.
pub async fn list_low_stock(state: &AppState) -> AppResult<Vec<Item>> {
    let items = Items::find()
        .filter(Expr::col(ItemCol::Quantity).lte(Expr::col(ItemCol::ReorderLevel)))
        .order_by_asc(ItemCol::Quantity)
        .order_by_asc(ItemCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Item::from)
        .collect();
    Ok(items)
}

pub async fn get_item(state: &AppState, id: &str) -> AppResult<Item> {
    let item = Items::find_by_id(id.to_string()).one(&state.orm).await?;
    match item {
        Some(item) => Ok(item.into()),
        None => Err(AppError::NotFound(format!("Item {id}"))),
    }
}

pub async fn create_item(state: &AppState, payload: CreateItemRequest) -> AppResult<Item> {
    let name = required(payload.name, "name")?;
    let quantity = payload.quantity.unwrap_or(0);
    let reorder_level = payload.reorder_level.unwrap_or(0);
    let cost_price = payload.cost_price.unwrap_or(0.0);
    let sale_price = payload.sale_price.unwrap_or(0.0);
    validate_levels(quantity, reorder_level)?;
    validate_prices(cost_price, sale_price)?;

    let id = match payload.id.map(|id| id.trim().to_string()) {
        Some(id) if !id.is_empty() => id,
        _ => generate_item_id(),
    };

    if Items::find_by_id(id.clone()).one(&state.orm).await?.is_some() {
        return Err(AppError::BadRequest(format!("Item {id} already exists")));
    }
    let sku = non_blank(payload.sku);
    ensure_sku_free(state, sku.as_deref(), None).await?;

    let active = ItemActive {
        id: Set(id.clone()),
        sku: Set(sku),
        name: Set(name),
        category: Set(non_blank(payload.category)),
        quantity: Set(quantity),
        reorder_level: Set(reorder_level),
        cost_price: Set(cost_price),
        sale_price: Set(sale_price),
        description: Set(payload.description),
    };
    let item = active
        .insert(&state.orm)
        .await
        .map_err(|err| AppError::from_write(err, &format!("Item {id} or its SKU")))?;

    audit::record(
        &state.pool,
        "item_create",
        "items",
        serde_json::json!({ "item_id": item.id }),
    )
    .await;

    Ok(item.into())
}

pub async fn update_item(state: &AppState, id: &str, payload: UpdateItemRequest) -> AppResult<Item> {
    if payload.is_empty() {
        return Err(AppError::BadRequest("No fields to update".into()));
    }

    let existing = Items::find_by_id(id.to_string()).one(&state.orm).await?;
    let existing = match existing {
        Some(item) => item,
        None => return Err(AppError::NotFound(format!("Item {id}"))),
    };

    validate_levels(
        payload.quantity.unwrap_or(existing.quantity),
        payload.reorder_level.unwrap_or(existing.reorder_level),
    )?;
    validate_prices(
        payload.cost_price.unwrap_or(existing.cost_price),
        payload.sale_price.unwrap_or(existing.sale_price),
    )?;

    let sku = payload.sku.map(|sku| non_blank(Some(sku)));
    if let Some(sku) = &sku {
        ensure_sku_free(state, sku.as_deref(), Some(id)).await?;
    }

    let mut active: ItemActive = existing.into();
    if let Some(sku) = sku {
        active.sku = Set(sku);
    }
    if let Some(name) = payload.name {
        active.name = Set(required(Some(name), "name")?);
    }
    if let Some(category) = payload.category {
        active.category = Set(non_blank(Some(category)));
    }
    if let Some(quantity) = payload.quantity {
        active.quantity = Set(quantity);
    }
    if let Some(reorder_level) = payload.reorder_level {
        active.reorder_level = Set(reorder_level);
    }
    if let Some(cost_price) = payload.cost_price {
        active.cost_price = Set(cost_price);
    }
    if let Some(sale_price) = payload.sale_price {
        active.sale_price = Set(sale_price);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }

    let item = active
        .update(&state.orm)
        .await
        .map_err(|err| AppError::from_update(err, &format!("Item {id}"), "An item with this SKU"))?;

    audit::record(
        &state.pool,
        "item_update",
        "items",
        serde_json::json!({ "item_id": item.id }),
    )
    .await;

    Ok(item.into())
}

/// Deletes an item unless historical orders still reference it.
pub async fn delete_item(state: &AppState, id: &str) -> AppResult<()> {
    let txn = stock_ledger::begin_write(&state.orm).await?;

    let references = OrderItems::find()
        .filter(OrderItemCol::ItemId.eq(id))
        .count(&txn)
        .await?;
    if references > 0 {
        return Err(AppError::BadRequest(format!(
            "Item {id} is referenced by {references} order line item(s) and cannot be deleted"
        )));
    }

    let result = Items::delete_by_id(id.to_string())
        .exec(&txn)
        .await
        .map_err(|err| AppError::from_write(err, &format!("Item {id}")))?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound(format!("Item {id}")));
    }
    txn.commit().await?;

    audit::record(
        &state.pool,
        "item_delete",
        "items",
        serde_json::json!({ "item_id": id }),
    )
    .await;

    Ok(())
}

async fn ensure_sku_free(state: &AppState, sku: Option<&str>, except: Option<&str>) -> AppResult<()> {
    let Some(sku) = sku else {
        return Ok(());
    };
    let mut finder = Items::find().filter(ItemCol::Sku.eq(sku));
    if let Some(id) = except {
        finder = finder.filter(ItemCol::Id.ne(id));
    }
    if finder.count(&state.orm).await? > 0 {
        return Err(AppError::BadRequest(format!("SKU {sku} is already in use")));
    }
    Ok(())
}

fn required(value: Option<String>, field: &str) -> AppResult<String> {
    match non_blank(value) {
        Some(v) => Ok(v),
        None => Err(AppError::BadRequest(format!("{field} is required"))),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_levels(quantity: i32, reorder_level: i32) -> AppResult<()> {
    if quantity < 0 {
        return Err(AppError::BadRequest("quantity cannot be negative".into()));
    }
    if reorder_level < 0 {
        return Err(AppError::BadRequest("reorder_level cannot be negative".into()));
    }
    Ok(())
}

fn validate_prices(cost_price: f64, sale_price: f64) -> AppResult<()> {
    if !cost_price.is_finite() || cost_price < 0.0 {
        return Err(AppError::BadRequest("cost_price must be a non-negative number".into()));
    }
    if !sale_price.is_finite() || sale_price < 0.0 {
        return Err(AppError::BadRequest("sale_price must be a non-negative number".into()));
    }
    Ok(())
}

fn generate_item_id() -> String {
    format!("ITM{}", &Uuid::new_v4().simple().to_string()[..10].to_uppercase())
}
