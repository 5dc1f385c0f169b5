use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{CreateOrderRequest, OrderLineRequest, UpdateOrderRequest},
    entity::{
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Entity as Orders},
    },
    error::{AppError, AppResult},
    models::{Order, OrderLineItem},
    services::stock_ledger::{self, StockRequest},
    state::AppState,
};

pub async fn list_orders(state: &AppState) -> AppResult<Vec<Order>> {
    let headers = Orders::find()
        .order_by_asc(Expr::cust("rowid"))
        .all(&state.orm)
        .await?;

    let mut lines: HashMap<String, Vec<OrderLineItem>> = HashMap::new();
    for line in OrderItems::find()
        .order_by_asc(OrderItemCol::Id)
        .all(&state.orm)
        .await?
    {
        lines
            .entry(line.order_id.clone())
            .or_default()
            .push(line.into());
    }

    let orders = headers
        .into_iter()
        .map(|header| {
            let items = lines.remove(&header.id).unwrap_or_default();
            Order::from_parts(header, items)
        })
        .collect();
    Ok(orders)
}

pub async fn get_order(state: &AppState, id: &str) -> AppResult<Order> {
    let header = Orders::find_by_id(id.to_string()).one(&state.orm).await?;
    let header = match header {
        Some(o) => o,
        None => return Err(AppError::NotFound(format!("Order {id}"))),
    };
    let items = list_line_items(&state.orm, id).await?;
    Ok(Order::from_parts(header, items))
}

pub async fn list_line_items<C>(conn: &C, order_id: &str) -> AppResult<Vec<OrderLineItem>>
where
    C: ConnectionTrait,
{
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .order_by_asc(OrderItemCol::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(OrderLineItem::from)
        .collect();
    Ok(items)
}

/// Check stock, write the header and its lines, then decrement stock, all in
/// one transaction while holding the ledger lock. Any failure leaves the
/// database untouched.
pub async fn create_order(state: &AppState, payload: CreateOrderRequest) -> AppResult<Order> {
    let customer = required(payload.customer, "customer")?;
    let requests: Vec<StockRequest> = payload
        .items
        .iter()
        .map(|line| StockRequest::new(line.item_id.trim(), line.qty))
        .collect();
    stock_ledger::aggregate(&requests)?;
    for line in &payload.items {
        if let Some(price) = line.sale_price {
            validate_amount(price, "sale_price")?;
        }
    }
    if let Some(total) = payload.total {
        validate_amount(total, "total")?;
    }

    let id = match payload.id.map(|id| id.trim().to_string()) {
        Some(id) if !id.is_empty() => id,
        _ => generate_order_id(),
    };
    let date = match non_blank(payload.date) {
        Some(date) => validate_date(date)?,
        None => today(),
    };
    let status = payload.status.unwrap_or_default();

    let guard = state.ledger.lock().await;
    let txn = stock_ledger::begin_write(&state.orm).await?;

    if Orders::find_by_id(id.clone()).one(&txn).await?.is_some() {
        return Err(AppError::BadRequest(format!("Order {id} already exists")));
    }

    let stock = stock_ledger::check_stock(&txn, &requests).await?;

    let priced = price_lines(&payload.items, &stock)?;
    let total = payload
        .total
        .unwrap_or_else(|| priced.iter().map(|(_, qty, price)| f64::from(*qty) * price).sum());

    let header = OrderActive {
        id: Set(id.clone()),
        date: Set(date),
        customer: Set(customer),
        ticket_number: Set(non_blank(payload.ticket_number)),
        billing_address: Set(non_blank(payload.billing_address)),
        phone_number: Set(non_blank(payload.phone_number)),
        tags: Set(non_blank(payload.tags)),
        total: Set(total),
        status: Set(status.into()),
    }
    .insert(&txn)
    .await
    .map_err(|err| AppError::from_write(err, &format!("Order {id}")))?;

    let mut items = Vec::with_capacity(priced.len());
    for (item_id, qty, sale_price) in priced {
        let line = OrderItemActive {
            id: NotSet,
            order_id: Set(header.id.clone()),
            item_id: Set(item_id),
            qty: Set(qty),
            sale_price: Set(sale_price),
        }
        .insert(&txn)
        .await?;
        items.push(OrderLineItem::from(line));
    }

    stock_ledger::apply_decrements(&txn, &requests).await?;

    txn.commit().await?;
    drop(guard);

    tracing::info!(order_id = %header.id, lines = items.len(), total = header.total, "order created");
    audit::record(
        &state.pool,
        "order_create",
        "orders",
        serde_json::json!({ "order_id": header.id, "lines": items.len() }),
    )
    .await;

    Ok(Order::from_parts(header, items))
}

pub async fn update_order(state: &AppState, id: &str, payload: UpdateOrderRequest) -> AppResult<Order> {
    if payload.is_empty() {
        return Err(AppError::BadRequest("No fields to update".into()));
    }
    if let Some(total) = payload.total {
        validate_amount(total, "total")?;
    }
    let date = match payload.date {
        Some(date) => Some(validate_date(required(Some(date), "date")?)?),
        None => None,
    };

    let existing = Orders::find_by_id(id.to_string()).one(&state.orm).await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::NotFound(format!("Order {id}"))),
    };

    let mut active: OrderActive = existing.into();
    if let Some(date) = date {
        active.date = Set(date);
    }
    if let Some(customer) = payload.customer {
        active.customer = Set(required(Some(customer), "customer")?);
    }
    if let Some(ticket_number) = payload.ticket_number {
        active.ticket_number = Set(non_blank(Some(ticket_number)));
    }
    if let Some(billing_address) = payload.billing_address {
        active.billing_address = Set(non_blank(Some(billing_address)));
    }
    if let Some(phone_number) = payload.phone_number {
        active.phone_number = Set(non_blank(Some(phone_number)));
    }
    if let Some(tags) = payload.tags {
        active.tags = Set(non_blank(Some(tags)));
    }
    if let Some(total) = payload.total {
        active.total = Set(total);
    }
    if let Some(status) = payload.status {
        active.status = Set(status.into());
    }

    let header = active
        .update(&state.orm)
        .await
        .map_err(|err| {
            let subject = format!("Order {id}");
            AppError::from_update(err, &subject, &subject)
        })?;
    let items = list_line_items(&state.orm, id).await?;

    audit::record(
        &state.pool,
        "order_update",
        "orders",
        serde_json::json!({ "order_id": header.id, "status": header.status }),
    )
    .await;

    Ok(Order::from_parts(header, items))
}

/// Removes the line items first, then the header. Stock is not restored.
pub async fn delete_order(state: &AppState, id: &str) -> AppResult<()> {
    let txn = stock_ledger::begin_write(&state.orm).await?;

    if Orders::find_by_id(id.to_string()).one(&txn).await?.is_none() {
        return Err(AppError::NotFound(format!("Order {id}")));
    }

    let removed = OrderItems::delete_many()
        .filter(OrderItemCol::OrderId.eq(id))
        .exec(&txn)
        .await?;
    Orders::delete_by_id(id.to_string()).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!(order_id = %id, lines = removed.rows_affected, "order deleted");
    audit::record(
        &state.pool,
        "order_delete",
        "orders",
        serde_json::json!({ "order_id": id, "lines": removed.rows_affected }),
    )
    .await;

    Ok(())
}

/// Resolve each requested line's price, falling back to the item's current sale price.
fn price_lines(
    lines: &[OrderLineRequest],
    stock: &HashMap<String, crate::entity::items::Model>,
) -> AppResult<Vec<(String, i32, f64)>> {
    lines
        .iter()
        .map(|line| {
            let item_id = line.item_id.trim().to_string();
            let price = match line.sale_price {
                Some(price) => price,
                None => stock
                    .get(&item_id)
                    .map(|item| item.sale_price)
                    .ok_or_else(|| AppError::BadRequest(format!("Unknown item(s): {item_id}")))?,
            };
            Ok((item_id, line.qty, price))
        })
        .collect()
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

fn validate_amount(value: f64, field: &str) -> AppResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("{field} must be a non-negative number")))
    }
}

fn validate_date(date: String) -> AppResult<String> {
    match NaiveDate::parse_from_str(&date, "%Y-%m-%d") {
        Ok(_) => Ok(date),
        Err(_) => Err(AppError::BadRequest(format!("date must be YYYY-MM-DD, got {date}"))),
    }
}

fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

fn generate_order_id() -> String {
    format!("ORD{}", &Uuid::new_v4().simple().to_string()[..6].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::items::Model as ItemModel;

    fn item(id: &str, sale_price: f64) -> ItemModel {
        ItemModel {
            id: id.into(),
            sku: None,
            name: id.into(),
            category: None,
            quantity: 10,
            reorder_level: 1,
            cost_price: 1.0,
            sale_price,
            description: None,
        }
    }

    #[test]
    fn lines_fall_back_to_current_sale_price() {
        let stock: HashMap<String, ItemModel> =
            [("id1".to_string(), item("id1", 800.0))].into_iter().collect();
        let lines = vec![
            OrderLineRequest {
                item_id: "id1".into(),
                qty: 2,
                sale_price: None,
            },
            OrderLineRequest {
                item_id: " id1 ".into(),
                qty: 1,
                sale_price: Some(750.0),
            },
        ];
        let priced = price_lines(&lines, &stock).unwrap();
        assert_eq!(
            priced,
            vec![("id1".to_string(), 2, 800.0), ("id1".to_string(), 1, 750.0)]
        );
    }

    #[test]
    fn generated_order_ids_look_like_orders() {
        let id = generate_order_id();
        assert!(id.starts_with("ORD"));
        assert_eq!(id.len(), 9);
        assert!(id[3..].chars().all(|c| c.is_ascii_alphanumeric() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn dates_must_be_calendar_days() {
        assert_eq!(validate_date("2024-02-29".into()).unwrap(), "2024-02-29");
        assert!(validate_date("2023-02-29".into()).is_err());
        assert!(validate_date("14/02/2024".into()).is_err());
        assert!(validate_date("yesterday".into()).is_err());
        assert!(validate_date(today()).is_ok());
    }

    #[test]
    fn amounts_must_be_finite_and_non_negative() {
        assert!(validate_amount(0.0, "total").is_ok());
        assert!(validate_amount(-1.0, "total").is_err());
        assert!(validate_amount(f64::INFINITY, "total").is_err());
    }
}
