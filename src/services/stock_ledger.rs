use std::{collections::HashMap, sync::Arc};

use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter, TransactionTrait,
};
use tokio::sync::{Mutex, MutexGuard};

use crate::{
    db::OrmConn,
    entity::items::{Column as ItemCol, Entity as Items, Model as ItemModel},
    error::{AppError, AppResult},
};

/// One requested line: take `qty` units of `item_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockRequest {
    pub item_id: String,
    pub qty: i32,
}

impl StockRequest {
    pub fn new(item_id: impl Into<String>, qty: i32) -> Self {
        Self {
            item_id: item_id.into(),
            qty,
        }
    }
}

/// Serializes every check-then-decrement sequence in the process.
///
/// Holders must keep the guard until the transaction that carries the
/// decrement has committed or rolled back.
#[derive(Clone, Default)]
pub struct StockLedger {
    lock: Arc<Mutex<()>>,
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }

    /// Standalone reservation: validate and decrement in its own transaction.
    pub async fn reserve(
        &self,
        orm: &OrmConn,
        requests: &[StockRequest],
    ) -> AppResult<HashMap<String, ItemModel>> {
        let _guard = self.lock().await;
        let txn = begin_write(orm).await?;
        let snapshot = reserve_stock(&txn, requests).await?;
        txn.commit().await?;
        Ok(snapshot)
    }
}

/// Open a transaction that already holds the SQLite write lock.
///
/// A deferred transaction that reads before it writes gets `SQLITE_BUSY` on
/// the upgrade without waiting; bumping the ledger revision first makes the
/// busy timeout cover the whole transaction.
pub async fn begin_write(orm: &OrmConn) -> AppResult<DatabaseTransaction> {
    let txn = orm.begin().await?;
    txn.execute_unprepared("UPDATE ledger_revision SET revision = revision + 1 WHERE id = 1")
        .await?;
    Ok(txn)
}

/// Sum quantities per item, keeping first-seen order. Rejects empty batches and non-positive quantities.
pub fn aggregate(requests: &[StockRequest]) -> AppResult<Vec<(String, i64)>> {
    if requests.is_empty() {
        return Err(AppError::BadRequest("Order must contain at least one item".into()));
    }

    let mut demand: Vec<(String, i64)> = Vec::new();
    for req in requests {
        if req.item_id.trim().is_empty() {
            return Err(AppError::BadRequest("Line item is missing item_id".into()));
        }
        if req.qty <= 0 {
            return Err(AppError::BadRequest(format!(
                "Quantity for item {} must be greater than 0",
                req.item_id
            )));
        }
        match demand.iter_mut().find(|(id, _)| *id == req.item_id) {
            Some((_, total)) => *total += i64::from(req.qty),
            None => demand.push((req.item_id.clone(), i64::from(req.qty))),
        }
    }
    Ok(demand)
}

/// Compare aggregated demand against stock on hand.
pub fn find_shortfalls(demand: &[(String, i64)], on_hand: &HashMap<String, i32>) -> AppResult<()> {
    let unknown: Vec<&str> = demand
        .iter()
        .filter(|(id, _)| !on_hand.contains_key(id))
        .map(|(id, _)| id.as_str())
        .collect();
    if !unknown.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Unknown item(s): {}",
            unknown.join(", ")
        )));
    }

    let short: Vec<String> = demand
        .iter()
        .filter(|(id, qty)| on_hand.get(id).is_some_and(|stock| i64::from(*stock) < *qty))
        .map(|(id, _)| id.clone())
        .collect();
    if short.is_empty() {
        Ok(())
    } else {
        Err(AppError::InsufficientStock(short))
    }
}

/// Validate the whole batch against current stock without writing anything.
/// Returns the fetched items keyed by id.
pub async fn check_stock<C>(conn: &C, requests: &[StockRequest]) -> AppResult<HashMap<String, ItemModel>>
where
    C: ConnectionTrait,
{
    let demand = aggregate(requests)?;
    let ids: Vec<String> = demand.iter().map(|(id, _)| id.clone()).collect();

    let items: HashMap<String, ItemModel> = Items::find()
        .filter(ItemCol::Id.is_in(ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|item| (item.id.clone(), item))
        .collect();

    let on_hand: HashMap<String, i32> = items
        .iter()
        .map(|(id, item)| (id.clone(), item.quantity))
        .collect();

    if let Err(err) = find_shortfalls(&demand, &on_hand) {
        tracing::warn!(error = %err, "stock reservation rejected");
        return Err(err);
    }
    Ok(items)
}

/// Decrement stock for an already validated batch. Each update is guarded so
/// stock can never go below zero; a guard miss aborts with `InsufficientStock`.
pub async fn apply_decrements<C>(conn: &C, requests: &[StockRequest]) -> AppResult<()>
where
    C: ConnectionTrait,
{
    for (item_id, qty) in aggregate(requests)? {
        let result = Items::update_many()
            .col_expr(ItemCol::Quantity, Expr::col(ItemCol::Quantity).sub(qty))
            .filter(ItemCol::Id.eq(item_id.as_str()))
            .filter(ItemCol::Quantity.gte(qty))
            .exec(conn)
            .await?;

        if result.rows_affected == 0 {
            tracing::warn!(item_id = %item_id, qty, "stock changed underneath reservation");
            return Err(AppError::InsufficientStock(vec![item_id]));
        }
    }
    Ok(())
}

/// Check every line, then decrement. Nothing is written unless every line fits.
pub async fn reserve_stock<C>(conn: &C, requests: &[StockRequest]) -> AppResult<HashMap<String, ItemModel>>
where
    C: ConnectionTrait,
{
    let snapshot = check_stock(conn, requests).await?;
    apply_decrements(conn, requests).await?;
    Ok(snapshot)
}
