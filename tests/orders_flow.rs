mod common;

use common::{line, order_request, seeded_state};
use otaku_valley_api::{
    dto::orders::{CreateOrderRequest, OrderLineRequest, UpdateOrderRequest},
    entity::{OrderItems, Orders},
    error::AppError,
    models::OrderStatus,
    services::{
        item_service, order_service,
        stock_ledger::{self, StockRequest},
    },
};
use sea_orm::{EntityTrait, PaginatorTrait};

async fn quantity_of(state: &otaku_valley_api::state::AppState, id: &str) -> anyhow::Result<i32> {
    Ok(item_service::get_item(state, id).await?.quantity)
}

#[tokio::test]
async fn order_consumes_stock_and_links_line_item() -> anyhow::Result<()> {
    let state = seeded_state().await?;
    assert_eq!(quantity_of(&state, "id1").await?, 50);

    let order = order_service::create_order(&state, order_request("Alice", vec![line("id1", 10)]))
        .await?;

    assert_eq!(quantity_of(&state, "id1").await?, 40);
    let lines = order_service::list_line_items(&state.orm, &order.id).await?;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].item_id, "id1");
    assert_eq!(lines[0].qty, 10);
    // price defaults to the item's sale price at order time
    assert_eq!(lines[0].sale_price, 800.0);
    assert_eq!(order.total, 8000.0);
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(order.id.starts_with("ORD"));
    Ok(())
}

#[tokio::test]
async fn insufficient_stock_rejects_without_writes() -> anyhow::Result<()> {
    let state = seeded_state().await?;
    let orders_before = Orders::find().count(&state.orm).await?;
    let lines_before = OrderItems::find().count(&state.orm).await?;

    let err = order_service::create_order(&state, order_request("Bob", vec![line("id3", 40)]))
        .await
        .unwrap_err();

    match err {
        AppError::InsufficientStock(ids) => assert_eq!(ids, vec!["id3".to_string()]),
        other => panic!("expected insufficient stock, got {other:?}"),
    }
    assert_eq!(quantity_of(&state, "id3").await?, 30);
    assert_eq!(Orders::find().count(&state.orm).await?, orders_before);
    assert_eq!(OrderItems::find().count(&state.orm).await?, lines_before);
    Ok(())
}

#[tokio::test]
async fn one_short_line_blocks_the_whole_batch() -> anyhow::Result<()> {
    let state = seeded_state().await?;
    let orders_before = Orders::find().count(&state.orm).await?;

    let err = order_service::create_order(
        &state,
        order_request("Carol", vec![line("id1", 5), line("id3", 31), line("id2", 1)]),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::InsufficientStock(ref ids) if ids == &vec!["id3".to_string()]));
    assert_eq!(quantity_of(&state, "id1").await?, 50);
    assert_eq!(quantity_of(&state, "id2").await?, 100);
    assert_eq!(quantity_of(&state, "id3").await?, 30);
    assert_eq!(Orders::find().count(&state.orm).await?, orders_before);
    Ok(())
}

#[tokio::test]
async fn repeated_lines_are_checked_against_combined_demand() -> anyhow::Result<()> {
    let state = seeded_state().await?;

    let err = order_service::create_order(
        &state,
        order_request("Dan", vec![line("id3", 20), line("id3", 20)]),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock(_)));
    assert_eq!(quantity_of(&state, "id3").await?, 30);

    let order = order_service::create_order(
        &state,
        order_request("Dan", vec![line("id3", 10), line("id3", 20)]),
    )
    .await?;
    assert_eq!(order.items.len(), 2);
    assert_eq!(quantity_of(&state, "id3").await?, 0);
    Ok(())
}

#[tokio::test]
async fn quantity_never_goes_negative() -> anyhow::Result<()> {
    let state = seeded_state().await?;

    let mut accepted = 0;
    for _ in 0..10 {
        match order_service::create_order(&state, order_request("Eve", vec![line("id5", 7)])).await
        {
            Ok(_) => accepted += 1,
            Err(AppError::InsufficientStock(_)) => {}
            Err(other) => return Err(other.into()),
        }
        for item in item_service::list_items(&state).await? {
            assert!(item.quantity >= 0, "{} went negative", item.id);
        }
    }

    // 25 on hand, 7 per order
    assert_eq!(accepted, 3);
    assert_eq!(quantity_of(&state, "id5").await?, 4);
    Ok(())
}

#[tokio::test]
async fn concurrent_orders_cannot_oversell() -> anyhow::Result<()> {
    let state = seeded_state().await?;

    let (a, b) = tokio::join!(
        order_service::create_order(&state, order_request("First", vec![line("id3", 20)])),
        order_service::create_order(&state, order_request("Second", vec![line("id3", 20)])),
    );

    assert_eq!(
        [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(),
        1,
        "exactly one of two 20-unit orders fits into 30 units"
    );
    assert_eq!(quantity_of(&state, "id3").await?, 10);
    Ok(())
}

#[tokio::test]
async fn unknown_item_and_empty_order_are_validation_failures() -> anyhow::Result<()> {
    let state = seeded_state().await?;

    let err = order_service::create_order(&state, order_request("Fay", vec![line("ghost", 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(ref msg) if msg.contains("ghost")));

    let err = order_service::create_order(&state, order_request("Fay", vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = order_service::create_order(
        &state,
        CreateOrderRequest {
            items: vec![line("id1", 1)],
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(ref msg) if msg.contains("customer")));
    assert_eq!(quantity_of(&state, "id1").await?, 50);
    Ok(())
}

#[tokio::test]
async fn duplicate_order_id_is_rejected_and_stock_untouched() -> anyhow::Result<()> {
    let state = seeded_state().await?;

    let err = order_service::create_order(
        &state,
        CreateOrderRequest {
            id: Some("ORDABC123".into()),
            ..order_request("Gus", vec![line("id1", 1)])
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(quantity_of(&state, "id1").await?, 50);
    Ok(())
}

#[tokio::test]
async fn explicit_prices_and_total_are_kept() -> anyhow::Result<()> {
    let state = seeded_state().await?;

    let order = order_service::create_order(
        &state,
        CreateOrderRequest {
            id: Some("ORDCUSTOM".into()),
            date: Some("2024-02-14".into()),
            total: Some(1000.0),
            ticket_number: Some("T-42".into()),
            items: vec![OrderLineRequest {
                item_id: "id4".into(),
                qty: 2,
                sale_price: Some(500.0),
            }],
            ..order_request("Hana", vec![])
        },
    )
    .await?;

    assert_eq!(order.id, "ORDCUSTOM");
    assert_eq!(order.date, "2024-02-14");
    assert_eq!(order.total, 1000.0);
    assert_eq!(order.ticket_number.as_deref(), Some("T-42"));
    assert_eq!(order.items[0].sale_price, 500.0);
    assert_eq!(quantity_of(&state, "id4").await?, 38);
    Ok(())
}

#[tokio::test]
async fn status_only_update_leaves_other_fields() -> anyhow::Result<()> {
    let state = seeded_state().await?;
    let before = order_service::get_order(&state, "ORDDEF456").await?;
    assert_eq!(before.status, OrderStatus::Pending);

    let after = order_service::update_order(
        &state,
        "ORDDEF456",
        UpdateOrderRequest {
            status: Some(OrderStatus::Delivered),
            ..Default::default()
        },
    )
    .await?;

    assert_eq!(after.status, OrderStatus::Delivered);
    assert_eq!(after.date, before.date);
    assert_eq!(after.customer, before.customer);
    assert_eq!(after.total, before.total);
    assert_eq!(after.items, before.items);
    Ok(())
}

#[tokio::test]
async fn update_rejects_empty_patch_and_unknown_order() -> anyhow::Result<()> {
    let state = seeded_state().await?;

    let err = order_service::update_order(&state, "ORDDEF456", UpdateOrderRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = order_service::update_order(
        &state,
        "ORDNOPE00",
        UpdateOrderRequest {
            status: Some(OrderStatus::Shipped),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn delete_removes_line_items_then_order() -> anyhow::Result<()> {
    let state = seeded_state().await?;
    assert_eq!(
        order_service::list_line_items(&state.orm, "ORDABC123").await?.len(),
        2
    );

    order_service::delete_order(&state, "ORDABC123").await?;

    assert!(order_service::list_line_items(&state.orm, "ORDABC123").await?.is_empty());
    let err = order_service::get_order(&state, "ORDABC123").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = order_service::delete_order(&state, "ORDABC123").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn listing_nests_line_items_in_insertion_order() -> anyhow::Result<()> {
    let state = seeded_state().await?;
    let created = order_service::create_order(
        &state,
        order_request("Ivy", vec![line("id2", 2), line("id5", 1)]),
    )
    .await?;

    let orders = order_service::list_orders(&state).await?;
    let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, vec!["ORDABC123", "ORDDEF456", "ORDGHI789", created.id.as_str()]);

    let first = &orders[0];
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.items[0].item_id, "id1");
    assert_eq!(first.items[1].item_id, "id2");

    let last = orders.last().unwrap();
    assert_eq!(last.items.len(), 2);
    assert_eq!(last.total, 2.0 * 350.0 + 2500.0);
    Ok(())
}

#[tokio::test]
async fn standalone_reservation_is_all_or_nothing() -> anyhow::Result<()> {
    let state = seeded_state().await?;

    let err = state
        .ledger
        .reserve(
            &state.orm,
            &[StockRequest::new("id1", 1), StockRequest::new("id5", 26)],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock(_)));
    assert_eq!(quantity_of(&state, "id1").await?, 50);

    let snapshot = state
        .ledger
        .reserve(
            &state.orm,
            &[StockRequest::new("id1", 1), StockRequest::new("id5", 25)],
        )
        .await?;
    assert_eq!(snapshot["id5"].quantity, 25);
    assert_eq!(quantity_of(&state, "id1").await?, 49);
    assert_eq!(quantity_of(&state, "id5").await?, 0);

    // the guarded decrement refuses to go below zero even without a prior check
    let err = stock_ledger::apply_decrements(&state.orm, &[StockRequest::new("id5", 1)])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock(_)));
    assert_eq!(quantity_of(&state, "id5").await?, 0);
    Ok(())
}

#[tokio::test]
async fn order_dates_must_be_iso_calendar_days() -> anyhow::Result<()> {
    let state = seeded_state().await?;

    let err = order_service::create_order(
        &state,
        CreateOrderRequest {
            date: Some("14/02/2024".into()),
            ..order_request("Jo", vec![line("id1", 1)])
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(ref msg) if msg.contains("YYYY-MM-DD")));
    assert_eq!(quantity_of(&state, "id1").await?, 50);

    let err = order_service::update_order(
        &state,
        "ORDDEF456",
        UpdateOrderRequest {
            date: Some("2024-13-01".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let updated = order_service::update_order(
        &state,
        "ORDDEF456",
        UpdateOrderRequest {
            date: Some(" 2024-03-01 ".into()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(updated.date, "2024-03-01");
    Ok(())
}
