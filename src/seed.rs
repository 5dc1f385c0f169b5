use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};

use crate::{
    entity::{
        items::{ActiveModel as ItemActive, Entity as Items},
        order_items::ActiveModel as OrderItemActive,
        orders::{ActiveModel as OrderActive, Entity as Orders},
    },
    error::AppResult,
    services::stock_ledger,
    state::AppState,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub items: usize,
    pub orders: usize,
}

struct SampleItem {
    id: &'static str,
    sku: &'static str,
    name: &'static str,
    category: &'static str,
    quantity: i32,
    reorder_level: i32,
    cost_price: f64,
    sale_price: f64,
    description: &'static str,
}

static SAMPLE_ITEMS: [SampleItem; 5] = [
    SampleItem {
        id: "id1",
        sku: "OV-FG-001",
        name: "Naruto Figure",
        category: "Figure",
        quantity: 50,
        reorder_level: 10,
        cost_price: 500.0,
        sale_price: 800.0,
        description: "Collectible Naruto action figure",
    },
    SampleItem {
        id: "id2",
        sku: "OV-MG-002",
        name: "One Piece Manga Vol. 1",
        category: "Manga",
        quantity: 100,
        reorder_level: 20,
        cost_price: 200.0,
        sale_price: 350.0,
        description: "First volume of One Piece manga",
    },
    SampleItem {
        id: "id3",
        sku: "OV-AP-003",
        name: "Attack on Titan T-Shirt",
        category: "Apparel",
        quantity: 30,
        reorder_level: 5,
        cost_price: 300.0,
        sale_price: 600.0,
        description: "Cotton T-shirt with AOT design",
    },
    SampleItem {
        id: "id4",
        sku: "OV-FG-004",
        name: "Dragon Ball Goku Figure",
        category: "Figure",
        quantity: 40,
        reorder_level: 8,
        cost_price: 450.0,
        sale_price: 750.0,
        description: "Super Saiyan Goku collectible",
    },
    SampleItem {
        id: "id5",
        sku: "OV-MG-005",
        name: "Death Note Manga Set",
        category: "Manga",
        quantity: 25,
        reorder_level: 5,
        cost_price: 1500.0,
        sale_price: 2500.0,
        description: "Complete Death Note manga series",
    },
];

type SampleOrder = (
    &'static str,
    &'static str,
    &'static str,
    f64,
    &'static str,
    &'static [(&'static str, i32, f64)],
);

static SAMPLE_ORDERS: [SampleOrder; 3] = [
    (
        "ORDABC123",
        "2023-10-01",
        "John Doe",
        1150.0,
        "Delivered",
        &[("id1", 1, 800.0), ("id2", 1, 350.0)],
    ),
    ("ORDDEF456", "2023-10-02", "Jane Smith", 350.0, "Pending", &[("id2", 1, 350.0)]),
    ("ORDGHI789", "2023-10-03", "Walk-in", 600.0, "Delivered", &[("id3", 1, 600.0)]),
];

/// Insert the sample catalogue and historical orders into empty tables.
/// Historical orders do not consume stock. Tables that already hold rows are left alone.
pub async fn seed_sample_data(state: &AppState) -> AppResult<SeedReport> {
    let mut report = SeedReport::default();
    let txn = stock_ledger::begin_write(&state.orm).await?;

    if Items::find().count(&txn).await? == 0 {
        for sample in &SAMPLE_ITEMS {
            ItemActive {
                id: Set(sample.id.to_string()),
                sku: Set(Some(sample.sku.to_string())),
                name: Set(sample.name.to_string()),
                category: Set(Some(sample.category.to_string())),
                quantity: Set(sample.quantity),
                reorder_level: Set(sample.reorder_level),
                cost_price: Set(sample.cost_price),
                sale_price: Set(sample.sale_price),
                description: Set(Some(sample.description.to_string())),
            }
            .insert(&txn)
            .await?;
            report.items += 1;
        }
    }

    let mut have_all_items = true;
    'check: for (.., lines) in SAMPLE_ORDERS.iter() {
        for (item_id, ..) in lines.iter() {
            if Items::find_by_id(item_id.to_string()).one(&txn).await?.is_none() {
                have_all_items = false;
                break 'check;
            }
        }
    }

    if have_all_items && Orders::find().count(&txn).await? == 0 {
        for (id, date, customer, total, status, lines) in SAMPLE_ORDERS.iter() {
            OrderActive {
                id: Set(id.to_string()),
                date: Set(date.to_string()),
                customer: Set(customer.to_string()),
                ticket_number: Set(None),
                billing_address: Set(None),
                phone_number: Set(None),
                tags: Set(None),
                total: Set(*total),
                status: Set(status.to_string()),
            }
            .insert(&txn)
            .await?;

            for (item_id, qty, sale_price) in lines.iter() {
                OrderItemActive {
                    id: NotSet,
                    order_id: Set(id.to_string()),
                    item_id: Set(item_id.to_string()),
                    qty: Set(*qty),
                    sale_price: Set(*sale_price),
                }
                .insert(&txn)
                .await?;
            }
            report.orders += 1;
        }
    }

    txn.commit().await?;

    if report != SeedReport::default() {
        tracing::info!(items = report.items, orders = report.orders, "sample data inserted");
    }
    Ok(report)
}
