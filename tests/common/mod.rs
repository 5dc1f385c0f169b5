#![allow(dead_code)]

use std::path::PathBuf;

use otaku_valley_api::{
    config::AdminCredentials,
    db::{create_pool, run_migrations},
    dto::orders::{CreateOrderRequest, OrderLineRequest},
    seed::seed_sample_data,
    state::AppState,
};

/// Fresh in-memory database with migrations applied and nothing else.
pub async fn empty_state() -> anyhow::Result<AppState> {
    let pool = create_pool("sqlite::memory:", 1).await?;
    run_migrations(&pool).await?;
    Ok(AppState::new(pool, AdminCredentials::default()))
}

/// In-memory database holding the sample catalogue (id1 = 50, id2 = 100, id3 = 30, ...)
/// and the three sample orders.
pub async fn seeded_state() -> anyhow::Result<AppState> {
    let state = empty_state().await?;
    seed_sample_data(&state).await?;
    Ok(state)
}

/// Seeded database in a temporary file behind a multi-connection pool, the
/// way the server runs. Files are removed on drop.
pub struct FileDb {
    pub state: AppState,
    path: PathBuf,
}

impl FileDb {
    pub async fn seeded(max_connections: u32) -> anyhow::Result<Self> {
        let path = std::env::temp_dir().join(format!("otaku-valley-{}.db", uuid::Uuid::new_v4()));
        let pool = create_pool(&format!("sqlite://{}", path.display()), max_connections).await?;
        run_migrations(&pool).await?;
        let state = AppState::new(pool, AdminCredentials::default());
        seed_sample_data(&state).await?;
        Ok(Self { state, path })
    }
}

impl Drop for FileDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut path = self.path.clone().into_os_string();
            path.push(suffix);
            let _ = std::fs::remove_file(path);
        }
    }
}

pub fn line(item_id: &str, qty: i32) -> OrderLineRequest {
    OrderLineRequest {
        item_id: item_id.to_string(),
        qty,
        sale_price: None,
    }
}

pub fn order_request(customer: &str, lines: Vec<OrderLineRequest>) -> CreateOrderRequest {
    CreateOrderRequest {
        customer: Some(customer.to_string()),
        items: lines,
        ..Default::default()
    }
}
