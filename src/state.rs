use crate::{
    config::AdminCredentials,
    db::{DbPool, OrmConn, create_orm_conn},
    services::stock_ledger::StockLedger,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub ledger: StockLedger,
    pub admin: AdminCredentials,
}

impl AppState {
    pub fn new(pool: DbPool, admin: AdminCredentials) -> Self {
        let orm = create_orm_conn(&pool);
        Self {
            pool,
            orm,
            ledger: StockLedger::new(),
            admin,
        }
    }
}
