use std::str::FromStr;

use anyhow::Result;
use sea_orm::{DatabaseConnection, SqlxSqliteConnector};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::time::Duration;

pub type DbPool = SqlitePool;
pub type OrmConn = DatabaseConnection;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Open a SQLite pool. In-memory databases are pinned to a single long-lived
/// connection, otherwise the schema would vanish with the first idle close.
/// File databases use WAL so readers never wait on the writer.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let (options, pool_options) = if is_in_memory(database_url) {
        let pool_options = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
        (options, pool_options)
    } else {
        let options = options.journal_mode(SqliteJournalMode::Wal);
        (options, SqlitePoolOptions::new().max_connections(max_connections))
    };

    let pool = pool_options.connect_with(options).await?;
    Ok(pool)
}

/// Wrap the sqlx pool in a SeaORM connection; both share the same connections.
pub fn create_orm_conn(pool: &DbPool) -> OrmConn {
    SqlxSqliteConnector::from_sqlx_sqlite_pool(pool.clone())
}

pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}
