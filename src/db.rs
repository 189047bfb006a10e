use std::time::Duration;

use anyhow::Result;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, SqlxPostgresConnector,
    TransactionTrait,
};
use sqlx::postgres::PgPoolOptions;

pub type DbPool = sqlx::PgPool;
pub type OrmConn = DatabaseConnection;

/// Create the raw sqlx pool used for read models, migrations and audit writes.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Wrap the sqlx pool for SeaORM. Both layers draw from the same connections,
/// so `max_connections` bounds the process as a whole.
pub fn orm_from_pool(pool: &DbPool) -> OrmConn {
    SqlxPostgresConnector::from_sqlx_postgres_pool(pool.clone())
}

/// Apply the SQL files in `migrations/`.
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Begin a transaction whose row-lock waits give up after `lock_timeout`
/// instead of blocking the request indefinitely.
pub async fn begin_locking(
    orm: &OrmConn,
    lock_timeout: Duration,
) -> Result<DatabaseTransaction, sea_orm::DbErr> {
    let txn = orm.begin().await?;
    // SET does not accept bind parameters; the value is an integer we format ourselves.
    txn.execute_unprepared(&format!(
        "SET LOCAL lock_timeout = '{}ms'",
        lock_timeout.as_millis().max(1)
    ))
    .await?;
    Ok(txn)
}
