use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use kitt_orders::services::{order_service::OrderService, order_store::encode_timestamp};
use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, SqlxSqliteConnector, Statement, Value,
};
use tempfile::TempDir;

/// Throwaway ledger on a temp file; the directory lives as long as this value
pub struct TestLedger {
    pub service: OrderService,
    #[allow(dead_code)]
    pub db_path: PathBuf,
    _dir: TempDir,
}

/// Set up a fresh ledger in its own temp directory
pub async fn setup_test_ledger() -> TestLedger {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("orders.db");
    let service = OrderService::open(db_path.clone())
        .await
        .expect("Failed to open test ledger");

    TestLedger {
        service,
        db_path,
        _dir: dir,
    }
}

/// Separate raw connection, for reaching under the store in tests
#[allow(dead_code)]
pub async fn raw_connection(db_path: &Path) -> DatabaseConnection {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to open raw connection");
    SqlxSqliteConnector::from_sqlx_sqlite_pool(pool)
}

#[allow(dead_code)]
async fn execute(db_path: &Path, sql: &str, values: Vec<Value>) {
    let db = raw_connection(db_path).await;
    db.execute(Statement::from_sql_and_values(DbBackend::Sqlite, sql, values))
        .await
        .expect("Raw statement failed");
}

/// Overwrite the stored creation time of an order
#[allow(dead_code)]
pub async fn force_timestamp(db_path: &Path, order_id: i64, timestamp: DateTime<Utc>) {
    execute(
        db_path,
        "UPDATE orders SET timestamp = ? WHERE id = ?",
        vec![Value::from(encode_timestamp(timestamp)), Value::from(order_id)],
    )
    .await;
}

/// Overwrite the stored metadata blob of an order with arbitrary text
#[allow(dead_code)]
pub async fn force_metadata_blob(db_path: &Path, order_id: i64, raw: &str) {
    execute(
        db_path,
        "UPDATE orders SET metadata = ? WHERE id = ?",
        vec![Value::from(raw), Value::from(order_id)],
    )
    .await;
}

/// Insert a row exactly as given, bypassing the store
#[allow(dead_code)]
pub async fn insert_raw_order(
    db_path: &Path,
    id: i64,
    timestamp: &str,
    user_id: &str,
    status: &str,
    metadata: &str,
) {
    execute(
        db_path,
        "INSERT INTO orders (id, timestamp, user_id, status, metadata) VALUES (?, ?, ?, ?, ?)",
        vec![
            Value::from(id),
            Value::from(timestamp),
            Value::from(user_id),
            Value::from(status),
            Value::from(metadata),
        ],
    )
    .await;
}

/// Create a ledger file the way the earlier deployment did, before any migration ran
#[allow(dead_code)]
pub async fn create_legacy_ledger(db_path: &Path) {
    let db = raw_connection(db_path).await;
    for sql in [
        "CREATE TABLE IF NOT EXISTS orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            user_id TEXT NOT NULL,
            status TEXT NOT NULL,
            metadata TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status)",
        "CREATE INDEX IF NOT EXISTS idx_orders_timestamp ON orders(timestamp)",
    ] {
        db.execute_unprepared(sql)
            .await
            .expect("Failed to create legacy schema");
    }
}

/// Stored timestamp text of an order, exactly as it sits in the ledger
#[allow(dead_code)]
pub async fn stored_timestamp(db_path: &Path, order_id: i64) -> String {
    let db = raw_connection(db_path).await;
    let row = db
        .query_one(Statement::from_sql_and_values(
            DbBackend::Sqlite,
            "SELECT timestamp FROM orders WHERE id = ?",
            vec![Value::from(order_id)],
        ))
        .await
        .expect("Raw query failed")
        .expect("Order row missing");
    row.try_get::<String>("", "timestamp")
        .expect("timestamp column missing")
}
