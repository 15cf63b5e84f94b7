//! Order Store
//!
//! SQLite-backed ledger of orders. Owns the schema (through the migration
//! crate), every query against the `orders` table, and the mapping between
//! stored rows and `Order` values.
//!
//! Each operation runs against the shared connection pool and holds a
//! connection only for its own statements; status updates run their read
//! and write inside a single transaction.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use migration::Migrator;
use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlxSqliteConnector, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info, warn};

use crate::entities::{orders, prelude::Orders};
use crate::models::order::{Metadata, Order, OrderStatus};

/// Stored timestamp layout: fixed width so text comparison is chronological
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f+00:00";

/// Largest page the SQLite driver can bind; larger limits mean "everything"
const MAX_LIMIT: u64 = i64::MAX as u64;

/// Error types for the order ledger
#[derive(Debug, Clone, PartialEq)]
pub enum OrderError {
    /// Status outside the fixed vocabulary
    Validation(String),
    /// The ledger file could not be opened, read or written
    StorageUnavailable(String),
    /// A stored row could not be mapped back to an order
    CorruptRow(String),
}

impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderError::Validation(msg) => write!(f, "Validation error: {}", msg),
            OrderError::StorageUnavailable(msg) => write!(f, "Storage unavailable: {}", msg),
            OrderError::CorruptRow(msg) => write!(f, "Corrupt order row: {}", msg),
        }
    }
}

impl std::error::Error for OrderError {}

/// Order Store
#[derive(Clone)]
pub struct OrderStore {
    db: DatabaseConnection,
    db_path: PathBuf,
}

impl OrderStore {
    /// Open (or create) the ledger at `db_path`
    ///
    /// Creates the parent directory when missing and brings the schema up to
    /// date. Safe to call against an existing ledger file.
    pub async fn connect(db_path: impl Into<PathBuf>) -> Result<Self, OrderError> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                OrderError::StorageUnavailable(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        // Options take the path verbatim; a URL would treat `?` and `#` as syntax
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| {
                OrderError::StorageUnavailable(format!(
                    "Failed to open {}: {}",
                    db_path.display(),
                    e
                ))
            })?;
        let db = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);

        Migrator::up(&db, None)
            .await
            .map_err(|e| OrderError::StorageUnavailable(format!("Migration failed: {}", e)))?;

        info!(db_path = %db_path.display(), "Order store ready");

        Ok(Self { db, db_path })
    }

    /// Path of the SQLite ledger file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Insert a new order with status `requested` and the current UTC time
    ///
    /// The returned order is built from the stored row, so it carries the
    /// assigned id and the timestamp exactly as persisted.
    pub async fn create_order(
        &self,
        user_id: &str,
        metadata: &Metadata,
    ) -> Result<Order, OrderError> {
        let record = orders::ActiveModel {
            timestamp: Set(encode_timestamp(Utc::now())),
            user_id: Set(user_id.to_string()),
            status: Set(OrderStatus::Requested.to_string()),
            metadata: Set(encode_metadata(metadata)?),
            ..Default::default()
        };

        let model = record
            .insert(&self.db)
            .await
            .map_err(|e| OrderError::StorageUnavailable(format!("Insert failed: {}", e)))?;

        let order = model_to_order(model)?;
        info!(order_id = order.id, user_id = %order.user_id, "Order created");
        Ok(order)
    }

    /// Point lookup by id; `None` when no such order exists
    pub async fn get_order(&self, id: i64) -> Result<Option<Order>, OrderError> {
        let model = Orders::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| OrderError::StorageUnavailable(format!("Query failed: {}", e)))?;

        debug!(order_id = id, found = model.is_some(), "Order lookup");
        model.map(model_to_order).transpose()
    }

    /// Set the status of an order, optionally replacing its metadata
    ///
    /// Returns `None` without writing anything when the order does not exist.
    /// Metadata is replaced wholesale when `metadata` is `Some` and kept as
    /// stored otherwise.
    pub async fn update_order_status(
        &self,
        id: i64,
        status: OrderStatus,
        metadata: Option<&Metadata>,
    ) -> Result<Option<Order>, OrderError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| OrderError::StorageUnavailable(format!("Begin failed: {}", e)))?;

        let existing = Orders::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| OrderError::StorageUnavailable(format!("Query failed: {}", e)))?;

        // Dropping the transaction rolls it back
        let Some(existing) = existing else {
            warn!(order_id = id, status = %status, "Status update for unknown order");
            return Ok(None);
        };

        let mut record: orders::ActiveModel = existing.into();
        record.status = Set(status.to_string());
        if let Some(metadata) = metadata {
            record.metadata = Set(encode_metadata(metadata)?);
        }

        let updated = record
            .update(&txn)
            .await
            .map_err(|e| OrderError::StorageUnavailable(format!("Update failed: {}", e)))?;

        txn.commit()
            .await
            .map_err(|e| OrderError::StorageUnavailable(format!("Commit failed: {}", e)))?;

        info!(
            order_id = id,
            status = %status,
            metadata_replaced = metadata.is_some(),
            "Order status updated"
        );
        model_to_order(updated).map(Some)
    }

    /// Most recent orders first, at most `limit` of them
    ///
    /// Orders sharing a timestamp come back newest id first. Limits beyond
    /// `i64::MAX` are clamped, which still covers every row.
    pub async fn list_orders(&self, limit: u64) -> Result<Vec<Order>, OrderError> {
        let models = Orders::find()
            .order_by_desc(orders::Column::Timestamp)
            .order_by_desc(orders::Column::Id)
            .limit(limit.min(MAX_LIMIT))
            .all(&self.db)
            .await
            .map_err(|e| OrderError::StorageUnavailable(format!("Query failed: {}", e)))?;

        debug!(limit = limit, count = models.len(), "Listed orders");
        models.into_iter().map(model_to_order).collect()
    }

    /// Delivered orders, all time
    pub async fn delivered_count(&self) -> Result<u64, OrderError> {
        Orders::find()
            .filter(orders::Column::Status.eq(OrderStatus::Delivered.as_str()))
            .count(&self.db)
            .await
            .map_err(|e| OrderError::StorageUnavailable(format!("Count failed: {}", e)))
    }

    /// Delivered orders created at or after `threshold`
    ///
    /// Compares stored text against the fixed-width encoding. Rows adopted
    /// from older ledgers without fractional seconds are padded by the
    /// timestamp normalisation migration, so the boundary stays inclusive.
    pub async fn delivered_count_since(&self, threshold: DateTime<Utc>) -> Result<u64, OrderError> {
        Orders::find()
            .filter(orders::Column::Status.eq(OrderStatus::Delivered.as_str()))
            .filter(orders::Column::Timestamp.gte(encode_timestamp(threshold)))
            .count(&self.db)
            .await
            .map_err(|e| OrderError::StorageUnavailable(format!("Count failed: {}", e)))
    }
}

/// Stored text form of a UTC timestamp (microsecond precision)
pub fn encode_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp; any RFC 3339 offset is accepted and normalised to UTC
pub fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| format!("invalid timestamp '{}': {}", raw, e))
}

fn encode_metadata(metadata: &Metadata) -> Result<String, OrderError> {
    serde_json::to_string(metadata)
        .map_err(|e| OrderError::StorageUnavailable(format!("Failed to encode metadata: {}", e)))
}

/// Decode a stored metadata blob
///
/// Empty, unparsable or non-object blobs decode to an empty map so a single
/// bad row never blocks listing or counting.
pub fn decode_metadata(order_id: i64, raw: &str) -> Metadata {
    if raw.trim().is_empty() {
        return Metadata::new();
    }

    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(map)) => map,
        Ok(other) => {
            warn!(order_id = order_id, kind = %json_kind(&other), "Stored metadata is not an object, using empty map");
            Metadata::new()
        }
        Err(e) => {
            warn!(order_id = order_id, error = %e, "Stored metadata is not valid JSON, using empty map");
            Metadata::new()
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn model_to_order(model: orders::Model) -> Result<Order, OrderError> {
    let timestamp = decode_timestamp(&model.timestamp)
        .map_err(|e| OrderError::CorruptRow(format!("order {}: {}", model.id, e)))?;
    let status = model
        .status
        .parse::<OrderStatus>()
        .map_err(|e| OrderError::CorruptRow(format!("order {}: {}", model.id, e)))?;
    let metadata = decode_metadata(model.id, &model.metadata);

    Ok(Order {
        id: model.id,
        timestamp,
        user_id: model.user_id,
        status,
        metadata,
    })
}
