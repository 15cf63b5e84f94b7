//! Order Service
//!
//! Request-level rules on top of the Order Store: status validation,
//! metadata defaults, history page size, and delivered-order statistics over
//! a rolling week. Holds no state of its own beyond the store handle.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::models::order::{Metadata, Order, OrderStats, OrderStatus};
use crate::services::order_store::{OrderError, OrderStore};

/// Page size used when history is requested without a limit
pub const DEFAULT_HISTORY_LIMIT: u64 = 100;

/// Length of the rolling window for weekly statistics
pub const ROLLING_WINDOW_DAYS: i64 = 7;

/// Start of the rolling week ending at `now`
pub fn rolling_week_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(ROLLING_WINDOW_DAYS)
}

/// Order Service
#[derive(Clone)]
pub struct OrderService {
    store: OrderStore,
}

impl OrderService {
    pub fn new(store: OrderStore) -> Self {
        Self { store }
    }

    /// Open the ledger at `db_path` and wrap it in a service
    pub async fn open(db_path: impl Into<PathBuf>) -> Result<Self, OrderError> {
        Ok(Self::new(OrderStore::connect(db_path).await?))
    }

    /// Path of the underlying SQLite ledger
    pub fn db_path(&self) -> &Path {
        self.store.db_path()
    }

    /// Create an order in `requested` state
    ///
    /// Any `user_id` is accepted, including an empty one. Missing metadata
    /// is stored as an empty map.
    pub async fn create_order(
        &self,
        user_id: &str,
        metadata: Option<Metadata>,
    ) -> Result<Order, OrderError> {
        let metadata = metadata.unwrap_or_default();
        self.store.create_order(user_id, &metadata).await
    }

    pub async fn get_order(&self, id: i64) -> Result<Option<Order>, OrderError> {
        self.store.get_order(id).await
    }

    /// Move an order to `status`, optionally replacing its metadata
    ///
    /// An unknown status fails with `OrderError::Validation` before the store
    /// is touched. An unknown order id yields `Ok(None)`.
    pub async fn update_status(
        &self,
        id: i64,
        status: &str,
        metadata: Option<Metadata>,
    ) -> Result<Option<Order>, OrderError> {
        let status = status.parse::<OrderStatus>().map_err(|e| {
            warn!(order_id = id, error = %e, "Rejected status update");
            OrderError::Validation(e)
        })?;

        self.store
            .update_order_status(id, status, metadata.as_ref())
            .await
    }

    /// Most recent orders, newest first
    pub async fn get_history(&self, limit: Option<u64>) -> Result<Vec<Order>, OrderError> {
        self.store
            .list_orders(limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
            .await
    }

    /// Delivered counts for the week ending at `now` (default: current time) and all time
    pub async fn get_stats(&self, now: Option<DateTime<Utc>>) -> Result<OrderStats, OrderError> {
        let now = now.unwrap_or_else(Utc::now);
        let week_start = rolling_week_start(now);

        let weekly_delivered = self.store.delivered_count_since(week_start).await?;
        let all_time_delivered = self.store.delivered_count().await?;

        debug!(
            week_start = %week_start,
            weekly_delivered = weekly_delivered,
            all_time_delivered = all_time_delivered,
            "Computed order stats"
        );

        Ok(OrderStats {
            weekly_delivered,
            all_time_delivered,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_rolling_week_start() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 8, 0, 0).unwrap();
        let start = rolling_week_start(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 8, 8, 0, 0).unwrap());
        assert_eq!((now - start).num_days(), ROLLING_WINDOW_DAYS);
    }

    #[test]
    fn test_default_history_limit() {
        assert_eq!(DEFAULT_HISTORY_LIMIT, 100);
    }
}
