//! Order ledger models
//!
//! The persisted `Order` value, its status vocabulary, and the plain request
//! and response shapes used at the HTTP boundary.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Free-form order metadata, opaque to the ledger
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Order status vocabulary
///
/// `Requested` is the only initial value. Any status may follow any other;
/// the ledger does not enforce transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order placed, waiting for a train
    Requested,
    /// Drink is on its way
    InProgress,
    /// Drink handed over
    Delivered,
    /// Order abandoned
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Requested,
        OrderStatus::InProgress,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Requested => "requested",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "requested" => Ok(OrderStatus::Requested),
            "in_progress" => Ok(OrderStatus::InProgress),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(format!(
                "Invalid status: '{}'. Must be one of: requested, in_progress, delivered, cancelled",
                s
            )),
        }
    }
}

/// A persisted order
///
/// `id`, `timestamp` and `user_id` never change after creation; only
/// `status` and `metadata` are replaced by an explicit status update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    /// Creation time, UTC
    #[serde(serialize_with = "serialize_utc_z")]
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub status: OrderStatus,
    pub metadata: Metadata,
}

/// RFC 3339 with a literal `Z` instead of `+00:00`
fn serialize_utc_z<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Micros, true))
}

/// Request body for POST /orders
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCreateRequest {
    pub user_id: String,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

/// Request body for POST /orders/{id}/status
///
/// `metadata` replaces the stored map wholesale when present and leaves it
/// untouched when absent.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderUpdateRequest {
    pub status: String,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

/// Query parameters for GET /orders/history
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryQuery {
    /// Maximum number of orders returned (defaults to 100)
    pub limit: Option<u64>,
}

/// Response for GET /orders/history
#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub orders: Vec<Order>,
}

/// Delivered counts for the rolling week and for all time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStats {
    pub weekly_delivered: u64,
    pub all_time_delivered: u64,
}

/// Error body returned by the order endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}
