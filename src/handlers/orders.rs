//! Order ledger handlers
//!
//! POST /orders, GET /orders/{id}, POST /orders/{id}/status,
//! GET /orders/history and GET /orders/stats.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{error, info, warn};

use crate::models::order::{
    HistoryQuery, HistoryResponse, Order, OrderCreateRequest, OrderErrorResponse, OrderStats,
    OrderUpdateRequest,
};
use crate::services::order_store::OrderError;
use crate::AppState;

type ErrorReply = (StatusCode, Json<OrderErrorResponse>);

fn error_reply(status: StatusCode, error: String, code: &str) -> ErrorReply {
    (
        status,
        Json(OrderErrorResponse {
            error,
            code: Some(code.to_string()),
        }),
    )
}

fn map_order_error(err: OrderError) -> ErrorReply {
    match err {
        OrderError::Validation(msg) => error_reply(StatusCode::BAD_REQUEST, msg, "INVALID_STATUS"),
        OrderError::StorageUnavailable(_) | OrderError::CorruptRow(_) => {
            error!(error = %err, "Order ledger failure");
            error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                err.to_string(),
                "STORAGE_UNAVAILABLE",
            )
        }
    }
}

fn not_found(id: i64) -> ErrorReply {
    error_reply(
        StatusCode::NOT_FOUND,
        format!("Order {} not found", id),
        "ORDER_NOT_FOUND",
    )
}

/// POST /orders
///
/// # Response
/// - 201: Created order (status `requested`)
/// - 500: Ledger unavailable
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<OrderCreateRequest>,
) -> Result<(StatusCode, Json<Order>), ErrorReply> {
    info!(user_id = %payload.user_id, "Creating order");

    let order = state
        .orders
        .create_order(&payload.user_id, payload.metadata)
        .await
        .map_err(map_order_error)?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Order>, ErrorReply> {
    match state.orders.get_order(id).await.map_err(map_order_error)? {
        Some(order) => Ok(Json(order)),
        None => Err(not_found(id)),
    }
}

/// POST /orders/{id}/status
///
/// # Response
/// - 200: Updated order
/// - 400: Status outside the vocabulary
/// - 404: Unknown order id
/// - 500: Ledger unavailable
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<OrderUpdateRequest>,
) -> Result<Json<Order>, ErrorReply> {
    let updated = state
        .orders
        .update_status(id, &payload.status, payload.metadata)
        .await
        .map_err(map_order_error)?;

    match updated {
        Some(order) => Ok(Json(order)),
        None => {
            warn!(order_id = id, "Order not found");
            Err(not_found(id))
        }
    }
}

/// GET /orders/history
///
/// # Query Parameters
/// - `limit`: maximum number of orders (default: 100)
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ErrorReply> {
    let orders = state
        .orders
        .get_history(query.limit)
        .await
        .map_err(map_order_error)?;

    Ok(Json(HistoryResponse { orders }))
}

/// GET /orders/stats
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<OrderStats>, ErrorReply> {
    let stats = state.orders.get_stats(None).await.map_err(map_order_error)?;
    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let (status, Json(body)) =
            map_order_error(OrderError::Validation("Invalid status: 'x'".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code.as_deref(), Some("INVALID_STATUS"));
    }

    #[test]
    fn test_storage_failures_map_to_internal_error() {
        for err in [
            OrderError::StorageUnavailable("disk".to_string()),
            OrderError::CorruptRow("order 1".to_string()),
        ] {
            let (status, Json(body)) = map_order_error(err);
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body.code.as_deref(), Some("STORAGE_UNAVAILABLE"));
        }
    }

    #[test]
    fn test_not_found_reply() {
        let (status, Json(body)) = not_found(42);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.error.contains("42"));
    }
}
