// src/lib.rs

use axum::{
    routing::{get, post},
    Router,
};
use services::order_service::OrderService;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub orders: OrderService,
}

pub mod entities {
    pub mod prelude;
    pub mod orders;
}

pub mod services {
    pub mod order_store;
    pub mod order_service;
}

pub mod config;
pub mod models;
pub mod handlers;

/// Order ledger routes over an injected service
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/orders", post(handlers::orders::create_order))
        .route("/orders/history", get(handlers::orders::get_history))
        .route("/orders/stats", get(handlers::orders::get_stats))
        .route("/orders/{id}", get(handlers::orders::get_order))
        .route("/orders/{id}/status", post(handlers::orders::update_order_status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
