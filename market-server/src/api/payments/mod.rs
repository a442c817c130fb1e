//! Payment API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payments", payment_routes())
}

fn payment_routes() -> Router<ServerState> {
    Router::new()
        .route("/intent", post(handler::create_intent))
        .route("/confirm", post(handler::confirm))
        .route("/history", get(handler::history))
        // webhook 不走 JWT，由签名验证保护
        .route("/webhook", post(handler::webhook))
        .route("/{order_id}/refund", post(handler::refund))
}
