//! Buyer API 模块

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/buyers", buyer_routes())
}

fn buyer_routes() -> Router<ServerState> {
    Router::new().route("/{id}", get(handler::get_by_id).put(handler::update))
}
