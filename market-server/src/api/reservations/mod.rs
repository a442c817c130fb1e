//! Reservation API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reservations", reservation_routes())
}

fn reservation_routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/shop", get(handler::list_for_shop))
        .route("/by-mobile/{mobile}", get(handler::list_by_mobile))
        .route("/statistics", get(handler::statistics))
        .route("/expire", post(handler::expire_sweep))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/accept", put(handler::accept))
        .route("/{id}/reject", put(handler::reject))
        .route("/{id}/cancel", put(handler::cancel))
        .route("/{id}/convert", post(handler::convert_to_order))
}
