//! Product API 模块

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products", product_routes())
}

fn product_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/bulk-price", put(handler::bulk_update_prices))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/price-history", get(handler::price_history))
        .route("/{id}/price-trends", get(handler::price_trends))
        .route("/user/{user_id}", get(handler::list_by_owner))
}
