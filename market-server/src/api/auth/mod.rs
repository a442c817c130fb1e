//! Auth API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", auth_routes())
}

fn auth_routes() -> Router<ServerState> {
    Router::new()
        .route("/buyer/register", post(handler::register_buyer))
        .route("/buyer/login", post(handler::login_buyer))
        .route("/supplier/register", post(handler::register_supplier))
        .route("/supplier/login", post(handler::login_supplier))
        .route("/me", get(handler::me))
}
