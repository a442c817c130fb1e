//! Server Implementation
//!
//! 路由拼装 + HTTP 服务器启动

use std::time::Instant;

use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

use crate::auth::require_auth;
use crate::core::{Config, ServerState};

/// HTTP 访问日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        target: "http_access",
        "{} {} {} {}ms",
        method,
        uri,
        response.status(),
        started.elapsed().as_millis()
    );

    response
}

/// 拼装全部 API 路由 (未绑定 state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        // Core APIs
        .merge(crate::api::health::router())
        .merge(crate::api::auth::router())
        // Data model APIs
        .merge(crate::api::buyers::router())
        .merge(crate::api::suppliers::router())
        .merge(crate::api::products::router())
        .merge(crate::api::orders::router())
        .merge(crate::api::reservations::router())
        .merge(crate::api::payments::router())
        .merge(crate::api::notifications::router())
        .merge(crate::api::ratings::router())
}

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// 使用已初始化的 state 构造
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let state = match &self.state {
            Some(existing) => existing.clone(),
            None => ServerState::initialize(&self.config).await,
        };

        // require_auth 挂在 Router 级别，内部跳过公共路由
        let app = build_app()
            .layer(middleware::from_fn_with_state(state.clone(), require_auth))
            .with_state(state)
            .layer(CorsLayer::permissive())
            .layer(CompressionLayer::new())
            .layer(middleware::from_fn(log_request));

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        tracing::info!("Market Server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
            })
            .await?;

        Ok(())
    }
}
