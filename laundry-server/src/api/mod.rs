//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`orders`] - 订单评估、商户操作、签收、单次订单
//! - [`commands`] - 订阅批次生成
//! - [`subscriptions`] - 订阅有效期报价
//!
//! 调用方身份来自 `X-Merchant-Id` / `X-User-Id` 请求头 (见 [`extractor`])。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use axum::Router;
use http::{HeaderName, HeaderValue, StatusCode};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;
use crate::db::LaundryStore;

pub mod commands;
pub mod extractor;
pub mod health;
pub mod orders;
pub mod subscriptions;

#[cfg(test)]
mod tests;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// 并发限制
const MAX_CONCURRENT_REQUESTS: usize = 256;

/// Sequential request ID generator
#[derive(Clone, Default)]
struct XRequestId {
    next: Arc<AtomicU64>,
}

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        Some(RequestId::new(HeaderValue::from(id)))
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router<S: LaundryStore>() -> Router<ServerState<S>> {
    Router::new()
        .merge(orders::router())
        .merge(commands::router())
        .merge(subscriptions::router())
        // Health API - public route
        .merge(health::router())
}

/// Build a fully configured application with all middleware and state
pub fn build_app<S: LaundryStore>(state: ServerState<S>) -> Router {
    let timeout = Duration::from_millis(state.config.request_timeout_ms);

    build_router()
        .layer(CorsLayer::permissive())
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        // Set wraps Propagate so a generated id reaches the response
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId::default(),
        ))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS))
        .with_state(state)
}
