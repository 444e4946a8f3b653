//! Order API Module
//!
//! | 路径 | 方法 | 调用方 | 说明 |
//! |------|------|--------|------|
//! | /api/orders | POST | 客户 | 创建单次订单 |
//! | /api/orders/evaluate | POST | 商户 | 称重评估 (可预览) |
//! | /api/orders/{id}/action | POST | 商户 | WASHED / REJECTED |
//! | /api/orders/{id}/delivered | POST | 客户 | 确认签收 |

mod handler;

pub use handler::{CreateOrderRequest, EvaluateOrderRequest, OrderActionRequest};

use axum::{Router, routing::post};

use crate::core::ServerState;
use crate::db::LaundryStore;

/// Order router
pub fn router<S: LaundryStore>() -> Router<ServerState<S>> {
    Router::new().nest("/api/orders", routes())
}

fn routes<S: LaundryStore>() -> Router<ServerState<S>> {
    Router::new()
        .route("/", post(handler::create::<S>))
        .route("/evaluate", post(handler::evaluate::<S>))
        .route("/{id}/action", post(handler::action::<S>))
        .route("/{id}/delivered", post(handler::delivered::<S>))
}
