//! Subscription quote API
//!
//! `POST /api/subscriptions/window` - 按当前时间计算订阅有效期

mod handler;

pub use handler::WindowRequest;

use axum::{Router, routing::post};

use crate::core::ServerState;
use crate::db::LaundryStore;

pub fn router<S: LaundryStore>() -> Router<ServerState<S>> {
    Router::new().route("/api/subscriptions/window", post(handler::window::<S>))
}
