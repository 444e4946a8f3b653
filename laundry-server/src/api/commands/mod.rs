//! Command API Module
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/commands/{id}/materialize | POST | 生成单个订阅的剩余批次 |
//! | /api/commands/materialize | POST | 扫描所有待生成订阅 (由外部定时任务调用) |

mod handler;

pub use handler::MaterializeResponse;

use axum::{Router, routing::post};

use crate::core::ServerState;
use crate::db::LaundryStore;

pub fn router<S: LaundryStore>() -> Router<ServerState<S>> {
    Router::new().nest("/api/commands", routes())
}

fn routes<S: LaundryStore>() -> Router<ServerState<S>> {
    Router::new()
        .route("/materialize", post(handler::materialize_pending::<S>))
        .route("/{id}/materialize", post(handler::materialize::<S>))
}
