//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /health | GET | 简单健康检查 |
//! | /health/detailed | GET | 含数据库连通性的详细检查 |

use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use crate::core::ServerState;
use crate::db::LaundryStore;

pub fn router<S: LaundryStore>() -> Router<ServerState<S>> {
    Router::new()
        .route("/health", get(health))
        .route("/health/detailed", get(detailed_health::<S>))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    /// 运行时间 (秒)
    pub uptime_seconds: u64,
    pub database: CheckResult,
}

/// 单项检查结果
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckResult {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

static START_TIME: std::sync::OnceLock<SystemTime> = std::sync::OnceLock::new();

fn uptime_seconds() -> u64 {
    let start = START_TIME.get_or_init(SystemTime::now);
    SystemTime::now()
        .duration_since(*start)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub async fn health() -> Json<HealthResponse> {
    START_TIME.get_or_init(SystemTime::now);
    Json(HealthResponse {
        status: "healthy".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

pub async fn detailed_health<S: LaundryStore>(
    State(state): State<ServerState<S>>,
) -> Json<DetailedHealthResponse> {
    let started = std::time::Instant::now();
    let database = match state.store().ping().await {
        Ok(()) => CheckResult {
            status: "ok".into(),
            latency_ms: Some(started.elapsed().as_millis() as u64),
            message: None,
        },
        Err(e) => {
            tracing::error!("Health check database error: {}", e);
            CheckResult {
                status: "error".into(),
                latency_ms: None,
                message: Some(format!("Database error: {}", e)),
            }
        }
    };

    Json(DetailedHealthResponse {
        status: if database.status == "ok" { "healthy" } else { "degraded" }.into(),
        version: env!("CARGO_PKG_VERSION").into(),
        environment: state.config.environment.clone(),
        uptime_seconds: uptime_seconds(),
        database,
    })
}
