//! Command API Handlers

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::LaundryStore;
use crate::orders::MaterializeSummary;
use crate::utils::{ApiResponse, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterializeResponse {
    pub command_id: i64,
    pub orders_created: usize,
}

pub async fn materialize<S: LaundryStore>(
    State(state): State<ServerState<S>>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<MaterializeResponse>> {
    let orders_created = state.materializer.materialize_next_batches(id).await?;
    Ok(ApiResponse::success(MaterializeResponse {
        command_id: id,
        orders_created,
    }))
}

pub async fn materialize_pending<S: LaundryStore>(
    State(state): State<ServerState<S>>,
) -> AppResult<ApiResponse<MaterializeSummary>> {
    let summary = state.materializer.materialize_pending().await?;
    Ok(ApiResponse::success(summary))
}
