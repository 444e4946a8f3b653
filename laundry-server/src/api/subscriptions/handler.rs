use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use shared::models::PickupRule;
use validator::Validate;

use crate::core::ServerState;
use crate::db::LaundryStore;
use crate::scheduler::SubscriptionWindow;
use crate::utils::validation::validate_request;
use crate::utils::{ApiResponse, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WindowRequest {
    #[validate(length(min = 1, max = 14, message = "Between 1 and 14 pickup rules"))]
    pub picking_days_times: Vec<PickupRule>,
}

pub async fn window<S: LaundryStore>(
    State(state): State<ServerState<S>>,
    Json(payload): Json<WindowRequest>,
) -> AppResult<ApiResponse<SubscriptionWindow>> {
    validate_request(&payload)?;
    let window = state
        .lifecycle
        .subscription_window(&payload.picking_days_times)?;
    Ok(ApiResponse::success(window))
}
