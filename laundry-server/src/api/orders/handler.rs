//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{MerchantAction, Order, TimeSlot};
use validator::{Validate, ValidationError};

use crate::api::extractor::{CustomerId, MerchantId};
use crate::core::ServerState;
use crate::db::LaundryStore;
use crate::orders::NewStandaloneOrder;
use crate::pricing::MAX_WEIGHT_KG;
use crate::utils::validation::validate_request;
use crate::utils::{ApiResponse, AppResult};

fn positive_weight(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(ValidationError::new("weight").with_message("must be positive".into()));
    }
    if *value > MAX_WEIGHT_KG {
        return Err(ValidationError::new("weight").with_message("exceeds maximum allowed".into()));
    }
    Ok(())
}

/// Merchant weight report
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EvaluateOrderRequest {
    #[validate(length(min = 1, max = 16, message = "Order code is required"))]
    pub order_code: String,
    #[validate(custom(function = "positive_weight"))]
    pub weight_kg: Decimal,
    /// Price without committing anything
    #[serde(default)]
    pub preview: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderActionRequest {
    pub action: MerchantAction,
}

/// Standalone order placed by a customer
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub package_id: i64,
    #[validate(length(min = 1, max = 120, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "At least one service addon is required"))]
    pub addon_codes: Vec<String>,
    pub pickup_date: NaiveDate,
    pub picking_hours: TimeSlot,
}

/// Evaluate (or preview) a CREATED order by code
pub async fn evaluate<S: LaundryStore>(
    State(state): State<ServerState<S>>,
    MerchantId(merchant_id): MerchantId,
    Json(payload): Json<EvaluateOrderRequest>,
) -> AppResult<ApiResponse<Order>> {
    validate_request(&payload)?;
    let order = state
        .lifecycle
        .evaluate_order(
            merchant_id,
            &payload.order_code,
            payload.weight_kg,
            payload.preview,
        )
        .await?;
    Ok(ApiResponse::success(order))
}

/// Merchant finishes or rejects a WASHING order
pub async fn action<S: LaundryStore>(
    State(state): State<ServerState<S>>,
    MerchantId(merchant_id): MerchantId,
    Path(id): Path<i64>,
    Json(payload): Json<OrderActionRequest>,
) -> AppResult<ApiResponse<Order>> {
    let order = state
        .lifecycle
        .submit_order_action(merchant_id, id, payload.action)
        .await?;
    Ok(ApiResponse::success(order))
}

/// Customer confirms reception
pub async fn delivered<S: LaundryStore>(
    State(state): State<ServerState<S>>,
    CustomerId(user_id): CustomerId,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Order>> {
    let order = state.lifecycle.confirm_reception(user_id, id).await?;
    Ok(ApiResponse::success(order))
}

/// Create a standalone order for the calling customer
pub async fn create<S: LaundryStore>(
    State(state): State<ServerState<S>>,
    CustomerId(user_id): CustomerId,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<ApiResponse<Order>> {
    validate_request(&payload)?;
    let order = state
        .lifecycle
        .create_standalone_order(NewStandaloneOrder {
            user_id,
            package_id: payload.package_id,
            title: payload.title,
            addon_codes: payload.addon_codes,
            pickup_date: payload.pickup_date,
            picking_hours: payload.picking_hours,
        })
        .await?;
    Ok(ApiResponse::success(order))
}
