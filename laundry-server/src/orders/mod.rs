//! Order lifecycle and command materialization
//!
//! - **lifecycle**: merchant evaluation, merchant action, customer
//!   confirmation, standalone order creation
//! - **materializer**: batch generation of subscription orders
//! - **invoicing**: overweight / standalone invoice bookkeeping
//! - **code**: public order codes
//!
//! # State machine
//!
//! ```text
//! CREATED ──evaluate──▶ WASHING ──WASHED──▶ READY ──confirm──▶ DELIVERED
//!    ▲                     │
//!    └─────REJECTED────────┘
//! ```
//!
//! Every mutating operation follows the same shape: unlocked guard check,
//! `begin`, locked re-read and guard re-check, mutate, `commit`. Any error
//! rolls the whole transaction back.

pub mod code;
pub mod invoicing;
pub mod lifecycle;
pub mod materializer;

pub use code::order_code;
pub use lifecycle::{NewStandaloneOrder, OrderLifecycle};
pub use materializer::{MaterializeSummary, Materializer};

use shared::error::AppResult;

use crate::db::StoreTx;
use crate::pricing::PricingSettings;

/// Settings the order services need from configuration
#[derive(Debug, Clone)]
pub struct OrderSettings {
    /// Secret mixed into order codes
    pub app_key: String,
    /// Country whose default payment account receives invoices
    pub operating_country: String,
    pub pricing: PricingSettings,
}

/// Commit on success, roll back and log on failure
pub(crate) async fn settle<T: StoreTx, R>(tx: T, result: AppResult<R>, operation: &str) -> AppResult<R> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if err.code.category().is_internal() {
                tracing::error!(
                    operation,
                    code = %err.code,
                    error = %err,
                    details = ?err.details,
                    "Transaction failed, rolling back"
                );
            } else {
                tracing::warn!(operation, code = %err.code, error = %err, "Operation rejected");
            }
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(operation, error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests;
