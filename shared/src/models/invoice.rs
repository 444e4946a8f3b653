//! Invoice Model
//!
//! Billable record for overweight or standalone-order fees, correlated to an
//! order through its `(user_id, meta)` key.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "invoice_status", rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum InvoiceStatus {
    Created,
    Pending,
    Success,
    Canceled,
}

impl InvoiceStatus {
    /// Neither paid nor canceled
    pub fn is_open(self) -> bool {
        matches!(self, InvoiceStatus::Created | InvoiceStatus::Pending)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "invoice_type", rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum InvoiceType {
    /// Weight beyond a subscription allowance
    SubscriptionOverweight,
    /// Standalone order laundry
    CommandLaundry,
    /// Subscription purchase
    SubscriptionLaundry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: i64,
    pub user_id: i64,
    /// Correlation key, `order-<order code>`
    pub meta: String,
    /// Serialized as a decimal string
    pub amount: Decimal,
    pub margin: Decimal,
    pub status: InvoiceStatus,
    pub invoice_type: InvoiceType,
    pub payment_account_id: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create-or-update payload keyed by `(user_id, meta)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceUpsert {
    pub user_id: i64,
    pub meta: String,
    pub amount: Decimal,
    pub margin: Decimal,
    pub status: InvoiceStatus,
    pub invoice_type: InvoiceType,
    pub payment_account_id: i64,
}
