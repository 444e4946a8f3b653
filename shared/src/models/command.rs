//! Command Model (abonnement / commande récurrente)

use super::catalog::ServiceAddon;
use super::schedule::PickupRule;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Number of weekly batches a subscription materializes over its lifetime
pub const MAX_COMMAND_EXECUTIONS: i32 = 4;

/// Command / order type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "order_type", rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum OrderType {
    /// Recurring subscription with a weight allowance
    Subscription,
    /// One-off laundry order
    Command,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "command_status", rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum CommandStatus {
    #[default]
    Pending,
    Active,
    Completed,
    Canceled,
}

/// Subscription or recurring contract generating orders over time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Command {
    pub id: i64,
    pub user_id: i64,
    pub package_id: i64,
    pub command_type: OrderType,
    /// Copied onto every generated order as its title
    pub description: String,
    /// Contracted customer price of one order (package price + addons)
    pub order_min_price: Decimal,
    pub merchant_kg_unit_cost: Decimal,
    pub delivery_per_day_cost: Decimal,
    /// Contracted weight allowance
    pub command_kg: Decimal,
    /// Weight consumed so far
    pub command_spent_kg: Decimal,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub picking_days_times: Vec<PickupRule>,
    pub command_start_at: Option<NaiveDateTime>,
    /// Date of the last materialized pickup
    pub last_execution_at: Option<NaiveDateTime>,
    /// Weekly batches already materialized
    pub total_execution: i32,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub addons: Vec<ServiceAddon>,
    pub status: CommandStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Command {
    pub fn is_exhausted(&self) -> bool {
        self.total_execution >= MAX_COMMAND_EXECUTIONS
    }

    /// Weight consumed beyond the allowance, never negative
    pub fn overage_kg(&self) -> Decimal {
        (self.command_spent_kg - self.command_kg).max(Decimal::ZERO)
    }
}
