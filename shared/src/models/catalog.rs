//! Catalog models: laundry packages, service addons, payment accounts

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Laundry package (forfait): a price for a weight allowance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Package {
    pub id: i64,
    pub code: String,
    pub name: String,
    /// Package price
    pub amount: Decimal,
    /// Weight covered by the package price
    pub kg: Decimal,
}

/// Service addon kind with its merchant-side cost data
///
/// Serialized as `{"key": "SHIPPING", "value": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AddonKind {
    /// Pickup + delivery; fixes the delivery type and execution duration
    Shipping {
        merchant_cost: Decimal,
        /// Approximate hours between end of pickup and delivery
        duration_hours: i64,
    },
    /// Ironing
    #[serde(rename = "REPASSAGE")]
    Ironing { merchant_cost: Decimal },
}

impl AddonKind {
    pub fn merchant_cost(&self) -> Decimal {
        match self {
            AddonKind::Shipping { merchant_cost, .. } | AddonKind::Ironing { merchant_cost } => {
                *merchant_cost
            }
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            AddonKind::Shipping { .. } => "SHIPPING",
            AddonKind::Ironing { .. } => "REPASSAGE",
        }
    }
}

/// Service addon as offered in the catalog and copied onto a command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceAddon {
    pub code: String,
    /// Customer price per kg
    pub price: Decimal,
    #[serde(flatten)]
    pub kind: AddonKind,
}

/// Payment account invoices are paid into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PaymentAccount {
    pub id: i64,
    pub country: String,
    pub label: String,
    pub is_default: bool,
}
