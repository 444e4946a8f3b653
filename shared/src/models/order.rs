//! Order Model
//!
//! One deliverable unit of laundry work, priced and assigned to one merchant.

use super::command::OrderType;
use super::schedule::TimeSlot;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order status
///
/// `CREATED -> WASHING -> READY -> DELIVERED`, plus `WASHING -> CREATED` on rejection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum OrderStatus {
    Created,
    Washing,
    Ready,
    Delivered,
}

impl OrderStatus {
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Created, OrderStatus::Washing)
                | (OrderStatus::Washing, OrderStatus::Ready)
                | (OrderStatus::Washing, OrderStatus::Created)
                | (OrderStatus::Ready, OrderStatus::Delivered)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::Washing => "WASHING",
            OrderStatus::Ready => "READY",
            OrderStatus::Delivered => "DELIVERED",
        }
    }
}

/// Whether the merchant is owed money for this order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "merchant_payment_status", rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum MerchantPaymentStatus {
    /// Work accepted, not yet payable
    Pending,
    /// Delivery confirmed, merchant payable
    Reversed,
}

/// Merchant decision on an order being washed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MerchantAction {
    Washed,
    Rejected,
}

/// Per-order addon cost line; `total_cost` is filled once weight is known
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderAddon {
    Shipping {
        unit_cost: Decimal,
        total_cost: Decimal,
        duration_hours: i64,
    },
    #[serde(rename = "REPASSAGE")]
    Ironing {
        unit_cost: Decimal,
        total_cost: Decimal,
    },
}

impl OrderAddon {
    pub fn unit_cost(&self) -> Decimal {
        match self {
            OrderAddon::Shipping { unit_cost, .. } | OrderAddon::Ironing { unit_cost, .. } => {
                *unit_cost
            }
        }
    }

    pub fn total_cost(&self) -> Decimal {
        match self {
            OrderAddon::Shipping { total_cost, .. } | OrderAddon::Ironing { total_cost, .. } => {
                *total_cost
            }
        }
    }
}

/// Persisted order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    /// Short human-facing reference code
    pub order_code: String,
    pub command_id: Option<i64>,
    pub user_id: i64,
    pub package_id: i64,
    pub title: String,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub execution_date: NaiveDateTime,
    /// Hours between end of pickup and delivery
    pub execution_duration: i64,
    pub delivery_date: NaiveDateTime,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub picking_hours: TimeSlot,
    pub delivery_type: String,
    pub capacity_kg: Decimal,
    pub merchant_id: Option<i64>,
    pub merchant_payment_status: Option<MerchantPaymentStatus>,
    /// Weight reported by the merchant
    pub user_kg: Option<Decimal>,

    // Costs
    pub delivery_cost: Decimal,
    pub merchant_kg_cost: Decimal,
    pub merchant_total_cost: Decimal,
    pub total_cost: Decimal,
    pub margin: Decimal,

    // Customer
    pub customer_order_kg_price: Decimal,
    pub customer_order_initial_price: Decimal,
    pub customer_order_final_price: Decimal,
    pub customer_fees_to_pay: Decimal,

    #[cfg_attr(feature = "db", sqlx(json))]
    pub addons: Vec<OrderAddon>,
    pub invoice_id: Option<i64>,
    pub command_execution_index: i32,
    pub order_execution_index: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create order payload, produced by the pricing engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCreate {
    pub command_id: Option<i64>,
    pub user_id: i64,
    pub package_id: i64,
    pub title: String,
    pub order_type: OrderType,
    pub execution_date: NaiveDateTime,
    pub execution_duration: i64,
    pub delivery_date: NaiveDateTime,
    pub picking_hours: TimeSlot,
    pub delivery_type: String,
    pub capacity_kg: Decimal,
    pub delivery_cost: Decimal,
    pub merchant_kg_cost: Decimal,
    pub customer_order_kg_price: Decimal,
    pub customer_order_initial_price: Decimal,
    pub addons: Vec<OrderAddon>,
    pub command_execution_index: i32,
    pub order_execution_index: i32,
}

impl Order {
    /// Materialize a create payload; weight-dependent fields start at zero
    pub fn from_create(id: i64, data: OrderCreate, now_millis: i64) -> Self {
        Self {
            id,
            order_code: String::new(),
            command_id: data.command_id,
            user_id: data.user_id,
            package_id: data.package_id,
            title: data.title,
            order_type: data.order_type,
            status: OrderStatus::Created,
            execution_date: data.execution_date,
            execution_duration: data.execution_duration,
            delivery_date: data.delivery_date,
            picking_hours: data.picking_hours,
            delivery_type: data.delivery_type,
            capacity_kg: data.capacity_kg,
            merchant_id: None,
            merchant_payment_status: None,
            user_kg: None,
            delivery_cost: data.delivery_cost,
            merchant_kg_cost: data.merchant_kg_cost,
            merchant_total_cost: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            margin: Decimal::ZERO,
            customer_order_kg_price: data.customer_order_kg_price,
            customer_order_initial_price: data.customer_order_initial_price,
            customer_order_final_price: Decimal::ZERO,
            customer_fees_to_pay: Decimal::ZERO,
            addons: data.addons,
            invoice_id: None,
            command_execution_index: data.command_execution_index,
            order_execution_index: data.order_execution_index,
            created_at: now_millis,
            updated_at: now_millis,
        }
    }

    /// Correlation key of the invoices billed for this order
    pub fn invoice_meta(&self) -> String {
        format!("order-{}", self.order_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transitions() {
        use OrderStatus::*;
        assert!(Created.can_transition_to(Washing));
        assert!(Washing.can_transition_to(Ready));
        assert!(Washing.can_transition_to(Created));
        assert!(Ready.can_transition_to(Delivered));

        assert!(!Created.can_transition_to(Ready));
        assert!(!Ready.can_transition_to(Created));
        assert!(!Delivered.can_transition_to(Created));
        assert!(!Delivered.can_transition_to(Washing));
        assert!(!Washing.can_transition_to(Washing));
    }

    #[test]
    fn test_order_addon_json_shape() {
        let addons = vec![
            OrderAddon::Shipping {
                unit_cost: dec!(20),
                total_cost: dec!(0),
                duration_hours: 48,
            },
            OrderAddon::Ironing {
                unit_cost: dec!(40),
                total_cost: dec!(0),
            },
        ];
        let value = serde_json::to_value(&addons).unwrap();
        assert_eq!(value[0]["key"], "SHIPPING");
        assert_eq!(value[1]["key"], "REPASSAGE");

        let back: Vec<OrderAddon> = serde_json::from_value(value).unwrap();
        assert_eq!(back, addons);
        assert_eq!(back[1].unit_cost(), dec!(40));
    }

    #[test]
    fn test_merchant_action_serde() {
        let action: MerchantAction = serde_json::from_str(r#""REJECTED""#).unwrap();
        assert_eq!(action, MerchantAction::Rejected);
    }
}
