//! Order Pricing Engine
//!
//! Money fields of an order at creation time and at weight evaluation,
//! plus the overweight charge that follows. All arithmetic is `Decimal`.

pub mod invoice_calculator;
pub mod money;
pub mod order_calculator;
pub mod weight_calculator;

pub use invoice_calculator::*;
pub use order_calculator::*;
pub use weight_calculator::*;

use rust_decimal::Decimal;

/// Pricing knobs that come from configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PricingSettings {
    /// Merchant base cost per kg for standalone orders, before addons
    pub standalone_merchant_kg_cost: Decimal,
    /// Delivery cost folded into standalone order prices
    pub standalone_delivery_cost: Decimal,
    /// Buffer added to the end of a subscription window
    pub subscription_delivery_delay_hours: i64,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            standalone_merchant_kg_cost: Decimal::from(300),
            standalone_delivery_cost: Decimal::from(500),
            subscription_delivery_delay_hours: 48,
        }
    }
}
