//! Weight evaluation
//!
//! Recomputes every weight-dependent field of an order once the merchant
//! reports the actual weight, and books the weight against the command's
//! allowance.

use rust_decimal::prelude::*;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Command, Order, OrderAddon};

use super::money::round_money;

/// Largest weight a single report may carry
pub const MAX_WEIGHT_KG: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Outcome of one weight report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightEvaluation {
    /// Weight billed on top of what the customer already paid for
    pub pay_for_kg: Decimal,
}

/// Apply a reported weight to `order` (and its command, when bound)
///
/// Works on whatever copies the caller passes in: the lifecycle hands in
/// locked rows for a commit and detached clones for a preview.
pub fn evaluate_weight(
    order: &mut Order,
    command: Option<&mut Command>,
    kg: Decimal,
) -> AppResult<WeightEvaluation> {
    if kg <= Decimal::ZERO {
        return Err(AppError::with_message(
            ErrorCode::OrderInvalidWeight,
            format!("Reported weight must be positive, got {}", kg),
        ));
    }
    if kg > MAX_WEIGHT_KG {
        return Err(AppError::with_message(
            ErrorCode::OrderInvalidWeight,
            format!(
                "Reported weight exceeds maximum allowed ({}), got {}",
                MAX_WEIGHT_KG, kg
            ),
        ));
    }

    let pay_for_kg = match command {
        // overage added by this report only
        Some(command) => {
            let overage_before = command.overage_kg();
            command.command_spent_kg += kg;
            command.overage_kg() - overage_before
        }
        None => kg,
    };

    let delivery_in_price = if order.command_id.is_some() {
        Decimal::ZERO
    } else {
        order.delivery_cost
    };

    order.user_kg = Some(kg);
    order.merchant_total_cost = round_money(order.merchant_kg_cost * kg);
    order.customer_order_final_price =
        round_money(order.customer_order_kg_price * kg + delivery_in_price);
    order.customer_fees_to_pay = round_money(pay_for_kg * order.customer_order_kg_price);
    order.total_cost = order.delivery_cost + order.merchant_total_cost;
    order.margin = order.customer_order_final_price - order.total_cost;

    for addon in order.addons.iter_mut() {
        match addon {
            OrderAddon::Shipping {
                unit_cost,
                total_cost,
                ..
            }
            | OrderAddon::Ironing {
                unit_cost,
                total_cost,
            } => *total_cost = round_money(*unit_cost * kg),
        }
    }

    Ok(WeightEvaluation { pay_for_kg })
}
