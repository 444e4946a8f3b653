//! Overweight / standalone charge computation
//!
//! Decides whether an evaluated order produces an invoice, for how much,
//! and with what margin.

use rust_decimal::prelude::*;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{InvoiceType, Order};

use super::money::{non_negative, round_money};

/// Charge to invoice after a weight evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverweightCharge {
    pub fees: Decimal,
    pub margin: Decimal,
    pub invoice_type: InvoiceType,
}

/// Derive the charge for an evaluated order, if any
///
/// Command-bound orders earn the kg price minus the merchant kg cost on the
/// overage only. Standalone orders earn the order margin.
pub fn overweight_charge(order: &Order, pay_for_kg: Decimal) -> AppResult<Option<OverweightCharge>> {
    if order.customer_fees_to_pay <= Decimal::ZERO {
        return Ok(None);
    }

    let (margin, invoice_type) = match order.command_id {
        Some(command_id) => {
            if pay_for_kg <= Decimal::ZERO {
                return Err(AppError::with_message(
                    ErrorCode::OrderNoOverage,
                    "Fees to pay without any weight over the subscription allowance",
                )
                .with_detail("command_id", command_id)
                .with_detail("order_id", order.id));
            }
            let margin = round_money(
                (order.customer_order_kg_price - order.merchant_kg_cost) * pay_for_kg,
            );
            (margin, InvoiceType::SubscriptionOverweight)
        }
        None => (
            order.customer_order_final_price - order.total_cost,
            InvoiceType::CommandLaundry,
        ),
    };

    if margin < Decimal::ZERO {
        return Err(AppError::with_message(
            ErrorCode::OrderNegativeMargin,
            format!("Fees do not cover the merchant cost (margin {})", margin),
        )
        .with_detail("order_id", order.id)
        .with_detail("margin", margin.to_string()));
    }

    Ok(Some(OverweightCharge {
        fees: order.customer_fees_to_pay,
        margin,
        invoice_type,
    }))
}

/// Amount left to bill once previously settled invoices are credited
pub fn amount_due(fees: Decimal, prior_paid: Decimal) -> Decimal {
    non_negative(fees - prior_paid)
}
