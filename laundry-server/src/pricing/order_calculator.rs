//! Order creation pricing
//!
//! Prices a new order from its package and selected addons, for both
//! subscription-bound (materialized) and standalone orders.

use chrono::{Duration, NaiveDateTime};
use rust_decimal::prelude::*;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    AddonKind, Command, OrderAddon, OrderCreate, OrderType, Package, ServiceAddon,
};

use super::PricingSettings;
use super::money::{money_eq, round_money};
use crate::scheduler::Pickup;

/// Per-kg view of the addons attached to an order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddonBreakdown {
    /// Sum of customer prices per kg
    pub kg_cost: Decimal,
    /// Sum of merchant costs per kg
    pub merchant_kg_cost: Decimal,
    /// Shipping addon code, becomes the delivery type
    pub delivery_type: Option<String>,
    /// Shipping duration in hours
    pub duration_hours: Option<i64>,
    pub entries: Vec<OrderAddon>,
}

/// Fold addons into per-kg prices and per-order cost entries
pub fn accumulate_addons(addons: &[ServiceAddon]) -> AddonBreakdown {
    let mut breakdown = AddonBreakdown::default();
    for addon in addons {
        breakdown.kg_cost += addon.price;
        breakdown.merchant_kg_cost += addon.kind.merchant_cost();
        match &addon.kind {
            AddonKind::Shipping {
                merchant_cost,
                duration_hours,
            } => {
                breakdown.delivery_type = Some(addon.code.clone());
                breakdown.duration_hours = Some(*duration_hours);
                breakdown.entries.push(OrderAddon::Shipping {
                    unit_cost: *merchant_cost,
                    total_cost: Decimal::ZERO,
                    duration_hours: *duration_hours,
                });
            }
            AddonKind::Ironing { merchant_cost } => {
                breakdown.entries.push(OrderAddon::Ironing {
                    unit_cost: *merchant_cost,
                    total_cost: Decimal::ZERO,
                });
            }
        }
    }
    breakdown
}

/// Customer price per kg: package rate plus addon prices
pub fn customer_kg_price(package: &Package, addons_kg_cost: Decimal) -> AppResult<Decimal> {
    if package.kg <= Decimal::ZERO {
        return Err(AppError::consistency(format!(
            "Package {} has a non-positive weight ({})",
            package.id, package.kg
        ))
        .with_detail("package_id", package.id));
    }
    let rate = package
        .amount
        .checked_div(package.kg)
        .ok_or_else(|| AppError::consistency("Package rate overflow"))?;
    Ok(rate + addons_kg_cost)
}

/// Shipping terms every order needs: delivery type, duration, delivery cost
fn shipping_terms(breakdown: &AddonBreakdown, delivery_cost: Decimal) -> AppResult<(String, i64)> {
    match (&breakdown.delivery_type, breakdown.duration_hours) {
        (Some(kind), Some(hours)) if hours > 0 && !delivery_cost.is_zero() => {
            Ok((kind.clone(), hours))
        }
        _ => Err(AppError::with_message(
            ErrorCode::OrderInvalidAddons,
            "Order needs a shipping addon with a duration and a delivery cost",
        )
        .with_detail("delivery_cost", delivery_cost.to_string())),
    }
}

/// Latest expected delivery: end of the pickup slot plus the shipping duration
fn delivery_date(pickup: &Pickup, duration_hours: i64) -> AppResult<NaiveDateTime> {
    let picking_end_at = pickup.date.date().and_time(pickup.hours.end_time()?);
    Ok(picking_end_at + Duration::hours(duration_hours))
}

/// Price one materialized order of a subscription
///
/// The initial price recomputed from the package must match the command's
/// contracted `order_min_price`.
pub fn price_subscription_order(
    command: &Command,
    package: &Package,
    pickup: &Pickup,
    command_execution_index: i32,
    order_execution_index: i32,
) -> AppResult<OrderCreate> {
    let breakdown = accumulate_addons(&command.addons);
    let delivery_cost = command.delivery_per_day_cost;
    // subscriptions were validated at purchase, so missing terms are corrupt data
    let (delivery_type, duration_hours) =
        shipping_terms(&breakdown, delivery_cost).map_err(|_| {
            AppError::consistency(format!(
                "Command {} has no usable shipping terms",
                command.id
            ))
            .with_detail("command_id", command.id)
        })?;
    let delivery_date = delivery_date(pickup, duration_hours)?;

    let kg_price = customer_kg_price(package, breakdown.kg_cost)?;
    let initial_price = kg_price * package.kg;
    if !money_eq(initial_price, command.order_min_price) {
        return Err(AppError::with_message(
            ErrorCode::OrderPriceMismatch,
            format!(
                "Order unit price differs from the subscription: expected {}, computed {}",
                command.order_min_price,
                round_money(initial_price)
            ),
        )
        .with_detail("command_id", command.id)
        .with_detail("order_min_price", command.order_min_price.to_string())
        .with_detail("computed_price", initial_price.to_string()));
    }

    Ok(OrderCreate {
        command_id: Some(command.id),
        user_id: command.user_id,
        package_id: package.id,
        title: command.description.clone(),
        order_type: OrderType::Subscription,
        execution_date: pickup.date,
        execution_duration: duration_hours,
        delivery_date,
        picking_hours: pickup.hours.clone(),
        delivery_type,
        capacity_kg: package.kg,
        delivery_cost,
        merchant_kg_cost: command.merchant_kg_unit_cost,
        customer_order_kg_price: kg_price,
        customer_order_initial_price: command.order_min_price,
        addons: breakdown.entries,
        command_execution_index,
        order_execution_index,
    })
}

/// Price a one-off order that is not bound to a subscription
///
/// Merchant cost is the configured base rate plus addon merchant costs;
/// nothing is prepaid so the initial price is zero.
pub fn price_standalone_order(
    user_id: i64,
    title: &str,
    package: &Package,
    addons: &[ServiceAddon],
    pickup: &Pickup,
    settings: &PricingSettings,
) -> AppResult<OrderCreate> {
    let breakdown = accumulate_addons(addons);
    let delivery_cost = settings.standalone_delivery_cost;
    let (delivery_type, duration_hours) = shipping_terms(&breakdown, delivery_cost)?;
    let delivery_date = delivery_date(pickup, duration_hours)?;
    let kg_price = customer_kg_price(package, breakdown.kg_cost)?;

    Ok(OrderCreate {
        command_id: None,
        user_id,
        package_id: package.id,
        title: title.to_string(),
        order_type: OrderType::Command,
        execution_date: pickup.date,
        execution_duration: duration_hours,
        delivery_date,
        picking_hours: pickup.hours.clone(),
        delivery_type,
        capacity_kg: Decimal::ZERO,
        delivery_cost,
        merchant_kg_cost: settings.standalone_merchant_kg_cost + breakdown.merchant_kg_cost,
        customer_order_kg_price: kg_price,
        customer_order_initial_price: Decimal::ZERO,
        addons: breakdown.entries,
        command_execution_index: 0,
        order_execution_index: 0,
    })
}
