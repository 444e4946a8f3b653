//! Order Lifecycle Controller
//!
//! External events (weight report, merchant decision, customer receipt)
//! drive orders through the state machine. Each event is one transaction.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    Command, MerchantAction, MerchantPaymentStatus, Order, OrderStatus, PickupRule, TimeSlot,
};

use super::{OrderSettings, invoicing, order_code, settle};
use crate::db::{LaundryStore, StoreTx};
use crate::pricing::{self, overweight_charge};
use crate::scheduler::{self, Pickup, SubscriptionWindow};
use crate::utils::Clock;
use crate::utils::validation::normalize_order_code;

/// Standalone order request (no subscription behind it)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStandaloneOrder {
    pub user_id: i64,
    pub package_id: i64,
    pub title: String,
    /// Service addon codes, must include one shipping addon
    pub addon_codes: Vec<String>,
    pub pickup_date: NaiveDate,
    pub picking_hours: TimeSlot,
}

pub struct OrderLifecycle<S: LaundryStore> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    settings: OrderSettings,
}

impl<S: LaundryStore> Clone for OrderLifecycle<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            clock: self.clock.clone(),
            settings: self.settings.clone(),
        }
    }
}

fn order_not_found(what: String) -> AppError {
    AppError::with_message(ErrorCode::OrderNotFound, format!("Order not found: {}", what))
}

fn ensure_transition(order: &Order, next: OrderStatus) -> AppResult<()> {
    if !order.status.can_transition_to(next) {
        return Err(AppError::with_message(
            ErrorCode::OrderInvalidTransition,
            format!(
                "Order {} cannot move from {} to {}",
                order.id,
                order.status.as_str(),
                next.as_str()
            ),
        ));
    }
    Ok(())
}

impl<S: LaundryStore> OrderLifecycle<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, settings: OrderSettings) -> Self {
        Self {
            store,
            clock,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // ========================================================================
    // Merchant evaluation
    // ========================================================================

    /// Merchant reports the actual weight of a CREATED order
    ///
    /// With `preview` the full computation runs on detached copies and the
    /// priced order is returned without any lock or write.
    pub async fn evaluate_order(
        &self,
        merchant_id: i64,
        order_code: &str,
        weight_kg: Decimal,
        preview: bool,
    ) -> AppResult<Order> {
        let code = normalize_order_code(order_code)
            .ok_or_else(|| AppError::validation("Order code is required"))?;

        let found = self
            .store
            .find_order_by_code(&code, OrderStatus::Created)
            .await?
            .ok_or_else(|| {
                tracing::warn!(merchant_id, code = %code, "No pending order for code");
                order_not_found(format!("#{}", code))
            })?;

        if preview {
            return self.preview_evaluation(found, weight_kg).await;
        }

        let mut tx = self.store.begin().await?;
        let result = self
            .evaluate_locked(&mut tx, found.id, &code, merchant_id, weight_kg)
            .await;
        let order = settle(tx, result, "evaluate_order").await?;

        tracing::info!(
            order_id = order.id,
            code = %order.order_code,
            merchant_id,
            weight_kg = %weight_kg,
            fees = %order.customer_fees_to_pay,
            invoice_id = ?order.invoice_id,
            "Order evaluated, washing"
        );
        Ok(order)
    }

    async fn preview_evaluation(&self, mut order: Order, weight_kg: Decimal) -> AppResult<Order> {
        let mut command = match order.command_id {
            Some(command_id) => Some(self.bound_command(command_id).await?),
            None => None,
        };
        let evaluation = pricing::evaluate_weight(&mut order, command.as_mut(), weight_kg)?;
        overweight_charge(&order, evaluation.pay_for_kg)?;
        Ok(order)
    }

    async fn bound_command(&self, command_id: i64) -> AppResult<Command> {
        self.store.find_command(command_id).await?.ok_or_else(|| {
            AppError::consistency(format!("Order references missing command {}", command_id))
        })
    }

    async fn evaluate_locked(
        &self,
        tx: &mut S::Tx,
        order_id: i64,
        code: &str,
        merchant_id: i64,
        weight_kg: Decimal,
    ) -> AppResult<Order> {
        let mut order = tx
            .lock_order(order_id)
            .await?
            .filter(|o| o.status == OrderStatus::Created && o.order_code == code)
            .ok_or_else(|| order_not_found(format!("#{}", code)))?;
        ensure_transition(&order, OrderStatus::Washing)?;

        let mut command = match order.command_id {
            Some(command_id) => Some(tx.lock_command(command_id).await?.ok_or_else(|| {
                AppError::consistency(format!("Order references missing command {}", command_id))
            })?),
            None => None,
        };

        let evaluation = pricing::evaluate_weight(&mut order, command.as_mut(), weight_kg)?;
        let now = self.clock.now_millis();
        order.merchant_id = Some(merchant_id);
        order.status = OrderStatus::Washing;
        order.merchant_payment_status = Some(MerchantPaymentStatus::Pending);
        order.updated_at = now;

        if let Some(charge) = overweight_charge(&order, evaluation.pay_for_kg)? {
            invoicing::bill_order(tx, &mut order, &charge, &self.settings.operating_country, now)
                .await?;
        }

        if let Some(command) = command.as_mut() {
            command.updated_at = now;
            tx.update_command(command).await?;
        }
        tx.update_order(&order).await?;
        Ok(order)
    }

    // ========================================================================
    // Merchant action
    // ========================================================================

    /// Merchant finishes (WASHED) or gives back (REJECTED) a WASHING order
    pub async fn submit_order_action(
        &self,
        merchant_id: i64,
        order_id: i64,
        action: MerchantAction,
    ) -> AppResult<Order> {
        let owned_by_merchant =
            |o: &Order| o.status == OrderStatus::Washing && o.merchant_id == Some(merchant_id);

        if !self
            .store
            .find_order(order_id)
            .await?
            .is_some_and(|o| owned_by_merchant(&o))
        {
            tracing::warn!(merchant_id, order_id, ?action, "No washing order for merchant");
            return Err(order_not_found(order_id.to_string()));
        }

        let mut tx = self.store.begin().await?;
        let result = async {
            let mut order = tx
                .lock_order(order_id)
                .await?
                .filter(|o| owned_by_merchant(o))
                .ok_or_else(|| order_not_found(order_id.to_string()))?;

            match action {
                MerchantAction::Washed => {
                    ensure_transition(&order, OrderStatus::Ready)?;
                    order.status = OrderStatus::Ready;
                }
                MerchantAction::Rejected => {
                    ensure_transition(&order, OrderStatus::Created)?;
                    self.roll_back_evaluation(&mut tx, &mut order).await?;
                }
            }
            order.updated_at = self.clock.now_millis();
            tx.update_order(&order).await?;
            Ok::<_, AppError>(order)
        }
        .await;
        let order = settle(tx, result, "submit_order_action").await?;

        tracing::info!(
            order_id,
            merchant_id,
            ?action,
            status = order.status.as_str(),
            "Merchant action applied"
        );
        Ok(order)
    }

    /// Undo what an evaluation booked: weight, merchant, unpaid invoice
    async fn roll_back_evaluation(&self, tx: &mut S::Tx, order: &mut Order) -> AppResult<()> {
        order.status = OrderStatus::Created;
        order.merchant_id = None;
        order.merchant_payment_status = None;

        if let (Some(command_id), Some(user_kg)) = (order.command_id, order.user_kg) {
            let mut command = tx.lock_command(command_id).await?.ok_or_else(|| {
                AppError::consistency(format!("Order references missing command {}", command_id))
            })?;
            command.command_spent_kg -= user_kg;
            command.updated_at = self.clock.now_millis();
            tx.update_command(&command).await?;
        }

        if !invoicing::release_invoice(tx, order).await? {
            tracing::warn!(
                order_id = order.id,
                invoice_id = ?order.invoice_id,
                "Rejected order keeps its settled invoice"
            );
        }
        Ok(())
    }

    // ========================================================================
    // Customer confirmation
    // ========================================================================

    /// Customer confirms reception of a READY order they own
    pub async fn confirm_reception(&self, user_id: i64, order_id: i64) -> AppResult<Order> {
        let owned_and_ready = |o: &Order| o.status == OrderStatus::Ready && o.user_id == user_id;

        if !self
            .store
            .find_order(order_id)
            .await?
            .is_some_and(|o| owned_and_ready(&o))
        {
            tracing::warn!(user_id, order_id, "No ready order for customer");
            return Err(order_not_found(order_id.to_string()));
        }

        let mut tx = self.store.begin().await?;
        let result = async {
            let mut order = tx
                .lock_order(order_id)
                .await?
                .filter(|o| owned_and_ready(o))
                .ok_or_else(|| order_not_found(order_id.to_string()))?;
            ensure_transition(&order, OrderStatus::Delivered)?;

            order.status = OrderStatus::Delivered;
            order.merchant_payment_status = Some(MerchantPaymentStatus::Reversed);
            order.updated_at = self.clock.now_millis();
            tx.update_order(&order).await?;
            Ok::<_, AppError>(order)
        }
        .await;
        let order = settle(tx, result, "confirm_reception").await?;

        tracing::info!(order_id, user_id, "Order delivered");
        Ok(order)
    }

    // ========================================================================
    // Standalone orders and subscription quotes
    // ========================================================================

    /// Create a priced one-off order in CREATED
    pub async fn create_standalone_order(&self, request: NewStandaloneOrder) -> AppResult<Order> {
        request.picking_hours.validate()?;
        if request.pickup_date < self.clock.now().date() {
            return Err(AppError::validation(format!(
                "Pickup date {} is in the past",
                request.pickup_date
            )));
        }

        let package = self
            .store
            .find_package(request.package_id)
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::PackageNotFound,
                    format!("Package {} not found", request.package_id),
                )
            })?;

        let mut addons = Vec::with_capacity(request.addon_codes.len());
        for code in &request.addon_codes {
            let addon = self.store.find_addon(code).await?.ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::AddonNotFound,
                    format!("Service addon {} not found", code),
                )
            })?;
            addons.push(addon);
        }

        let weekday = request.pickup_date.weekday().number_from_monday() as u8;
        let pickup = Pickup {
            date: request.pickup_date.and_time(chrono::NaiveTime::MIN),
            weekday,
            hours: request.picking_hours.clone(),
        };
        let data = pricing::price_standalone_order(
            request.user_id,
            &request.title,
            &package,
            &addons,
            &pickup,
            &self.settings.pricing,
        )?;

        let mut tx = self.store.begin().await?;
        let result = async {
            let now = self.clock.now_millis();
            let mut order = tx.insert_order(&data, now).await?;
            order.order_code = order_code(&self.settings.app_key, order.id);
            tx.update_order(&order).await?;
            Ok::<_, AppError>(order)
        }
        .await;
        let order = settle(tx, result, "create_standalone_order").await?;

        tracing::info!(
            order_id = order.id,
            code = %order.order_code,
            user_id = order.user_id,
            "Standalone order created"
        );
        Ok(order)
    }

    /// Validity window of a subscription paid now
    pub fn subscription_window(&self, rules: &[PickupRule]) -> AppResult<SubscriptionWindow> {
        scheduler::compute_subscription_window(
            self.clock.now(),
            rules,
            self.settings.pricing.subscription_delivery_delay_hours,
        )
    }
}
