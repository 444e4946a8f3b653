//! Command Materializer
//!
//! Generates the remaining weekly batches of a subscription in a single
//! transaction. Progress lives on the command row: `total_execution`
//! counts generated batches, `last_execution_at` is the date cursor.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Command, MAX_COMMAND_EXECUTIONS, Package, validate_pickup_rules};

use super::{order_code, settle};
use crate::db::{LaundryStore, StoreTx};
use crate::pricing;
use crate::scheduler;
use crate::utils::Clock;

/// Result of one `materialize_pending` sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializeSummary {
    pub commands: usize,
    pub orders_created: usize,
    pub failures: usize,
}

pub struct Materializer<S: LaundryStore> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    app_key: String,
}

impl<S: LaundryStore> Clone for Materializer<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            clock: self.clock.clone(),
            app_key: self.app_key.clone(),
        }
    }
}

fn ensure_schedulable(command: &Command) -> AppResult<chrono::NaiveDateTime> {
    let start = command.command_start_at.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::CommandNotSchedulable,
            format!("Command {} has no start date", command.id),
        )
    })?;
    validate_pickup_rules(&command.picking_days_times)
        .map_err(|e| e.with_detail("command_id", command.id))?;
    Ok(start)
}

impl<S: LaundryStore> Materializer<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, app_key: impl Into<String>) -> Self {
        Self {
            store,
            clock,
            app_key: app_key.into(),
        }
    }

    /// Generate every remaining batch of `command_id`, returning the number
    /// of orders created (0 once all batches exist)
    pub async fn materialize_next_batches(&self, command_id: i64) -> AppResult<usize> {
        let command = self.store.find_command(command_id).await?.ok_or_else(|| {
            AppError::with_message(
                ErrorCode::CommandNotFound,
                format!("Command {} not found", command_id),
            )
        })?;
        if command.is_exhausted() {
            tracing::debug!(command_id, "Command fully materialized, nothing to do");
            return Ok(0);
        }
        ensure_schedulable(&command)?;

        let package = self
            .store
            .find_package(command.package_id)
            .await?
            .ok_or_else(|| {
                AppError::consistency(format!(
                    "Command {} references missing package {}",
                    command_id, command.package_id
                ))
            })?;

        let mut tx = self.store.begin().await?;
        let result = self.materialize_locked(&mut tx, command_id, &package).await;
        let (created, total_execution) = settle(tx, result, "materialize_next_batches").await?;

        if created > 0 {
            tracing::info!(command_id, created, total_execution, "Command batches materialized");
        }
        Ok(created)
    }

    async fn materialize_locked(
        &self,
        tx: &mut S::Tx,
        command_id: i64,
        package: &Package,
    ) -> AppResult<(usize, i32)> {
        let mut command = tx.lock_command(command_id).await?.ok_or_else(|| {
            AppError::with_message(
                ErrorCode::CommandNotFound,
                format!("Command {} not found", command_id),
            )
        })?;
        // another transaction may have finished the job while we waited
        if command.is_exhausted() {
            return Ok((0, command.total_execution));
        }
        let start = ensure_schedulable(&command)?;

        let now = self.clock.now_millis();
        let mut created = 0;
        let first_batch = command.total_execution + 1;

        for batch in first_batch..=MAX_COMMAND_EXECUTIONS {
            let include_cursor_day = command.last_execution_at.is_none();
            let cursor = command.last_execution_at.unwrap_or(start);
            let pickups =
                scheduler::compute_pickups(cursor, &command.picking_days_times, include_cursor_day);

            for (index, pickup) in pickups.iter().enumerate() {
                let data = pricing::price_subscription_order(
                    &command,
                    package,
                    pickup,
                    batch,
                    index as i32 + 1,
                )?;
                let mut order = tx.insert_order(&data, now).await?;
                order.order_code = order_code(&self.app_key, order.id);
                tx.update_order(&order).await?;
                created += 1;
            }

            command.last_execution_at = pickups.iter().map(|p| p.date).max().or(Some(cursor));
            command.total_execution = batch;
        }

        command.updated_at = now;
        tx.update_command(&command).await?;
        Ok((created, command.total_execution))
    }

    /// Materialize every ACTIVE command with batches left
    ///
    /// Each command runs in its own transaction; a failure is logged and
    /// counted without stopping the sweep.
    pub async fn materialize_pending(&self) -> AppResult<MaterializeSummary> {
        let ids = self.store.find_materializable_commands().await?;
        let mut summary = MaterializeSummary::default();

        for command_id in ids {
            summary.commands += 1;
            match self.materialize_next_batches(command_id).await {
                Ok(created) => summary.orders_created += created,
                Err(err) => {
                    summary.failures += 1;
                    tracing::error!(command_id, code = %err.code, error = %err, "Materialization failed");
                }
            }
        }

        tracing::info!(
            commands = summary.commands,
            orders_created = summary.orders_created,
            failures = summary.failures,
            "Materialization sweep finished"
        );
        Ok(summary)
    }
}
