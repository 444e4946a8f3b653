//! Repository Module
//!
//! PostgreSQL implementation of the store contracts. Queries live as free
//! functions per table; [`PgStore`] and [`PgTx`] wire them to the traits.

pub mod catalog;
pub mod command;
pub mod invoice;
pub mod order;

pub use super::{RepoError, RepoResult};

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{
    Command, Invoice, InvoiceStatus, InvoiceUpsert, Order, OrderCreate, OrderStatus, Package,
    PaymentAccount, ServiceAddon,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};

use super::{LaundryStore, StoreTx};

/// Store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pub pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and apply pending migrations
    pub async fn connect(database_url: &str) -> RepoResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| RepoError::Database(format!("Failed to connect: {e}")))?;
        tracing::info!("Database connection established (PostgreSQL)");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| RepoError::Database(format!("Failed to apply migrations: {e}")))?;
        tracing::info!("Database migrations applied");

        Ok(Self { pool })
    }
}

#[async_trait]
impl LaundryStore for PgStore {
    type Tx = PgTx;

    async fn begin(&self) -> RepoResult<PgTx> {
        let tx = self.pool.begin().await?;
        Ok(PgTx { tx })
    }

    async fn ping(&self) -> RepoResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_order(&self, id: i64) -> RepoResult<Option<Order>> {
        order::find_by_id(&self.pool, id).await
    }

    async fn find_order_by_code(
        &self,
        code: &str,
        status: OrderStatus,
    ) -> RepoResult<Option<Order>> {
        order::find_by_code(&self.pool, code, status).await
    }

    async fn find_orders_by_command(&self, command_id: i64) -> RepoResult<Vec<Order>> {
        order::find_by_command(&self.pool, command_id).await
    }

    async fn find_command(&self, id: i64) -> RepoResult<Option<Command>> {
        command::find_by_id(&self.pool, id).await
    }

    async fn find_materializable_commands(&self) -> RepoResult<Vec<i64>> {
        command::find_materializable(&self.pool).await
    }

    async fn find_package(&self, id: i64) -> RepoResult<Option<Package>> {
        catalog::find_package(&self.pool, id).await
    }

    async fn find_addon(&self, code: &str) -> RepoResult<Option<ServiceAddon>> {
        catalog::find_addon(&self.pool, code).await
    }

    async fn find_default_payment_account(
        &self,
        country: &str,
    ) -> RepoResult<Option<PaymentAccount>> {
        catalog::find_default_payment_account(&self.pool, country).await
    }

    async fn find_invoices(&self, user_id: i64, meta: &str) -> RepoResult<Vec<Invoice>> {
        invoice::find_by_meta(&self.pool, user_id, meta).await
    }
}

/// Open PostgreSQL transaction
///
/// sqlx rolls back on drop when neither `commit` nor `rollback` ran.
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgTx {
    async fn lock_order(&mut self, id: i64) -> RepoResult<Option<Order>> {
        order::lock_by_id(&mut self.tx, id).await
    }

    async fn lock_command(&mut self, id: i64) -> RepoResult<Option<Command>> {
        command::lock_by_id(&mut self.tx, id).await
    }

    async fn insert_order(&mut self, data: &OrderCreate, now: i64) -> RepoResult<Order> {
        order::insert(&mut self.tx, data, now).await
    }

    async fn update_order(&mut self, order: &Order) -> RepoResult<()> {
        order::update(&mut self.tx, order).await
    }

    async fn update_command(&mut self, command: &Command) -> RepoResult<()> {
        command::update(&mut self.tx, command).await
    }

    async fn find_payment_account(&mut self, country: &str) -> RepoResult<Option<PaymentAccount>> {
        catalog::find_default_payment_account(&mut *self.tx, country).await
    }

    async fn sum_invoices(
        &mut self,
        user_id: i64,
        meta: &str,
        status: InvoiceStatus,
    ) -> RepoResult<Decimal> {
        invoice::sum_amount(&mut self.tx, user_id, meta, status).await
    }

    async fn cancel_invoices(
        &mut self,
        user_id: i64,
        meta: &str,
        from: InvoiceStatus,
        now: i64,
    ) -> RepoResult<u64> {
        invoice::cancel(&mut self.tx, user_id, meta, from, now).await
    }

    async fn upsert_invoice(&mut self, data: &InvoiceUpsert, now: i64) -> RepoResult<Invoice> {
        invoice::upsert(&mut self.tx, data, now).await
    }

    async fn find_invoice(&mut self, id: i64) -> RepoResult<Option<Invoice>> {
        invoice::find_by_id(&mut *self.tx, id).await
    }

    async fn delete_invoice(&mut self, id: i64) -> RepoResult<bool> {
        invoice::delete(&mut self.tx, id).await
    }

    async fn commit(self) -> RepoResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> RepoResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
