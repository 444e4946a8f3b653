//! Database Module
//!
//! Data-access contracts for the order lifecycle and their two backends:
//! [`PgStore`] (PostgreSQL via sqlx) and [`MemoryStore`] (in-process).
//!
//! Every mutation runs inside a [`StoreTx`] that the caller passes
//! explicitly. Dropping a transaction without `commit` rolls it back.

pub mod memory;
pub mod repository;

pub use memory::MemoryStore;
pub use repository::{PgStore, PgTx};

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::error::AppError;
use shared::models::{
    Command, Invoice, InvoiceStatus, InvoiceUpsert, Order, OrderCreate, OrderStatus, Package,
    PaymentAccount, ServiceAddon,
};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepoError::NotFound("row".into()),
            other => RepoError::Database(other.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(what) => AppError::not_found(what),
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Read side and transaction factory
///
/// Reads on the store itself take no locks and never wait on an open
/// transaction. They are used for guard pre-checks and previews only.
#[async_trait]
pub trait LaundryStore: Send + Sync + 'static {
    type Tx: StoreTx;

    async fn begin(&self) -> RepoResult<Self::Tx>;

    /// Connectivity check for the health endpoint
    async fn ping(&self) -> RepoResult<()>;

    // ========== Orders ==========

    async fn find_order(&self, id: i64) -> RepoResult<Option<Order>>;

    /// Order by its public code, restricted to one status
    async fn find_order_by_code(&self, code: &str, status: OrderStatus)
    -> RepoResult<Option<Order>>;

    async fn find_orders_by_command(&self, command_id: i64) -> RepoResult<Vec<Order>>;

    // ========== Commands ==========

    async fn find_command(&self, id: i64) -> RepoResult<Option<Command>>;

    /// ACTIVE commands that still have batches to generate
    async fn find_materializable_commands(&self) -> RepoResult<Vec<i64>>;

    // ========== Catalog ==========

    async fn find_package(&self, id: i64) -> RepoResult<Option<Package>>;

    async fn find_addon(&self, code: &str) -> RepoResult<Option<ServiceAddon>>;

    async fn find_default_payment_account(&self, country: &str)
    -> RepoResult<Option<PaymentAccount>>;

    // ========== Invoices ==========

    async fn find_invoices(&self, user_id: i64, meta: &str) -> RepoResult<Vec<Invoice>>;
}

/// One atomic unit of work
///
/// `lock_*` reads hold the row until commit or rollback.
#[async_trait]
pub trait StoreTx: Send {
    async fn lock_order(&mut self, id: i64) -> RepoResult<Option<Order>>;

    async fn lock_command(&mut self, id: i64) -> RepoResult<Option<Command>>;

    /// Insert a new order, returning it with its assigned id
    async fn insert_order(&mut self, data: &OrderCreate, now: i64) -> RepoResult<Order>;

    async fn update_order(&mut self, order: &Order) -> RepoResult<()>;

    async fn update_command(&mut self, command: &Command) -> RepoResult<()>;

    async fn find_payment_account(&mut self, country: &str) -> RepoResult<Option<PaymentAccount>>;

    /// Sum of `amount` over invoices for `(user_id, meta)` in `status`
    async fn sum_invoices(
        &mut self,
        user_id: i64,
        meta: &str,
        status: InvoiceStatus,
    ) -> RepoResult<Decimal>;

    /// Move invoices for `(user_id, meta)` from `from` to CANCELED, returning the count
    async fn cancel_invoices(
        &mut self,
        user_id: i64,
        meta: &str,
        from: InvoiceStatus,
        now: i64,
    ) -> RepoResult<u64>;

    /// Update the open invoice for `(user_id, meta)` or insert a new one
    async fn upsert_invoice(&mut self, data: &InvoiceUpsert, now: i64) -> RepoResult<Invoice>;

    async fn find_invoice(&mut self, id: i64) -> RepoResult<Option<Invoice>>;

    async fn delete_invoice(&mut self, id: i64) -> RepoResult<bool>;

    async fn commit(self) -> RepoResult<()>;

    async fn rollback(self) -> RepoResult<()>;
}
