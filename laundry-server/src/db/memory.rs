//! In-process store
//!
//! Tables live behind a `parking_lot::RwLock`. A transaction takes the
//! writer gate (one open transaction at a time, the in-memory stand-in for
//! row locks), works on a private copy and publishes it on commit. Dropping
//! the transaction discards the copy and releases the gate.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use shared::models::{
    Command, CommandStatus, Invoice, InvoiceStatus, InvoiceUpsert, Order, OrderCreate,
    OrderStatus, Package, PaymentAccount, ServiceAddon,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{LaundryStore, RepoError, RepoResult, StoreTx};

#[derive(Debug, Clone, Default)]
struct Tables {
    orders: BTreeMap<i64, Order>,
    commands: BTreeMap<i64, Command>,
    invoices: BTreeMap<i64, Invoice>,
    packages: BTreeMap<i64, Package>,
    addons: BTreeMap<String, ServiceAddon>,
    payment_accounts: BTreeMap<i64, PaymentAccount>,
    next_order_id: i64,
    next_invoice_id: i64,
}

impl Tables {
    fn default_payment_account(&self, country: &str) -> Option<PaymentAccount> {
        self.payment_accounts
            .values()
            .find(|a| a.is_default && a.country.eq_ignore_ascii_case(country))
            .cloned()
    }

    fn invoices_for<'a>(
        &'a self,
        user_id: i64,
        meta: &'a str,
    ) -> impl Iterator<Item = &'a Invoice> + 'a {
        self.invoices
            .values()
            .filter(move |i| i.user_id == user_id && i.meta == meta)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<Tables>>,
    gate: Arc<Mutex<()>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Seeding ==========

    pub fn put_package(&self, package: Package) {
        self.data.write().packages.insert(package.id, package);
    }

    pub fn put_addon(&self, addon: ServiceAddon) {
        self.data.write().addons.insert(addon.code.clone(), addon);
    }

    pub fn put_payment_account(&self, account: PaymentAccount) {
        self.data
            .write()
            .payment_accounts
            .insert(account.id, account);
    }

    pub fn put_command(&self, command: Command) {
        self.data.write().commands.insert(command.id, command);
    }

    pub fn put_order(&self, order: Order) {
        let mut data = self.data.write();
        data.next_order_id = data.next_order_id.max(order.id);
        data.orders.insert(order.id, order);
    }

    pub fn put_invoice(&self, invoice: Invoice) {
        let mut data = self.data.write();
        data.next_invoice_id = data.next_invoice_id.max(invoice.id);
        data.invoices.insert(invoice.id, invoice);
    }

    // ========== Inspection ==========

    pub fn order(&self, id: i64) -> Option<Order> {
        self.data.read().orders.get(&id).cloned()
    }

    pub fn command(&self, id: i64) -> Option<Command> {
        self.data.read().commands.get(&id).cloned()
    }

    pub fn invoice(&self, id: i64) -> Option<Invoice> {
        self.data.read().invoices.get(&id).cloned()
    }

    pub fn order_count(&self) -> usize {
        self.data.read().orders.len()
    }
}

#[async_trait]
impl LaundryStore for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> RepoResult<MemoryTx> {
        let guard = self.gate.clone().lock_owned().await;
        let work = self.data.read().clone();
        Ok(MemoryTx {
            data: self.data.clone(),
            work,
            _guard: guard,
        })
    }

    async fn ping(&self) -> RepoResult<()> {
        Ok(())
    }

    async fn find_order(&self, id: i64) -> RepoResult<Option<Order>> {
        Ok(self.data.read().orders.get(&id).cloned())
    }

    async fn find_order_by_code(
        &self,
        code: &str,
        status: OrderStatus,
    ) -> RepoResult<Option<Order>> {
        Ok(self
            .data
            .read()
            .orders
            .values()
            .find(|o| o.order_code == code && o.status == status)
            .cloned())
    }

    async fn find_orders_by_command(&self, command_id: i64) -> RepoResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .data
            .read()
            .orders
            .values()
            .filter(|o| o.command_id == Some(command_id))
            .cloned()
            .collect();
        orders.sort_by_key(|o| (o.command_execution_index, o.order_execution_index));
        Ok(orders)
    }

    async fn find_command(&self, id: i64) -> RepoResult<Option<Command>> {
        Ok(self.data.read().commands.get(&id).cloned())
    }

    async fn find_materializable_commands(&self) -> RepoResult<Vec<i64>> {
        Ok(self
            .data
            .read()
            .commands
            .values()
            .filter(|c| c.status == CommandStatus::Active && !c.is_exhausted())
            .map(|c| c.id)
            .collect())
    }

    async fn find_package(&self, id: i64) -> RepoResult<Option<Package>> {
        Ok(self.data.read().packages.get(&id).cloned())
    }

    async fn find_addon(&self, code: &str) -> RepoResult<Option<ServiceAddon>> {
        Ok(self.data.read().addons.get(code).cloned())
    }

    async fn find_default_payment_account(
        &self,
        country: &str,
    ) -> RepoResult<Option<PaymentAccount>> {
        Ok(self.data.read().default_payment_account(country))
    }

    async fn find_invoices(&self, user_id: i64, meta: &str) -> RepoResult<Vec<Invoice>> {
        Ok(self
            .data
            .read()
            .invoices_for(user_id, meta)
            .cloned()
            .collect())
    }
}

/// Transaction over a private copy of the tables
pub struct MemoryTx {
    data: Arc<RwLock<Tables>>,
    work: Tables,
    _guard: OwnedMutexGuard<()>,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn lock_order(&mut self, id: i64) -> RepoResult<Option<Order>> {
        Ok(self.work.orders.get(&id).cloned())
    }

    async fn lock_command(&mut self, id: i64) -> RepoResult<Option<Command>> {
        Ok(self.work.commands.get(&id).cloned())
    }

    async fn insert_order(&mut self, data: &OrderCreate, now: i64) -> RepoResult<Order> {
        self.work.next_order_id += 1;
        let order = Order::from_create(self.work.next_order_id, data.clone(), now);
        self.work.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn update_order(&mut self, order: &Order) -> RepoResult<()> {
        match self.work.orders.get_mut(&order.id) {
            Some(slot) => {
                *slot = order.clone();
                Ok(())
            }
            None => Err(RepoError::NotFound(format!("order {}", order.id))),
        }
    }

    async fn update_command(&mut self, command: &Command) -> RepoResult<()> {
        match self.work.commands.get_mut(&command.id) {
            Some(slot) => {
                *slot = command.clone();
                Ok(())
            }
            None => Err(RepoError::NotFound(format!("command {}", command.id))),
        }
    }

    async fn find_payment_account(&mut self, country: &str) -> RepoResult<Option<PaymentAccount>> {
        Ok(self.work.default_payment_account(country))
    }

    async fn sum_invoices(
        &mut self,
        user_id: i64,
        meta: &str,
        status: InvoiceStatus,
    ) -> RepoResult<Decimal> {
        Ok(self
            .work
            .invoices_for(user_id, meta)
            .filter(|i| i.status == status)
            .map(|i| i.amount)
            .sum())
    }

    async fn cancel_invoices(
        &mut self,
        user_id: i64,
        meta: &str,
        from: InvoiceStatus,
        now: i64,
    ) -> RepoResult<u64> {
        let mut count = 0;
        for invoice in self.work.invoices.values_mut() {
            if invoice.user_id == user_id && invoice.meta == meta && invoice.status == from {
                invoice.status = InvoiceStatus::Canceled;
                invoice.updated_at = now;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn upsert_invoice(&mut self, data: &InvoiceUpsert, now: i64) -> RepoResult<Invoice> {
        let open = self
            .work
            .invoices
            .values_mut()
            .filter(|i| i.user_id == data.user_id && i.meta == data.meta && i.status.is_open())
            .max_by_key(|i| i.id);

        if let Some(invoice) = open {
            invoice.amount = data.amount;
            invoice.margin = data.margin;
            invoice.status = data.status;
            invoice.invoice_type = data.invoice_type;
            invoice.payment_account_id = data.payment_account_id;
            invoice.updated_at = now;
            return Ok(invoice.clone());
        }

        self.work.next_invoice_id += 1;
        let invoice = Invoice {
            id: self.work.next_invoice_id,
            user_id: data.user_id,
            meta: data.meta.clone(),
            amount: data.amount,
            margin: data.margin,
            status: data.status,
            invoice_type: data.invoice_type,
            payment_account_id: data.payment_account_id,
            created_at: now,
            updated_at: now,
        };
        self.work.invoices.insert(invoice.id, invoice.clone());
        Ok(invoice)
    }

    async fn find_invoice(&mut self, id: i64) -> RepoResult<Option<Invoice>> {
        Ok(self.work.invoices.get(&id).cloned())
    }

    async fn delete_invoice(&mut self, id: i64) -> RepoResult<bool> {
        Ok(self.work.invoices.remove(&id).is_some())
    }

    async fn commit(self) -> RepoResult<()> {
        *self.data.write() = self.work;
        Ok(())
    }

    async fn rollback(self) -> RepoResult<()> {
        Ok(())
    }
}
