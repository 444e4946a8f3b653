use super::*;
use crate::db::{LaundryStore, MemoryStore};
use crate::pricing::PricingSettings;
use crate::utils::{Clock, FixedClock};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use shared::error::{ErrorCategory, ErrorCode};
use shared::models::{
    AddonKind, Command, CommandStatus, Invoice, InvoiceStatus, InvoiceType,
    MAX_COMMAND_EXECUTIONS, MerchantAction, MerchantPaymentStatus, Order, OrderAddon, OrderStatus,
    OrderType, Package, PaymentAccount, PickupRule, ServiceAddon, TimeSlot,
};
use std::sync::Arc;

mod test_flows;

const APP_KEY: &str = "test-app-key";
const MERCHANT: i64 = 501;
const CUSTOMER: i64 = 42;
const COMMAND_ID: i64 = 1;
const PACKAGE_ID: i64 = 1;

// ========================================================================
// Fixtures
// ========================================================================

struct TestEnv {
    store: Arc<MemoryStore>,
    clock: Arc<FixedClock>,
    lifecycle: OrderLifecycle<MemoryStore>,
    materializer: Materializer<MemoryStore>,
}

fn dt(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

fn settings() -> OrderSettings {
    OrderSettings {
        app_key: APP_KEY.to_string(),
        operating_country: "BJ".to_string(),
        pricing: PricingSettings::default(),
    }
}

/// 10 kg for 5000
fn package() -> Package {
    Package {
        id: PACKAGE_ID,
        code: "PK10".into(),
        name: "Pack 10kg".into(),
        amount: dec!(5000),
        kg: dec!(10),
    }
}

fn shipping_addon() -> ServiceAddon {
    ServiceAddon {
        code: "EXPRESS".into(),
        price: dec!(50),
        kind: AddonKind::Shipping {
            merchant_cost: dec!(20),
            duration_hours: 24,
        },
    }
}

fn ironing_addon() -> ServiceAddon {
    ServiceAddon {
        code: "IRON".into(),
        price: dec!(30),
        kind: AddonKind::Ironing {
            merchant_cost: dec!(10),
        },
    }
}

/// Monday 08-10 and Thursday 14-16, kg price 550, 20 kg allowance
fn subscription(id: i64) -> Command {
    Command {
        id,
        user_id: CUSTOMER,
        package_id: PACKAGE_ID,
        command_type: OrderType::Subscription,
        description: "Weekly wash".into(),
        order_min_price: dec!(5500),
        merchant_kg_unit_cost: dec!(320),
        delivery_per_day_cost: dec!(500),
        command_kg: dec!(20),
        command_spent_kg: dec!(0),
        picking_days_times: vec![
            PickupRule::new(1, "08:00", "10:00"),
            PickupRule::new(4, "14:00", "16:00"),
        ],
        // Monday
        command_start_at: Some(dt(2024, 3, 4, 9)),
        last_execution_at: None,
        total_execution: 0,
        addons: vec![shipping_addon()],
        status: CommandStatus::Active,
        created_at: 0,
        updated_at: 0,
    }
}

fn setup() -> TestEnv {
    let store = Arc::new(MemoryStore::new());
    store.put_package(package());
    store.put_addon(shipping_addon());
    store.put_addon(ironing_addon());
    store.put_payment_account(PaymentAccount {
        id: 1,
        country: "BJ".into(),
        label: "Mobile money".into(),
        is_default: true,
    });
    store.put_command(subscription(COMMAND_ID));

    // Monday 2024-03-04 07:00
    let clock = Arc::new(FixedClock::new(dt(2024, 3, 4, 7)));
    let dyn_clock: Arc<dyn Clock> = clock.clone();
    let lifecycle = OrderLifecycle::new(store.clone(), dyn_clock.clone(), settings());
    let materializer = Materializer::new(store.clone(), dyn_clock, APP_KEY);

    TestEnv {
        store,
        clock,
        lifecycle,
        materializer,
    }
}

// ========================================================================
// Helpers
// ========================================================================

fn standalone_request() -> NewStandaloneOrder {
    NewStandaloneOrder {
        user_id: CUSTOMER,
        package_id: PACKAGE_ID,
        title: "One-off wash".into(),
        addon_codes: vec!["EXPRESS".into()],
        pickup_date: NaiveDate::from_ymd_opt(2024, 3, 6).unwrap(),
        picking_hours: TimeSlot::new("08:00", "10:00"),
    }
}

async fn create_standalone(env: &TestEnv) -> Order {
    env.lifecycle
        .create_standalone_order(standalone_request())
        .await
        .expect("standalone order")
}

/// Materialize the default subscription and return its first order
async fn first_subscription_order(env: &TestEnv) -> Order {
    env.materializer
        .materialize_next_batches(COMMAND_ID)
        .await
        .expect("materialize");
    env.store
        .find_orders_by_command(COMMAND_ID)
        .await
        .unwrap()
        .into_iter()
        .next()
        .expect("at least one order")
}

fn set_spent(env: &TestEnv, spent: Decimal) {
    let mut command = env.store.command(COMMAND_ID).unwrap();
    command.command_spent_kg = spent;
    env.store.put_command(command);
}

async fn evaluate(env: &TestEnv, order: &Order, kg: Decimal) -> Order {
    env.lifecycle
        .evaluate_order(MERCHANT, &order.order_code, kg, false)
        .await
        .expect("evaluate")
}

fn invoice_of(env: &TestEnv, order: &Order) -> Invoice {
    env.store
        .invoice(order.invoice_id.expect("order has an invoice"))
        .expect("invoice exists")
}

fn settled_invoice(id: i64, order: &Order, amount: Decimal, status: InvoiceStatus) -> Invoice {
    Invoice {
        id,
        user_id: order.user_id,
        meta: order.invoice_meta(),
        amount,
        margin: dec!(0),
        status,
        invoice_type: InvoiceType::CommandLaundry,
        payment_account_id: 1,
        created_at: 0,
        updated_at: 0,
    }
}
