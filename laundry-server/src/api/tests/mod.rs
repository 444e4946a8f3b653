use super::*;
use crate::core::Config;
use crate::db::MemoryStore;
use crate::orders::{MaterializeSummary, order_code};
use crate::utils::{ErrorCode, FixedClock};
use axum::body::Body;
use chrono::NaiveDate;
use http::Request;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use shared::models::{
    AddonKind, Order, OrderStatus, Package, PaymentAccount, ServiceAddon,
};
use tower::ServiceExt;

const APP_KEY: &str = "api-test-key";
const MERCHANT: &str = "501";
const CUSTOMER: &str = "42";

// ========================================================================
// Fixtures
// ========================================================================

fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/laundry_test".into(),
        http_port: 0,
        environment: "development".into(),
        app_key: APP_KEY.into(),
        operating_country: "BJ".into(),
        standalone_merchant_kg_cost: Decimal::from(300),
        standalone_delivery_cost: Decimal::from(500),
        subscription_delivery_delay_hours: 48,
        log_level: "debug".into(),
        log_dir: None,
        request_timeout_ms: 5000,
    }
}

fn seeded_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    store.put_package(Package {
        id: 1,
        code: "PK10".into(),
        name: "Pack 10kg".into(),
        amount: dec!(5000),
        kg: dec!(10),
    });
    store.put_addon(ServiceAddon {
        code: "EXPRESS".into(),
        price: dec!(50),
        kind: AddonKind::Shipping {
            merchant_cost: dec!(20),
            duration_hours: 24,
        },
    });
    store.put_payment_account(PaymentAccount {
        id: 1,
        country: "BJ".into(),
        label: "Mobile money".into(),
        is_default: true,
    });

    // Monday 2024-03-04 07:00
    let now = NaiveDate::from_ymd_opt(2024, 3, 4)
        .unwrap()
        .and_hms_opt(7, 0, 0)
        .unwrap();
    let state = ServerState::new(test_config(), store.clone(), Arc::new(FixedClock::new(now)));
    (build_app(state), store)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, caller: Option<(&str, &str)>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some((name, value)) = caller {
        builder = builder.header(name, value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn create_body() -> Value {
    json!({
        "package_id": 1,
        "title": "One-off wash",
        "addon_codes": ["EXPRESS"],
        "pickup_date": "2024-03-06",
        "picking_hours": ["08:00", "10:00"]
    })
}

async fn create_order(app: &Router) -> Order {
    let (status, body) = send(
        app,
        post_json("/api/orders", Some((extractor::USER_HEADER, CUSTOMER)), create_body()),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    serde_json::from_value(body["data"].clone()).unwrap()
}

// ========================================================================
// Health
// ========================================================================

#[tokio::test]
async fn test_health() {
    let (app, _) = seeded_app();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));

    let request = Request::builder()
        .uri("/health")
        .header(REQUEST_ID_HEADER, "trace-77")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()[REQUEST_ID_HEADER], "trace-77");

    let request = Request::builder()
        .uri("/health/detailed")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"]["status"], "ok");
}

// ========================================================================
// Orders
// ========================================================================

#[tokio::test]
async fn test_order_flow_over_http() {
    let (app, store) = seeded_app();
    let order = create_order(&app).await;
    assert_eq!(order.order_code, order_code(APP_KEY, order.id));
    assert_eq!(order.user_id, 42);

    let (status, body) = send(
        &app,
        post_json(
            "/api/orders/evaluate",
            Some((extractor::MERCHANT_HEADER, MERCHANT)),
            json!({ "order_code": format!("#{}", order.order_code), "weight_kg": "10", "preview": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let fees: Decimal = body["data"]["customer_fees_to_pay"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(fees, dec!(5500));
    assert_eq!(store.order(order.id).unwrap().status, OrderStatus::Created);

    let (status, body) = send(
        &app,
        post_json(
            "/api/orders/evaluate",
            Some((extractor::MERCHANT_HEADER, MERCHANT)),
            json!({ "order_code": order.order_code, "weight_kg": "10" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["status"], "WASHING");

    let uri = format!("/api/orders/{}/action", order.id);
    let (status, body) = send(
        &app,
        post_json(&uri, Some((extractor::MERCHANT_HEADER, MERCHANT)), json!({ "action": "WASHED" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "READY");

    let uri = format!("/api/orders/{}/delivered", order.id);
    let (status, body) = send(
        &app,
        post_json(&uri, Some((extractor::USER_HEADER, CUSTOMER)), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "DELIVERED");
    assert_eq!(body["data"]["merchant_payment_status"], "REVERSED");
}

#[tokio::test]
async fn test_unknown_order_is_404() {
    let (app, _) = seeded_app();
    let (status, body) = send(
        &app,
        post_json(
            "/api/orders/evaluate",
            Some((extractor::MERCHANT_HEADER, MERCHANT)),
            json!({ "order_code": "ABCDEF", "weight_kg": "3" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], u16::from(ErrorCode::OrderNotFound));
}

#[tokio::test]
async fn test_missing_caller_header_is_rejected() {
    let (app, store) = seeded_app();
    let (status, _) = send(&app, post_json("/api/orders", None, create_body())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        post_json("/api/orders", Some((extractor::USER_HEADER, "abc")), create_body()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(store.order_count(), 0);
}

#[tokio::test]
async fn test_invalid_weight_is_rejected_by_validation() {
    let (app, store) = seeded_app();
    let order = create_order(&app).await;

    for weight in ["-1", "79228162514264337593543950335"] {
        let (status, body) = send(
            &app,
            post_json(
                "/api/orders/evaluate",
                Some((extractor::MERCHANT_HEADER, MERCHANT)),
                json!({ "order_code": order.order_code, "weight_kg": weight, "preview": true }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{weight}");
        assert_eq!(body["code"], u16::from(ErrorCode::ValidationFailed));
        assert!(body["message"].as_str().unwrap().contains("weight_kg"));
    }
    assert_eq!(store.order(order.id).unwrap().status, OrderStatus::Created);
}

// ========================================================================
// Commands and subscriptions
// ========================================================================

#[tokio::test]
async fn test_materialize_unknown_command_is_404() {
    let (app, _) = seeded_app();
    let (status, _) = send(&app, post_json("/api/commands/9/materialize", None, json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_materialize_sweep_with_nothing_to_do() {
    let (app, _) = seeded_app();
    let (status, body) = send(&app, post_json("/api/commands/materialize", None, json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    let summary: MaterializeSummary = serde_json::from_value(body["data"].clone()).unwrap();
    assert_eq!(summary, MaterializeSummary::default());
}

#[tokio::test]
async fn test_subscription_window() {
    let (app, _) = seeded_app();
    let (status, body) = send(
        &app,
        post_json(
            "/api/subscriptions/window",
            None,
            json!({ "picking_days_times": [[4, ["14:00", "16:00"]]] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["start"], "2024-03-07T00:00:00");
    assert_eq!(body["data"]["end"], "2024-04-06T00:00:00");

    let (status, body) = send(
        &app,
        post_json(
            "/api/subscriptions/window",
            None,
            json!({ "picking_days_times": [[9, ["14:00", "16:00"]]] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], u16::from(ErrorCode::InvalidPickupRule));
}
