use super::*;

// ========================================================================
// Full lifecycle
// ========================================================================

#[tokio::test]
async fn test_standalone_order_full_lifecycle() {
    let env = setup();
    let order = create_standalone(&env).await;
    assert_eq!(order.status, OrderStatus::Created);
    assert_eq!(order.order_code, order_code(APP_KEY, order.id));

    let washing = evaluate(&env, &order, dec!(10)).await;
    assert_eq!(washing.status, OrderStatus::Washing);
    assert_eq!(washing.merchant_id, Some(MERCHANT));
    assert_eq!(
        washing.merchant_payment_status,
        Some(MerchantPaymentStatus::Pending)
    );

    let ready = env
        .lifecycle
        .submit_order_action(MERCHANT, order.id, MerchantAction::Washed)
        .await
        .unwrap();
    assert_eq!(ready.status, OrderStatus::Ready);
    assert_eq!(ready.merchant_id, Some(MERCHANT));

    let delivered = env
        .lifecycle
        .confirm_reception(CUSTOMER, order.id)
        .await
        .unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);
    assert_eq!(
        delivered.merchant_payment_status,
        Some(MerchantPaymentStatus::Reversed)
    );
    assert_eq!(env.store.order(order.id).unwrap(), delivered);
}

#[tokio::test]
async fn test_order_code_input_is_normalized() {
    let env = setup();
    let order = create_standalone(&env).await;
    let typed = format!("  #{} ", order.order_code.to_lowercase());

    let evaluated = env
        .lifecycle
        .evaluate_order(MERCHANT, &typed, dec!(4), false)
        .await
        .unwrap();
    assert_eq!(evaluated.id, order.id);
}

// ========================================================================
// Guards
// ========================================================================

#[tokio::test]
async fn test_evaluate_unknown_code_is_not_found() {
    let env = setup();
    create_standalone(&env).await;

    let err = env
        .lifecycle
        .evaluate_order(MERCHANT, "ZZZZZZ", dec!(4), false)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderNotFound);
    assert_eq!(err.code.category(), ErrorCategory::NotFound);

    let err = env
        .lifecycle
        .evaluate_order(MERCHANT, " # ", dec!(4), false)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationFailed);
}

#[tokio::test]
async fn test_evaluate_twice_is_not_found() {
    let env = setup();
    let order = create_standalone(&env).await;
    evaluate(&env, &order, dec!(4)).await;

    let err = env
        .lifecycle
        .evaluate_order(MERCHANT, &order.order_code, dec!(4), false)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderNotFound);
}

#[tokio::test]
async fn test_evaluate_rejects_bad_weight_without_side_effects() {
    let env = setup();
    let order = first_subscription_order(&env).await;
    set_spent(&env, dec!(5));

    let err = env
        .lifecycle
        .evaluate_order(MERCHANT, &order.order_code, dec!(0), false)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderInvalidWeight);
    assert_eq!(env.store.order(order.id).unwrap(), order);
    assert_eq!(env.store.command(COMMAND_ID).unwrap().command_spent_kg, dec!(5));
}

#[tokio::test]
async fn test_evaluate_rejects_oversized_weight() {
    let env = setup();
    let order = create_standalone(&env).await;
    let huge = Decimal::from_str_exact("79228162514264337593543950335").unwrap();

    for preview in [true, false] {
        let err = env
            .lifecycle
            .evaluate_order(MERCHANT, &order.order_code, huge, preview)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderInvalidWeight);
    }
    assert_eq!(env.store.order(order.id).unwrap(), order);
}

#[tokio::test]
async fn test_action_by_other_merchant_is_not_found() {
    let env = setup();
    let order = create_standalone(&env).await;
    let washing = evaluate(&env, &order, dec!(4)).await;

    let err = env
        .lifecycle
        .submit_order_action(MERCHANT + 1, order.id, MerchantAction::Washed)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderNotFound);
    assert_eq!(env.store.order(order.id).unwrap(), washing);
}

#[tokio::test]
async fn test_action_on_created_order_is_not_found() {
    let env = setup();
    let order = create_standalone(&env).await;

    let err = env
        .lifecycle
        .submit_order_action(MERCHANT, order.id, MerchantAction::Washed)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderNotFound);
}

#[tokio::test]
async fn test_confirm_requires_owner_and_ready() {
    let env = setup();
    let order = create_standalone(&env).await;
    evaluate(&env, &order, dec!(4)).await;

    // still washing
    let err = env
        .lifecycle
        .confirm_reception(CUSTOMER, order.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderNotFound);

    env.lifecycle
        .submit_order_action(MERCHANT, order.id, MerchantAction::Washed)
        .await
        .unwrap();

    let err = env
        .lifecycle
        .confirm_reception(CUSTOMER + 1, order.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderNotFound);
    assert_eq!(env.store.order(order.id).unwrap().status, OrderStatus::Ready);
}

// ========================================================================
// Rejection
// ========================================================================

#[tokio::test]
async fn test_rejection_restores_spent_kg_and_drops_invoice() {
    let env = setup();
    let order = first_subscription_order(&env).await;
    set_spent(&env, dec!(18));

    let washing = evaluate(&env, &order, dec!(5)).await;
    let invoice_id = washing.invoice_id.expect("overage invoice");
    assert_eq!(env.store.command(COMMAND_ID).unwrap().command_spent_kg, dec!(23));

    let rejected = env
        .lifecycle
        .submit_order_action(MERCHANT, order.id, MerchantAction::Rejected)
        .await
        .unwrap();

    assert_eq!(rejected.status, OrderStatus::Created);
    assert_eq!(rejected.merchant_id, None);
    assert_eq!(rejected.merchant_payment_status, None);
    assert_eq!(rejected.invoice_id, None);
    assert!(env.store.invoice(invoice_id).is_none());
    assert_eq!(env.store.command(COMMAND_ID).unwrap().command_spent_kg, dec!(18));

    // back in the pool: another merchant can pick it up
    let again = env
        .lifecycle
        .evaluate_order(MERCHANT + 1, &order.order_code, dec!(5), false)
        .await
        .unwrap();
    assert_eq!(again.merchant_id, Some(MERCHANT + 1));
    assert_eq!(env.store.command(COMMAND_ID).unwrap().command_spent_kg, dec!(23));
}

#[tokio::test]
async fn test_rejection_keeps_settled_invoice() {
    let env = setup();
    let order = create_standalone(&env).await;
    let washing = evaluate(&env, &order, dec!(4)).await;

    let mut invoice = invoice_of(&env, &washing);
    invoice.status = InvoiceStatus::Success;
    env.store.put_invoice(invoice.clone());

    let rejected = env
        .lifecycle
        .submit_order_action(MERCHANT, order.id, MerchantAction::Rejected)
        .await
        .unwrap();
    assert_eq!(rejected.status, OrderStatus::Created);
    assert_eq!(rejected.invoice_id, Some(invoice.id));
    assert_eq!(env.store.invoice(invoice.id).unwrap().status, InvoiceStatus::Success);
}

// ========================================================================
// Invoicing
// ========================================================================

#[tokio::test]
async fn test_pending_invoices_are_canceled_before_upsert() {
    let env = setup();
    let order = create_standalone(&env).await;
    env.store
        .put_invoice(settled_invoice(90, &order, dec!(999), InvoiceStatus::Pending));

    let washing = evaluate(&env, &order, dec!(4)).await;

    assert_eq!(env.store.invoice(90).unwrap().status, InvoiceStatus::Canceled);
    let current = invoice_of(&env, &washing);
    assert_ne!(current.id, 90);
    assert_eq!(current.status, InvoiceStatus::Created);

    let open: Vec<_> = env
        .store
        .find_invoices(CUSTOMER, &order.invoice_meta())
        .await
        .unwrap()
        .into_iter()
        .filter(|i| i.status.is_open())
        .collect();
    assert_eq!(open.len(), 1);
}

#[tokio::test]
async fn test_settled_payments_are_credited() {
    let env = setup();
    let order = create_standalone(&env).await;
    env.store
        .put_invoice(settled_invoice(80, &order, dec!(1000), InvoiceStatus::Success));

    // 4 kg * 550 = 2200 in fees
    let washing = evaluate(&env, &order, dec!(4)).await;
    assert_eq!(washing.customer_fees_to_pay, dec!(2200));
    assert_eq!(invoice_of(&env, &washing).amount, dec!(1200));
}

#[tokio::test]
async fn test_credit_larger_than_fees_clamps_to_zero() {
    let env = setup();
    let order = create_standalone(&env).await;
    env.store
        .put_invoice(settled_invoice(80, &order, dec!(5000), InvoiceStatus::Success));

    let washing = evaluate(&env, &order, dec!(4)).await;
    assert_eq!(invoice_of(&env, &washing).amount, Decimal::ZERO);
}

#[tokio::test]
async fn test_missing_payment_account_rolls_back() {
    let env = setup();
    let order = create_standalone(&env).await;
    let lifecycle = OrderLifecycle::new(
        env.store.clone(),
        env.clock.clone(),
        OrderSettings {
            operating_country: "SN".into(),
            ..settings()
        },
    );

    let err = lifecycle
        .evaluate_order(MERCHANT, &order.order_code, dec!(4), false)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PaymentAccountNotFound);
    assert_eq!(err.code.category(), ErrorCategory::Consistency);
    assert_eq!(env.store.order(order.id).unwrap(), order);
}

#[tokio::test]
async fn test_subscription_order_within_allowance_has_no_invoice() {
    let env = setup();
    let order = first_subscription_order(&env).await;

    let washing = evaluate(&env, &order, dec!(8)).await;
    assert_eq!(washing.customer_fees_to_pay, Decimal::ZERO);
    assert_eq!(washing.invoice_id, None);
    assert_eq!(env.store.command(COMMAND_ID).unwrap().command_spent_kg, dec!(8));
}

// ========================================================================
// Standalone creation and subscription quotes
// ========================================================================

#[tokio::test]
async fn test_standalone_creation_validates_catalog() {
    let env = setup();

    let mut request = standalone_request();
    request.package_id = 99;
    let err = env
        .lifecycle
        .create_standalone_order(request)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PackageNotFound);

    let mut request = standalone_request();
    request.addon_codes.push("STEAM".into());
    let err = env
        .lifecycle
        .create_standalone_order(request)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AddonNotFound);

    let mut request = standalone_request();
    request.addon_codes = vec!["IRON".into()];
    let err = env
        .lifecycle
        .create_standalone_order(request)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderInvalidAddons);

    assert_eq!(env.store.order_count(), 0);
}

#[tokio::test]
async fn test_standalone_creation_rejects_past_pickup() {
    let env = setup();
    env.clock.set(dt(2024, 3, 7, 7));

    let err = env
        .lifecycle
        .create_standalone_order(standalone_request())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationFailed);
}

#[tokio::test]
async fn test_subscription_window_uses_clock() {
    let env = setup();
    let rules = vec![PickupRule::new(4, "14:00", "16:00")];

    let window = env.lifecycle.subscription_window(&rules).unwrap();
    assert_eq!(window.start, dt(2024, 3, 7, 0));
    assert_eq!(window.end, dt(2024, 4, 6, 0));

    env.clock.advance(chrono::Duration::days(4));
    let later = env.lifecycle.subscription_window(&rules).unwrap();
    assert_eq!(later.start, dt(2024, 3, 14, 0));
}
