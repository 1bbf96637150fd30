mod common;

use assert_matches::assert_matches;
use common::TestApp;
use rust_decimal_macros::dec;
use serde_json::json;
use storefront_orders::{
    errors::PAYMENT_GATEWAY_ERROR,
    models::{CustomerContact, PaymentMethod},
    services::commerce::{CheckoutInput, CheckoutItem},
    ServiceError,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn checkout(payment_method: PaymentMethod) -> CheckoutInput {
    CheckoutInput {
        customer: CustomerContact {
            name: "Ana Diaz".into(),
            email: "ana@example.com".into(),
            phone: Some("555-0101".into()),
        },
        payment_method,
        items: vec![CheckoutItem {
            product_id: 1,
            name: "Remera".into(),
            unit_price: dec!(50),
            quantity: 2,
            size_id: Some("m".into()),
            image: Some("https://cdn.example.com/remera.png".into()),
            color: None,
        }],
        total: dec!(100),
        currency: "ARS".into(),
        tenant_slug: "demo".into(),
        return_url: None,
        locale: None,
    }
}

#[tokio::test]
async fn cash_checkout_creates_pending_order_only() {
    let app = TestApp::new().await;
    app.seed_tenant("demo", true).await;
    let service = app.factory().checkout_service().unwrap();

    let result = service.execute(checkout(PaymentMethod::Cash)).await.unwrap();

    assert!(result.preference_id.is_none());
    assert!(result.init_point.is_none());
    let orders = app.orders().await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, result.order_id);
    assert_eq!(orders[0].status, "pending");
    assert_eq!(orders[0].payment_method, "cash");
    assert_eq!(orders[0].total, dec!(100));
}

#[tokio::test]
async fn checkout_dedups_customers_by_email_only() {
    let app = TestApp::new().await;
    app.seed_tenant("demo", true).await;
    let service = app.factory().checkout_service().unwrap();

    service.execute(checkout(PaymentMethod::Cash)).await.unwrap();
    let mut again = checkout(PaymentMethod::Cash);
    again.customer.phone = Some("555-2222".into());
    service.execute(again).await.unwrap();

    let customers = app.customers().await;
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].phone.as_deref(), Some("555-2222"));
}

#[tokio::test]
async fn unknown_store_is_not_found() {
    let app = TestApp::new().await;
    let err = app
        .factory()
        .checkout_service()
        .unwrap()
        .execute(checkout(PaymentMethod::Cash))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
    assert!(app.orders().await.is_empty());
}

#[tokio::test]
async fn online_payment_without_credential_keeps_order_and_fails_validation() {
    let app = TestApp::new().await;
    app.seed_tenant("demo", true).await;

    let err = app
        .factory()
        .checkout_service()
        .unwrap()
        .execute(checkout(PaymentMethod::MercadoPago))
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::ValidationError(msg) if msg == "payment provider not configured");
    assert_eq!(app.orders().await.len(), 1);
}

#[tokio::test]
async fn online_payment_returns_preference() {
    let app = TestApp::new().await;
    let token = app
        .config
        .credential_cipher()
        .unwrap()
        .encrypt("APP_USR-123")
        .unwrap();
    app.seed_tenant_with_credential("demo", true, Some(token))
        .await;

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/checkout/preferences"))
        .and(header("authorization", "Bearer APP_USR-123"))
        .and(body_partial_json(json!({
            "external_reference": "1",
            "auto_return": "approved",
            "notification_url": "https://shop.example.com/api/webhooks/mercadopago?tenant=demo",
            "back_urls": {
                "success": "https://shop.example.com/es/demo/checkout/success",
                "failure": "https://shop.example.com/es/demo/checkout/failure",
                "pending": "https://shop.example.com/es/demo/checkout/pending"
            },
            "payer": {"email": "ana@example.com", "phone": {"number": "555-0101"}}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "123-pref",
            "init_point": "https://www.mercadopago.com/checkout?pref_id=123-pref"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = app
        .factory_with_provider_url(&server.uri())
        .checkout_service()
        .unwrap()
        .execute(checkout(PaymentMethod::MercadoPago))
        .await
        .unwrap();

    assert_eq!(result.order_id, 1);
    assert_eq!(result.preference_id.as_deref(), Some("123-pref"));
    assert_eq!(
        result.init_point.as_deref(),
        Some("https://www.mercadopago.com/checkout?pref_id=123-pref")
    );
}

#[tokio::test]
async fn provider_rejection_is_gateway_error_and_order_survives() {
    let app = TestApp::new().await;
    let token = app
        .config
        .credential_cipher()
        .unwrap()
        .encrypt("APP_USR-123")
        .unwrap();
    app.seed_tenant_with_credential("demo", true, Some(token))
        .await;

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/checkout/preferences"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "unit_price invalid",
            "error": "bad_request",
            "status": 400
        })))
        .mount(&server)
        .await;

    let err = app
        .factory_with_provider_url(&server.uri())
        .checkout_service()
        .unwrap()
        .execute(checkout(PaymentMethod::MercadoPago))
        .await
        .unwrap_err();

    assert_eq!(err.status_code().as_u16(), 502);
    assert_matches!(
        err,
        ServiceError::Gateway { code, message }
            if code == PAYMENT_GATEWAY_ERROR && message == "unit_price invalid"
    );

    let orders = app.orders().await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, "pending");
}

#[tokio::test]
async fn local_return_url_omits_auto_return() {
    let app = TestApp::new().await;
    let token = app
        .config
        .credential_cipher()
        .unwrap()
        .encrypt("APP_USR-123")
        .unwrap();
    app.seed_tenant_with_credential("demo", true, Some(token))
        .await;

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/checkout/preferences"))
        .and(body_partial_json(json!({
            "back_urls": {"success": "http://localhost:3000/en/demo/checkout/success"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "p",
            "init_point": "https://mp.test/p"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut input = checkout(PaymentMethod::MercadoPago);
    input.return_url = Some("http://localhost:3000".into());
    input.locale = Some("en".into());

    app.factory_with_provider_url(&server.uri())
        .checkout_service()
        .unwrap()
        .execute(input)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("auto_return").is_none());
    assert!(body.get("notification_url").is_none());
}
