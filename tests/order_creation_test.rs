mod common;

use assert_matches::assert_matches;
use common::TestApp;
use rust_decimal_macros::dec;
use rust_decimal::Decimal;
use storefront_orders::{
    models::{CustomerContact, NewOrder, OrderStatus, PaymentMethod, StockReservation},
    repositories::{OrderRepository, SeaOrmOrderRepository},
    services::orders::{CreateOrderInput, OrderItemInput},
    ServiceError,
};

fn contact() -> CustomerContact {
    CustomerContact {
        name: "Ana Diaz".into(),
        email: "ana@example.com".into(),
        phone: Some("555-0101".into()),
    }
}

fn order(slug: &str, items: Vec<OrderItemInput>) -> CreateOrderInput {
    CreateOrderInput {
        tenant_slug: slug.into(),
        customer: contact(),
        items,
        payment_method: PaymentMethod::Cash,
        notes: Some("leave at the door".into()),
        currency: None,
    }
}

fn item(product_id: i32, quantity: i32, size_id: Option<&str>) -> OrderItemInput {
    OrderItemInput {
        product_id,
        quantity,
        size_id: size_id.map(str::to_string),
    }
}

#[tokio::test]
async fn stock_limit_then_successful_order() {
    let app = TestApp::new().await;
    let tenant = app.seed_tenant("demo", true).await;
    let product = app
        .seed_product(tenant.id, "Remera", dec!(50), Some(1))
        .await;
    let service = app.factory().order_service();

    let err = service
        .create_order(order("demo", vec![item(product.id, 2, None)]))
        .await
        .unwrap_err();
    assert_matches!(
        err,
        ServiceError::ValidationError(msg) if msg == "Insufficient stock for Remera. Available: 1"
    );
    assert!(app.orders().await.is_empty());
    assert!(app.customers().await.is_empty());

    let result = service
        .create_order(order("demo", vec![item(product.id, 1, None)]))
        .await
        .unwrap();
    assert_eq!(result.total, dec!(50));

    let orders = app.orders().await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, result.order_id);
    assert_eq!(orders[0].status, "pending");
    assert_eq!(orders[0].total, dec!(50));
    assert_eq!(orders[0].currency, "ARS");
    assert_eq!(app.product_stock(product.id).await, Some(0));
}

#[tokio::test]
async fn cross_tenant_product_is_forbidden_and_nothing_is_written() {
    let app = TestApp::new().await;
    let mine = app.seed_tenant("mine", true).await;
    let theirs = app.seed_tenant("theirs", true).await;
    let own = app.seed_product(mine.id, "Own", dec!(10), Some(5)).await;
    let foreign = app
        .seed_product(theirs.id, "Foreign", dec!(10), Some(5))
        .await;

    let err = app
        .factory()
        .order_service()
        .create_order(order(
            "mine",
            vec![item(own.id, 1, None), item(foreign.id, 1, None)],
        ))
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::Forbidden(_));
    assert!(app.orders().await.is_empty());
    assert_eq!(app.product_stock(own.id).await, Some(5));
}

#[tokio::test]
async fn unknown_store_and_missing_products() {
    let app = TestApp::new().await;
    let tenant = app.seed_tenant("demo", true).await;
    let service = app.factory().order_service();

    assert_matches!(
        service
            .create_order(order("nope", vec![item(1, 1, None)]))
            .await,
        Err(ServiceError::NotFound(_))
    );
    assert_matches!(
        service
            .create_order(order("demo", vec![item(999, 1, None)]))
            .await,
        Err(ServiceError::ValidationError(msg)) if msg == "No products found"
    );

    let product = app.seed_product(tenant.id, "Gorra", dec!(5), None).await;
    assert_matches!(
        service
            .create_order(order(
                "demo",
                vec![item(product.id, 1, None), item(999, 1, None)]
            ))
            .await,
        Err(ServiceError::ValidationError(msg)) if msg.contains("999")
    );
}

#[tokio::test]
async fn inactive_product_is_rejected() {
    let app = TestApp::new().await;
    let tenant = app.seed_tenant("demo", true).await;
    let product = app.seed_product(tenant.id, "Old", dec!(5), Some(10)).await;
    let id = product.id;
    app.deactivate(product).await;

    let err = app
        .factory()
        .order_service()
        .create_order(order("demo", vec![item(id, 1, None)]))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn food_store_ignores_stock() {
    let app = TestApp::new().await;
    let tenant = app.seed_tenant("pizzeria", false).await;
    let pizza = app
        .seed_product(tenant.id, "Muzzarella", dec!(12.5), Some(0))
        .await;

    let result = app
        .factory()
        .order_service()
        .create_order(order("pizzeria", vec![item(pizza.id, 4, None)]))
        .await
        .unwrap();

    assert_eq!(result.total, dec!(50));
    assert_eq!(app.product_stock(pizza.id).await, Some(0));
}

#[tokio::test]
async fn untracked_product_has_no_limit() {
    let app = TestApp::new().await;
    let tenant = app.seed_tenant("demo", true).await;
    let sticker = app.seed_product(tenant.id, "Sticker", dec!(1), None).await;

    let result = app
        .factory()
        .order_service()
        .create_order(order("demo", vec![item(sticker.id, 500, None)]))
        .await
        .unwrap();
    assert_eq!(result.total, dec!(500));
    assert_eq!(app.product_stock(sticker.id).await, None);
}

#[tokio::test]
async fn sized_products_draw_from_size_stock() {
    let app = TestApp::new().await;
    let tenant = app.seed_tenant("demo", true).await;
    let shirt = app.seed_product(tenant.id, "Remera", dec!(20), None).await;
    let medium = app.seed_size(shirt.id, "m", "M", 2).await;
    let large = app.seed_size(shirt.id, "l", "L", 1).await;
    let service = app.factory().order_service();

    let err = service
        .create_order(order("demo", vec![item(shirt.id, 2, Some("l"))]))
        .await
        .unwrap_err();
    assert_matches!(
        err,
        ServiceError::ValidationError(msg) if msg == "Insufficient stock for Remera (L). Available: 1"
    );

    let err = service
        .create_order(order("demo", vec![item(shirt.id, 1, Some("xxl"))]))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(msg) if msg.contains("Invalid size"));

    let result = service
        .create_order(order(
            "demo",
            vec![item(shirt.id, 2, Some("m")), item(shirt.id, 1, Some("l"))],
        ))
        .await
        .unwrap();
    assert_eq!(result.total, dec!(60));
    assert_eq!(app.size_stock(medium.id).await, 0);
    assert_eq!(app.size_stock(large.id).await, 0);
}

#[tokio::test]
async fn repeat_customer_is_deduplicated_by_email_and_phone() {
    let app = TestApp::new().await;
    let tenant = app.seed_tenant("demo", true).await;
    let product = app.seed_product(tenant.id, "Taza", dec!(8), None).await;
    let service = app.factory().order_service();

    service
        .create_order(order("demo", vec![item(product.id, 1, None)]))
        .await
        .unwrap();
    let mut again = order("demo", vec![item(product.id, 1, None)]);
    again.customer.name = "Ana M. Diaz".into();
    again.customer.email = "ANA@example.com".into();
    service.create_order(again).await.unwrap();

    let customers = app.customers().await;
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].name, "Ana M. Diaz");

    let mut other_phone = order("demo", vec![item(product.id, 1, None)]);
    other_phone.customer.phone = Some("555-9999".into());
    service.create_order(other_phone).await.unwrap();
    assert_eq!(app.customers().await.len(), 2);
}

#[tokio::test]
async fn concurrent_orders_cannot_oversell() {
    let app = TestApp::new().await;
    let tenant = app.seed_tenant("demo", true).await;
    let last = app.seed_product(tenant.id, "Last one", dec!(30), Some(1)).await;
    let service = app.factory().order_service();

    let (a, b) = tokio::join!(
        service.create_order(order("demo", vec![item(last.id, 1, None)])),
        service.create_order(order("demo", vec![item(last.id, 1, None)])),
    );

    let outcomes = [a, b];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes.iter().any(|r| matches!(
        r,
        Err(ServiceError::ValidationError(msg)) if msg.starts_with("Insufficient stock for Last one")
    )));
    assert_eq!(app.orders().await.len(), 1);
    assert_eq!(app.product_stock(last.id).await, Some(0));
}

#[tokio::test]
async fn failed_reservation_reports_stock_before_this_order() {
    let app = TestApp::new().await;
    let tenant = app.seed_tenant("demo", true).await;
    let mug = app.seed_product(tenant.id, "Taza", dec!(8), Some(3)).await;
    let repo = SeaOrmOrderRepository::new(app.db.clone());
    let reservation = StockReservation {
        product_id: mug.id,
        size_id: None,
        quantity: 2,
        label: "Taza".into(),
    };

    let err = repo
        .create(
            NewOrder {
                tenant_id: tenant.id,
                customer_id: 1,
                items: vec![],
                total: Decimal::ZERO,
                currency: "ARS".into(),
                status: OrderStatus::Pending,
                payment_method: PaymentMethod::Cash,
                notes: None,
            },
            &[reservation.clone(), reservation],
        )
        .await
        .unwrap_err();

    assert_matches!(
        err,
        ServiceError::ValidationError(msg) if msg == "Insufficient stock for Taza. Available: 3"
    );
    assert_eq!(app.product_stock(mug.id).await, Some(3));
    assert!(app.orders().await.is_empty());
}
