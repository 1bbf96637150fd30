use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::{
    errors::ServiceError,
    events::{publish, Event, EventSender},
    models::product::insufficient_stock,
    models::{
        CustomerContact, DedupKey, NewOrder, OrderItem, OrderStatus, PaymentMethod, Product,
        StockReservation, TenantSummary,
    },
    repositories::{CustomerRepository, OrderRepository, ProductRepository, TenantRepository},
    services::customers::CustomerService,
};

/// Currency used when neither the request nor the service configuration names one.
pub const DEFAULT_CURRENCY: &str = "ARS";

/// One requested line. Price and name always come from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct OrderItemInput {
    pub product_id: i32,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    pub size_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CreateOrderInput {
    #[validate(length(min = 1, message = "Store is required"))]
    pub tenant_slug: String,
    pub customer: CustomerContact,
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    pub items: Vec<OrderItemInput>,
    pub payment_method: PaymentMethod,
    #[validate(length(max = 1000, message = "Notes are too long"))]
    pub notes: Option<String>,
    #[validate(length(equal = 3, message = "Currency must be 3 characters"))]
    pub currency: Option<String>,
}

impl CreateOrderInput {
    fn validate_all(&self) -> Result<(), ServiceError> {
        self.validate()?;
        self.customer.validate()?;
        for item in &self.items {
            item.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderResult {
    pub order_id: i32,
    pub total: Decimal,
}

/// Lines, total and reservations derived from the catalog for one request.
#[derive(Debug, Clone, PartialEq)]
struct PricedOrder {
    items: Vec<OrderItem>,
    total: Decimal,
    reservations: Vec<StockReservation>,
}

/// Admin order entry: validates every line against the tenant's catalog and
/// persists the order at catalog prices.
#[derive(Clone)]
pub struct OrderService {
    tenants: Arc<dyn TenantRepository>,
    products: Arc<dyn ProductRepository>,
    orders: Arc<dyn OrderRepository>,
    customers: CustomerService,
    event_sender: Option<Arc<EventSender>>,
    default_currency: String,
}

impl OrderService {
    pub fn new(
        tenants: Arc<dyn TenantRepository>,
        products: Arc<dyn ProductRepository>,
        customers: Arc<dyn CustomerRepository>,
        orders: Arc<dyn OrderRepository>,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            tenants,
            products,
            orders,
            customers: CustomerService::new(customers),
            event_sender,
            default_currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    pub fn with_default_currency(mut self, currency: impl Into<String>) -> Self {
        self.default_currency = currency.into();
        self
    }

    /// Creates an order from catalog data. Nothing is written unless every
    /// line passes validation.
    #[instrument(skip(self, input), fields(tenant = %input.tenant_slug, items = input.items.len()))]
    pub async fn create_order(
        &self,
        input: CreateOrderInput,
    ) -> Result<CreateOrderResult, ServiceError> {
        input.validate_all()?;

        let tenant = self
            .tenants
            .find_by_slug(&input.tenant_slug)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Store '{}' not found", input.tenant_slug)))?;

        let ids: Vec<i32> = input
            .items
            .iter()
            .map(|item| item.product_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let products = self.products.find_by_ids(&ids).await?;
        if products.is_empty() {
            return Err(ServiceError::ValidationError("No products found".to_string()));
        }

        let priced = price_order(&tenant, &products, &input.items)?;

        let customer_id = self
            .customers
            .upsert_customer(tenant.id, &input.customer, DedupKey::EmailAndPhone)
            .await?;

        let order_id = self
            .orders
            .create(
                NewOrder {
                    tenant_id: tenant.id,
                    customer_id,
                    items: priced.items,
                    total: priced.total,
                    currency: input
                        .currency
                        .unwrap_or_else(|| self.default_currency.clone()),
                    status: OrderStatus::Pending,
                    payment_method: input.payment_method,
                    notes: input.notes,
                },
                &priced.reservations,
            )
            .await?;

        info!(order_id, tenant_id = tenant.id, total = %priced.total, "Order created");
        publish(
            self.event_sender.as_deref(),
            Event::OrderCreated {
                order_id,
                tenant_id: tenant.id,
                total: priced.total,
            },
        )
        .await;

        Ok(CreateOrderResult {
            order_id,
            total: priced.total,
        })
    }
}

/// Checks ownership, availability and stock for every line and prices the
/// order from the catalog.
fn price_order(
    tenant: &TenantSummary,
    products: &[Product],
    items: &[OrderItemInput],
) -> Result<PricedOrder, ServiceError> {
    if let Some(foreign) = products.iter().find(|p| p.tenant_id != tenant.id) {
        warn!(
            tenant_id = tenant.id,
            product_id = foreign.id,
            product_tenant_id = foreign.tenant_id,
            "Rejected order referencing another store's product"
        );
        return Err(ServiceError::Forbidden(
            "product ownership mismatch".to_string(),
        ));
    }

    let catalog: HashMap<i32, &Product> = products.iter().map(|p| (p.id, p)).collect();
    let mut requested: HashMap<(i32, Option<String>), i32> = HashMap::new();
    let mut lines = Vec::with_capacity(items.len());
    let mut reservations = Vec::new();
    let mut total = Decimal::ZERO;

    for item in items {
        let product = catalog.get(&item.product_id).ok_or_else(|| {
            ServiceError::ValidationError(format!(
                "Product {} not found in this store",
                item.product_id
            ))
        })?;
        if !product.active {
            return Err(ServiceError::ValidationError(format!(
                "Product {} is not available",
                product.name
            )));
        }

        let stock = product.resolve_stock(item.size_id.as_deref())?;
        if let (true, Some(available)) = (tenant.enforces_stock, stock.available) {
            let already = requested
                .entry((product.id, stock.size_id.clone()))
                .or_insert(0);
            match already.checked_add(item.quantity) {
                Some(sum) if sum <= available => *already = sum,
                _ => return Err(insufficient_stock(&stock.label, available.max(0))),
            }
            reservations.push(StockReservation {
                product_id: product.id,
                size_id: stock.size_id.clone(),
                quantity: item.quantity,
                label: stock.label.clone(),
            });
        }

        let line = OrderItem {
            product_id: product.id,
            name: product.name.clone(),
            quantity: item.quantity,
            unit_price: product.price,
            size_id: stock.size_id,
            image: None,
            color: None,
        };
        total += line.line_total();
        lines.push(line);
    }

    Ok(PricedOrder {
        items: lines,
        total,
        reservations,
    })
}
