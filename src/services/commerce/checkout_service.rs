use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use url::{Host, Url};
use validator::Validate;

use crate::{
    errors::ServiceError,
    events::{publish, Event, EventSender},
    models::{CustomerContact, DedupKey, NewOrder, OrderItem, OrderStatus, PaymentMethod},
    repositories::{CustomerRepository, OrderRepository, TenantRepository},
    services::customers::CustomerService,
    services::payment_credentials::CredentialCipher,
    services::payments::{
        BackUrls, PaymentProvider, PreferenceItem, PreferencePayer, PreferencePhone,
        PreferenceRequest,
    },
};

/// Locale used in return URLs when the request does not carry one.
pub const DEFAULT_LOCALE: &str = "es";

/// A cart line as submitted by the storefront. Name and price are trusted as sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CheckoutItem {
    pub product_id: i32,
    #[validate(length(min = 1, message = "Item name is required"))]
    pub name: String,
    pub unit_price: Decimal,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    pub size_id: Option<String>,
    pub image: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CheckoutInput {
    pub customer: CustomerContact,
    pub payment_method: PaymentMethod,
    #[validate(length(min = 1, message = "Cart is empty"))]
    pub items: Vec<CheckoutItem>,
    pub total: Decimal,
    #[validate(length(equal = 3, message = "Currency must be 3 characters"))]
    pub currency: String,
    #[validate(length(min = 1, message = "Store is required"))]
    pub tenant_slug: String,
    /// Storefront origin the buyer should come back to after paying.
    #[validate(url(message = "Return URL must be an absolute URL"))]
    pub return_url: Option<String>,
    pub locale: Option<String>,
}

impl CheckoutInput {
    fn validate_all(&self) -> Result<(), ServiceError> {
        self.validate()?;
        self.customer.validate()?;
        for item in &self.items {
            item.validate()?;
            if item.unit_price.is_sign_negative() {
                return Err(ServiceError::ValidationError(format!(
                    "Price for {} must not be negative",
                    item.name
                )));
            }
        }
        if self.total.is_sign_negative() {
            return Err(ServiceError::ValidationError(
                "Total must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutResult {
    pub order_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preference_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_point: Option<String>,
}

/// URLs and defaults the checkout needs to build payment preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSettings {
    pub public_base_url: String,
    /// Public origin that receives provider notifications. Falls back to the return base.
    pub webhook_base_url: Option<String>,
    pub default_locale: String,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            public_base_url: "http://localhost:3000".to_string(),
            webhook_base_url: None,
            default_locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

/// Public storefront checkout: records the order and, for online payment
/// methods, opens a payment preference with the store's own provider account.
#[derive(Clone)]
pub struct CheckoutService {
    tenants: Arc<dyn TenantRepository>,
    orders: Arc<dyn OrderRepository>,
    customers: CustomerService,
    provider: Arc<dyn PaymentProvider>,
    cipher: CredentialCipher,
    settings: CheckoutSettings,
    event_sender: Option<Arc<EventSender>>,
}

impl CheckoutService {
    pub fn new(
        tenants: Arc<dyn TenantRepository>,
        customers: Arc<dyn CustomerRepository>,
        orders: Arc<dyn OrderRepository>,
        provider: Arc<dyn PaymentProvider>,
        cipher: CredentialCipher,
        settings: CheckoutSettings,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            tenants,
            orders,
            customers: CustomerService::new(customers),
            provider,
            cipher,
            settings,
            event_sender,
        }
    }

    /// Persists a pending order and, unless paid in cash, creates the payment
    /// preference. A provider failure leaves the pending order in place.
    #[instrument(skip(self, input), fields(tenant = %input.tenant_slug, payment_method = %input.payment_method))]
    pub async fn execute(&self, input: CheckoutInput) -> Result<CheckoutResult, ServiceError> {
        input.validate_all()?;

        let tenant = self
            .tenants
            .find_by_slug(&input.tenant_slug)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Store '{}' not found", input.tenant_slug)))?;

        let customer_id = self
            .customers
            .upsert_customer(tenant.id, &input.customer, DedupKey::Email)
            .await?;

        let items: Vec<OrderItem> = input
            .items
            .iter()
            .map(|item| OrderItem {
                product_id: item.product_id,
                name: item.name.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                size_id: item.size_id.clone(),
                image: item.image.clone(),
                color: item.color.clone(),
            })
            .collect();

        let order_id = self
            .orders
            .create(
                NewOrder {
                    tenant_id: tenant.id,
                    customer_id,
                    items,
                    total: input.total,
                    currency: input.currency.clone(),
                    status: OrderStatus::Pending,
                    payment_method: input.payment_method,
                    notes: None,
                },
                &[],
            )
            .await?;
        info!(order_id, tenant_id = tenant.id, "Checkout order created");

        if !input.payment_method.requires_payment_preference() {
            return Ok(CheckoutResult {
                order_id,
                preference_id: None,
                init_point: None,
            });
        }

        let credential = self
            .tenants
            .find_by_slug_with_token(&input.tenant_slug)
            .await?
            .and_then(|t| t.payment_credential)
            .ok_or_else(|| {
                warn!(order_id, tenant_id = tenant.id, "Store has no payment provider connected");
                ServiceError::ValidationError("payment provider not configured".to_string())
            })?;
        let access_token = self.cipher.decrypt(&credential)?;

        let request = self.preference_request(order_id, &tenant.slug, &input);
        let preference = self
            .provider
            .create_preference(&access_token, &request)
            .await
            .map_err(|e| {
                warn!(order_id, error = %e, "Payment preference failed, order left pending");
                ServiceError::gateway(e.provider_message())
            })?;

        publish(
            self.event_sender.as_deref(),
            Event::PaymentPreferenceCreated {
                order_id,
                preference_id: preference.id.clone(),
            },
        )
        .await;

        Ok(CheckoutResult {
            order_id,
            preference_id: Some(preference.id),
            init_point: Some(preference.init_point),
        })
    }

    fn preference_request(&self, order_id: i32, slug: &str, input: &CheckoutInput) -> PreferenceRequest {
        let base = input
            .return_url
            .as_deref()
            .unwrap_or(self.settings.public_base_url.as_str())
            .trim_end_matches('/');
        let locale = input
            .locale
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(self.settings.default_locale.as_str());
        let back_url = |outcome: &str| format!("{}/{}/{}/checkout/{}", base, locale, slug, outcome);

        let (auto_return, notification_url) = if is_local_base(base) {
            (None, None)
        } else {
            let webhook_base = self
                .settings
                .webhook_base_url
                .as_deref()
                .unwrap_or(base)
                .trim_end_matches('/');
            (
                Some("approved".to_string()),
                Some(format!(
                    "{}/api/webhooks/mercadopago?tenant={}",
                    webhook_base, slug
                )),
            )
        };

        PreferenceRequest {
            items: input
                .items
                .iter()
                .map(|item| PreferenceItem {
                    id: item.product_id.to_string(),
                    title: item.name.clone(),
                    unit_price: item.unit_price,
                    quantity: item.quantity,
                    currency_id: input.currency.clone(),
                })
                .collect(),
            payer: PreferencePayer {
                name: input.customer.name.trim().to_string(),
                email: input.customer.normalized_email(),
                phone: input
                    .customer
                    .normalized_phone()
                    .map(|number| PreferencePhone { number }),
            },
            back_urls: BackUrls {
                success: back_url("success"),
                failure: back_url("failure"),
                pending: back_url("pending"),
            },
            external_reference: order_id.to_string(),
            auto_return,
            notification_url,
        }
    }
}

/// True for origins the provider cannot call back or redirect to automatically.
pub fn is_local_base(base: &str) -> bool {
    let Ok(url) = Url::parse(base) else {
        return true;
    };
    match url.host() {
        Some(Host::Domain(domain)) => {
            let domain = domain.to_ascii_lowercase();
            domain == "localhost" || domain.ends_with(".localhost")
        }
        Some(Host::Ipv4(ip)) => ip.is_loopback() || ip.is_unspecified(),
        Some(Host::Ipv6(ip)) => ip.is_loopback() || ip.is_unspecified(),
        None => true,
    }
}
