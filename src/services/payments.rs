//! Payment provider client.
//!
//! The checkout pipeline only needs one remote call: creating a hosted
//! payment preference that the storefront redirects the buyer to.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Default Mercado Pago API host.
pub const MERCADO_PAGO_API_URL: &str = "https://api.mercadopago.com";

#[derive(Debug, Error)]
pub enum PaymentProviderError {
    #[error("payment provider unreachable: {0}")]
    Transport(String),
    #[error("payment provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected payment provider response: {0}")]
    InvalidResponse(String),
}

impl PaymentProviderError {
    /// Message suitable for surfacing to the buyer.
    pub fn provider_message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceItem {
    pub id: String,
    pub title: String,
    /// The provider expects a JSON number here.
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    pub quantity: i32,
    pub currency_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencePhone {
    pub number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencePayer {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<PreferencePhone>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackUrls {
    pub success: String,
    pub failure: String,
    pub pending: String,
}

/// Body of `POST /checkout/preferences`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceRequest {
    pub items: Vec<PreferenceItem>,
    pub payer: PreferencePayer,
    pub back_urls: BackUrls,
    /// Our order id, echoed back by payment notifications.
    pub external_reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_return: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_url: Option<String>,
}

/// A created preference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    pub id: String,
    /// Hosted checkout URL the buyer is redirected to.
    pub init_point: String,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_preference(
        &self,
        access_token: &str,
        request: &PreferenceRequest,
    ) -> Result<Preference, PaymentProviderError>;
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// [`PaymentProvider`] backed by the Mercado Pago REST API.
#[derive(Debug, Clone)]
pub struct MercadoPagoClient {
    client: reqwest::Client,
    base_url: String,
}

impl MercadoPagoClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PaymentProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PaymentProviderError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PaymentProvider for MercadoPagoClient {
    #[instrument(skip(self, access_token, request), fields(external_reference = %request.external_reference))]
    async fn create_preference(
        &self,
        access_token: &str,
        request: &PreferenceRequest,
    ) -> Result<Preference, PaymentProviderError> {
        let response = self
            .client
            .post(format!("{}/checkout/preferences", self.base_url))
            .bearer_auth(access_token)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!("Payment provider request failed: {}", e);
                PaymentProviderError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderErrorBody>(&body)
                .ok()
                .and_then(|b| b.message.or(b.error))
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("payment provider error")
                        .to_string()
                });
            warn!(status = status.as_u16(), %message, "Payment provider rejected preference");
            return Err(PaymentProviderError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let preference = response
            .json::<Preference>()
            .await
            .map_err(|e| PaymentProviderError::InvalidResponse(e.to_string()))?;

        info!(preference_id = %preference.id, "Payment preference created");
        Ok(preference)
    }
}
