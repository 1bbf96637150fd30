//! Tenant domain model.
//!
//! A tenant is one store. Products, customers and orders each carry exactly
//! one owning tenant id, and that id is the only isolation boundary this
//! crate relies on.

use serde::{Deserialize, Serialize};

/// Tenant fields needed by the order pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantSummary {
    pub id: i32,
    /// URL-safe identifier used by the storefront (e.g., `la-pizzeria`).
    pub slug: String,
    /// Display template tag. Presentation only; never consulted for business rules.
    pub template: String,
    /// Whether requested quantities are checked against recorded stock.
    /// Food-service style stores keep this off because "stock" is not meaningful for them.
    pub enforces_stock: bool,
}

/// A tenant together with its stored (still encrypted) payment credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantWithCredential {
    pub tenant: TenantSummary,
    /// Encrypted provider access token, `None` when the store has not connected a provider.
    #[serde(skip_serializing)]
    pub payment_credential: Option<String>,
}
