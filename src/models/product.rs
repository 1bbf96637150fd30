//! Product domain model as seen by the order pipelines.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// A named sub-SKU tracked with its own stock count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeVariant {
    pub label: String,
    pub stock: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i32,
    pub tenant_id: i32,
    pub name: String,
    pub price: Decimal,
    /// Soft-delete flag; inactive products are not purchasable.
    pub active: bool,
    /// Flat stock count, `None` when the product is not stock tracked.
    pub stock: Option<i32>,
    /// Size variants keyed by size id.
    #[serde(default)]
    pub sizes: BTreeMap<String, SizeVariant>,
}

/// Stock information resolved for one requested line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStock {
    /// Label used in user-facing messages, `"<product> (<size>)"` for sizes.
    pub label: String,
    pub size_id: Option<String>,
    /// `None` means the line is not stock tracked.
    pub available: Option<i32>,
}

impl Product {
    /// Resolves which stock counter a requested line draws from.
    pub fn resolve_stock(&self, size_id: Option<&str>) -> Result<ResolvedStock, ServiceError> {
        match size_id {
            Some(size_id) => {
                let size = self.sizes.get(size_id).ok_or_else(|| {
                    ServiceError::ValidationError(format!(
                        "Invalid size '{}' for product {}",
                        size_id, self.name
                    ))
                })?;
                Ok(ResolvedStock {
                    label: format!("{} ({})", self.name, size.label),
                    size_id: Some(size_id.to_string()),
                    available: Some(size.stock),
                })
            }
            None => Ok(ResolvedStock {
                label: self.name.clone(),
                size_id: None,
                available: self.stock,
            }),
        }
    }
}

/// Error raised whenever a requested quantity exceeds what is on hand.
pub fn insufficient_stock(label: &str, available: i32) -> ServiceError {
    ServiceError::ValidationError(format!(
        "Insufficient stock for {}. Available: {}",
        label, available
    ))
}
