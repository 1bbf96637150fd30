//! Order domain model.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Order status.
///
/// Only the terminal states are special-cased by the lifecycle rules; the
/// in-progress tags (`preparing`, `ready`, `shipped`, ...) are defined by the
/// caller and carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Pending,
    Delivered,
    Cancelled,
    InProgress(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::InProgress(tag) => tag,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl From<&str> for OrderStatus {
    fn from(value: &str) -> Self {
        let tag = value.trim().to_ascii_lowercase();
        match tag.as_str() {
            "pending" => OrderStatus::Pending,
            "delivered" => OrderStatus::Delivered,
            "cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::InProgress(tag),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        OrderStatus::from(value.as_str())
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the customer intends to pay.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentMethod {
    /// Paid on delivery or pickup; no provider involved.
    Cash,
    /// Paid through a hosted payment preference.
    MercadoPago,
}

impl PaymentMethod {
    pub fn requires_payment_preference(&self) -> bool {
        !matches!(self, PaymentMethod::Cash)
    }
}

/// A persisted order line. Name and price are snapshots taken at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: i32,
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub size_id: Option<String>,
    pub image: Option<String>,
    pub color: Option<String>,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i32,
    pub tenant_id: i32,
    pub customer_id: i32,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub currency: String,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An order as loaded for lifecycle changes, with the identity owning its tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderWithOwner {
    pub order: Order,
    pub owner_id: String,
}

/// Fields required to persist a new order.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub tenant_id: i32,
    pub customer_id: i32,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub currency: String,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

/// A stock decrement that must succeed atomically with the order insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockReservation {
    pub product_id: i32,
    /// Size counter to draw from; the flat product counter when `None`.
    pub size_id: Option<String>,
    pub quantity: i32,
    /// Label used if the reservation fails.
    pub label: String,
}
