/// Storefront-facing commerce flows
pub mod checkout_service;

pub use checkout_service::{
    CheckoutInput, CheckoutItem, CheckoutResult, CheckoutService, CheckoutSettings,
};
