//! Customer domain model and deduplication keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i32,
    pub tenant_id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Contact details supplied with an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CustomerContact {
    #[validate(length(min = 1, max = 200, message = "Customer name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, max = 50, message = "Phone must not be empty"))]
    pub phone: Option<String>,
}

impl CustomerContact {
    /// E-mail in the form used for lookups and storage.
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }

    pub fn normalized_phone(&self) -> Option<String> {
        self.phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
    }
}

/// Which contact fields identify a returning customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupKey {
    /// Public checkout flow.
    Email,
    /// Admin order entry flow.
    EmailAndPhone,
}

/// A concrete lookup built from a contact and a dedup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerLookup {
    Email(String),
    EmailAndPhone { email: String, phone: Option<String> },
}

impl CustomerLookup {
    pub fn new(contact: &CustomerContact, key: DedupKey) -> Self {
        match key {
            DedupKey::Email => CustomerLookup::Email(contact.normalized_email()),
            DedupKey::EmailAndPhone => CustomerLookup::EmailAndPhone {
                email: contact.normalized_email(),
                phone: contact.normalized_phone(),
            },
        }
    }
}

/// Fields required to create a new customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub tenant_id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Fields that can be refreshed on an existing customer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> CustomerContact {
        CustomerContact {
            name: "Ana".into(),
            email: "  Ana@Example.com ".into(),
            phone: Some(" 555-0101 ".into()),
        }
    }

    #[test]
    fn email_lookup_ignores_phone() {
        assert_eq!(
            CustomerLookup::new(&contact(), DedupKey::Email),
            CustomerLookup::Email("ana@example.com".into())
        );
    }

    #[test]
    fn email_and_phone_lookup_keeps_trimmed_phone() {
        assert_eq!(
            CustomerLookup::new(&contact(), DedupKey::EmailAndPhone),
            CustomerLookup::EmailAndPhone {
                email: "ana@example.com".into(),
                phone: Some("555-0101".into()),
            }
        );
    }

    #[test]
    fn contact_validation_rejects_bad_email() {
        let mut c = contact();
        c.email = "not-an-email".into();
        assert!(c.validate().is_err());
    }
}
