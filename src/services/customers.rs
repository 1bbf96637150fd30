use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::{
    errors::ServiceError,
    models::{CustomerContact, CustomerLookup, CustomerUpdate, DedupKey, NewCustomer},
    repositories::CustomerRepository,
};

/// Finds or creates the customer record an order is attached to.
#[derive(Clone)]
pub struct CustomerService {
    customers: Arc<dyn CustomerRepository>,
}

impl CustomerService {
    pub fn new(customers: Arc<dyn CustomerRepository>) -> Self {
        Self { customers }
    }

    /// Returns the id of the customer matching `contact` under `key` within
    /// the tenant, refreshing its name (and phone, when given) if it exists.
    #[instrument(skip(self, contact), fields(dedup_key = ?key))]
    pub async fn upsert_customer(
        &self,
        tenant_id: i32,
        contact: &CustomerContact,
        key: DedupKey,
    ) -> Result<i32, ServiceError> {
        let lookup = CustomerLookup::new(contact, key);
        let existing = self
            .customers
            .find_by_key(tenant_id, &lookup)
            .await
            .map_err(internal("look up customer"))?;

        if let Some(customer) = existing {
            let update = CustomerUpdate {
                name: Some(contact.name.trim().to_string()),
                phone: contact.normalized_phone(),
            };
            self.customers
                .update(customer.id, update)
                .await
                .map_err(internal("update customer"))?;
            return Ok(customer.id);
        }

        let created = self
            .customers
            .create(NewCustomer {
                tenant_id,
                name: contact.name.trim().to_string(),
                email: contact.normalized_email(),
                phone: contact.normalized_phone(),
            })
            .await
            .map_err(internal("create customer"))?;

        info!(customer_id = created.id, tenant_id, "Customer created");
        Ok(created.id)
    }
}

fn internal(action: &'static str) -> impl Fn(ServiceError) -> ServiceError {
    move |e| {
        error!("Failed to {}: {}", action, e);
        match e {
            ServiceError::InternalError(_) => e,
            other => ServiceError::InternalError(format!("Failed to {}: {}", action, other)),
        }
    }
}
