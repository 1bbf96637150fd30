use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{error, instrument};

use crate::entities::customer::{self, Entity as CustomerEntity};
use crate::errors::ServiceError;
use crate::models::{Customer, CustomerLookup, CustomerUpdate, NewCustomer};
use crate::repositories::{BaseRepository, CustomerRepository, Repository};

impl From<customer::Model> for Customer {
    fn from(model: customer::Model) -> Self {
        Self {
            id: model.id,
            tenant_id: model.tenant_id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Customer directory backed by the `customers` table
#[derive(Debug, Clone)]
pub struct SeaOrmCustomerRepository {
    base: BaseRepository,
}

impl SeaOrmCustomerRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

#[async_trait]
impl CustomerRepository for SeaOrmCustomerRepository {
    #[instrument(skip(self))]
    async fn find_by_key(
        &self,
        tenant_id: i32,
        lookup: &CustomerLookup,
    ) -> Result<Option<Customer>, ServiceError> {
        let mut query = CustomerEntity::find().filter(customer::Column::TenantId.eq(tenant_id));

        query = match lookup {
            CustomerLookup::Email(email) => query.filter(customer::Column::Email.eq(email.as_str())),
            CustomerLookup::EmailAndPhone { email, phone } => {
                let query = query.filter(customer::Column::Email.eq(email.as_str()));
                match phone {
                    Some(phone) => query.filter(customer::Column::Phone.eq(phone.as_str())),
                    None => query.filter(customer::Column::Phone.is_null()),
                }
            }
        };

        // Oldest record wins if legacy duplicates exist.
        query
            .order_by_asc(customer::Column::Id)
            .one(self.base.get_db())
            .await
            .map(|found| found.map(Customer::from))
            .map_err(|e| {
                error!("Failed to look up customer in tenant {}: {}", tenant_id, e);
                ServiceError::DatabaseError(e)
            })
    }

    #[instrument(skip(self, input), fields(tenant_id = input.tenant_id))]
    async fn create(&self, input: NewCustomer) -> Result<Customer, ServiceError> {
        let now = Utc::now();
        let model = customer::ActiveModel {
            tenant_id: Set(input.tenant_id),
            name: Set(input.name),
            email: Set(input.email),
            phone: Set(input.phone),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        model
            .insert(self.base.get_db())
            .await
            .map(Customer::from)
            .map_err(|e| {
                error!("Failed to create customer: {}", e);
                ServiceError::InternalError(format!("Failed to create customer: {}", e))
            })
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: i32, input: CustomerUpdate) -> Result<(), ServiceError> {
        let mut model = customer::ActiveModel {
            id: Set(id),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        if let Some(name) = input.name {
            model.name = Set(name);
        }
        if let Some(phone) = input.phone {
            model.phone = Set(Some(phone));
        }

        model.update(self.base.get_db()).await.map_err(|e| {
            error!("Failed to update customer {}: {}", id, e);
            ServiceError::InternalError(format!("Failed to update customer {}: {}", id, e))
        })?;
        Ok(())
    }
}

impl Repository for SeaOrmCustomerRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}
