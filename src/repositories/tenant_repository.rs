use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::sync::Arc;
use tracing::{error, instrument};

use crate::entities::tenant::{self, Entity as Tenant};
use crate::errors::ServiceError;
use crate::models::{TenantSummary, TenantWithCredential};
use crate::repositories::{BaseRepository, Repository, TenantRepository};

impl From<tenant::Model> for TenantSummary {
    fn from(model: tenant::Model) -> Self {
        Self {
            id: model.id,
            slug: model.slug,
            template: model.template,
            enforces_stock: model.enforces_stock,
        }
    }
}

/// Tenant lookup backed by the `tenants` table
#[derive(Debug, Clone)]
pub struct SeaOrmTenantRepository {
    base: BaseRepository,
}

impl SeaOrmTenantRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    async fn find_model(&self, slug: &str) -> Result<Option<tenant::Model>, ServiceError> {
        Tenant::find()
            .filter(tenant::Column::Slug.eq(slug))
            .one(self.base.get_db())
            .await
            .map_err(|e| {
                error!("Failed to look up tenant {}: {}", slug, e);
                ServiceError::DatabaseError(e)
            })
    }
}

#[async_trait]
impl TenantRepository for SeaOrmTenantRepository {
    #[instrument(skip(self))]
    async fn find_by_slug(&self, slug: &str) -> Result<Option<TenantSummary>, ServiceError> {
        Ok(self.find_model(slug).await?.map(TenantSummary::from))
    }

    #[instrument(skip(self))]
    async fn find_by_slug_with_token(
        &self,
        slug: &str,
    ) -> Result<Option<TenantWithCredential>, ServiceError> {
        Ok(self.find_model(slug).await?.map(|mut model| {
            let payment_credential = model
                .payment_credential
                .take()
                .filter(|token| !token.trim().is_empty());
            TenantWithCredential {
                tenant: model.into(),
                payment_credential,
            }
        }))
    }
}

impl Repository for SeaOrmTenantRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}
