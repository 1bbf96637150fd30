use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, instrument};

use crate::entities::product::{self, Entity as ProductEntity};
use crate::entities::product_size::{self, Entity as ProductSize};
use crate::errors::ServiceError;
use crate::models::{Product, SizeVariant};
use crate::repositories::{BaseRepository, ProductRepository, Repository};

fn to_domain(model: product::Model, sizes: Vec<product_size::Model>) -> Product {
    let sizes = sizes
        .into_iter()
        .map(|size| {
            (
                size.size_key,
                SizeVariant {
                    label: size.label,
                    stock: size.stock,
                },
            )
        })
        .collect::<BTreeMap<_, _>>();

    Product {
        id: model.id,
        tenant_id: model.tenant_id,
        name: model.name,
        price: model.price,
        active: model.active,
        stock: model.stock,
        sizes,
    }
}

/// Product catalog backed by the `products` and `product_sizes` tables
#[derive(Debug, Clone)]
pub struct SeaOrmProductRepository {
    base: BaseRepository,
}

impl SeaOrmProductRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

#[async_trait]
impl ProductRepository for SeaOrmProductRepository {
    #[instrument(skip(self), fields(count = ids.len()))]
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Product>, ServiceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = ProductEntity::find()
            .filter(product::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(product::Column::Id)
            .find_with_related(ProductSize)
            .all(self.base.get_db())
            .await
            .map_err(|e| {
                error!("Failed to fetch products {:?}: {}", ids, e);
                ServiceError::DatabaseError(e)
            })?;

        Ok(rows
            .into_iter()
            .map(|(model, sizes)| to_domain(model, sizes))
            .collect())
    }
}

impl Repository for SeaOrmProductRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}
