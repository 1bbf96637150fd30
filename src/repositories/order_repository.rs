use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::entities::order::{self, Entity as OrderEntity};
use crate::entities::order_item::{self, Entity as OrderItemEntity};
use crate::entities::product::{self, Entity as ProductEntity};
use crate::entities::product_size::{self, Entity as ProductSize};
use crate::entities::tenant::Entity as Tenant;
use crate::errors::ServiceError;
use crate::models::product::insufficient_stock;
use crate::models::{
    NewOrder, Order, OrderItem, OrderStatus, OrderWithOwner, PaymentMethod, StockReservation,
};
use crate::repositories::{BaseRepository, OrderRepository, Repository};

fn to_domain(model: order::Model, items: Vec<order_item::Model>) -> Result<Order, ServiceError> {
    let payment_method = PaymentMethod::from_str(&model.payment_method).map_err(|_| {
        ServiceError::InternalError(format!(
            "Order {} has unknown payment method '{}'",
            model.id, model.payment_method
        ))
    })?;

    Ok(Order {
        id: model.id,
        tenant_id: model.tenant_id,
        customer_id: model.customer_id,
        items: items
            .into_iter()
            .map(|item| OrderItem {
                product_id: item.product_id,
                name: item.name,
                quantity: item.quantity,
                unit_price: item.unit_price,
                size_id: item.size_id,
                image: item.image,
                color: item.color,
            })
            .collect(),
        total: model.total,
        currency: model.currency,
        status: OrderStatus::from(model.status),
        payment_method,
        notes: model.notes,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

/// Order store backed by the `orders` and `order_items` tables
#[derive(Debug, Clone)]
pub struct SeaOrmOrderRepository {
    base: BaseRepository,
}

impl SeaOrmOrderRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    async fn load_items(
        &self,
        model: &order::Model,
    ) -> Result<Vec<order_item::Model>, ServiceError> {
        model
            .find_related(OrderItemEntity)
            .order_by_asc(order_item::Column::Position)
            .all(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Decrements one stock counter if, and only if, enough stock remains.
    async fn reserve(
        txn: &DatabaseTransaction,
        reservation: &StockReservation,
    ) -> Result<bool, ServiceError> {
        let result = match &reservation.size_id {
            Some(size_id) => {
                ProductSize::update_many()
                    .col_expr(
                        product_size::Column::Stock,
                        Expr::col(product_size::Column::Stock).sub(reservation.quantity),
                    )
                    .filter(product_size::Column::ProductId.eq(reservation.product_id))
                    .filter(product_size::Column::SizeKey.eq(size_id.as_str()))
                    .filter(product_size::Column::Stock.gte(reservation.quantity))
                    .exec(txn)
                    .await?
            }
            None => {
                ProductEntity::update_many()
                    .col_expr(
                        product::Column::Stock,
                        Expr::col(product::Column::Stock).sub(reservation.quantity),
                    )
                    .filter(product::Column::Id.eq(reservation.product_id))
                    .filter(product::Column::Stock.gte(reservation.quantity))
                    .exec(txn)
                    .await?
            }
        };

        Ok(result.rows_affected == 1)
    }

    /// Stock currently visible inside the transaction, used for error messages.
    async fn available_stock(
        txn: &DatabaseTransaction,
        reservation: &StockReservation,
    ) -> Result<i32, ServiceError> {
        let available = match &reservation.size_id {
            Some(size_id) => ProductSize::find()
                .filter(product_size::Column::ProductId.eq(reservation.product_id))
                .filter(product_size::Column::SizeKey.eq(size_id.as_str()))
                .one(txn)
                .await?
                .map(|size| size.stock),
            None => ProductEntity::find_by_id(reservation.product_id)
                .one(txn)
                .await?
                .and_then(|product| product.stock),
        };
        Ok(available.unwrap_or(0).max(0))
    }
}

#[async_trait]
impl OrderRepository for SeaOrmOrderRepository {
    #[instrument(skip(self, order, reservations), fields(tenant_id = order.tenant_id, reservations = reservations.len()))]
    async fn create(
        &self,
        order: NewOrder,
        reservations: &[StockReservation],
    ) -> Result<i32, ServiceError> {
        let txn = self.base.get_db().begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let mut reserved: HashMap<(i32, Option<&str>), i32> = HashMap::new();
        for reservation in reservations {
            let counter = (reservation.product_id, reservation.size_id.as_deref());
            if !Self::reserve(&txn, reservation).await? {
                let already = reserved.get(&counter).copied().unwrap_or(0);
                let available = Self::available_stock(&txn, reservation)
                    .await?
                    .saturating_add(already);
                txn.rollback().await?;
                warn!(
                    product_id = reservation.product_id,
                    size_id = ?reservation.size_id,
                    requested = reservation.quantity,
                    available,
                    "Stock reservation lost, order not created"
                );
                return Err(insufficient_stock(&reservation.label, available));
            }
            *reserved.entry(counter).or_insert(0) += reservation.quantity;
        }

        let now = Utc::now();
        let inserted = order::ActiveModel {
            tenant_id: Set(order.tenant_id),
            customer_id: Set(order.customer_id),
            total: Set(order.total),
            currency: Set(order.currency),
            status: Set(order.status.to_string()),
            payment_method: Set(order.payment_method.to_string()),
            notes: Set(order.notes),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!("Failed to insert order: {}", e);
            ServiceError::InternalError(format!("Failed to create order: {}", e))
        })?;

        for (position, item) in order.items.into_iter().enumerate() {
            order_item::ActiveModel {
                order_id: Set(inserted.id),
                position: Set(position as i32),
                product_id: Set(item.product_id),
                name: Set(item.name),
                quantity: Set(item.quantity),
                unit_price: Set(item.unit_price),
                size_id: Set(item.size_id),
                image: Set(item.image),
                color: Set(item.color),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| {
                error!("Failed to insert item for order {}: {}", inserted.id, e);
                ServiceError::InternalError(format!("Failed to create order item: {}", e))
            })?;
        }

        txn.commit().await.map_err(|e| {
            error!("Failed to commit order {}: {}", inserted.id, e);
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = inserted.id, "Order persisted");
        Ok(inserted.id)
    }

    #[instrument(skip(self))]
    async fn find_by_id_with_tenant(
        &self,
        id: i32,
    ) -> Result<Option<OrderWithOwner>, ServiceError> {
        let found = OrderEntity::find_by_id(id)
            .find_also_related(Tenant)
            .one(self.base.get_db())
            .await
            .map_err(|e| {
                error!("Failed to fetch order {}: {}", id, e);
                ServiceError::DatabaseError(e)
            })?;

        let Some((model, tenant)) = found else {
            return Ok(None);
        };
        let tenant = tenant.ok_or_else(|| {
            ServiceError::InternalError(format!("Order {} references a missing tenant", id))
        })?;

        let items = self.load_items(&model).await?;
        Ok(Some(OrderWithOwner {
            order: to_domain(model, items)?,
            owner_id: tenant.owner_id,
        }))
    }

    #[instrument(skip(self), fields(status = %status))]
    async fn update_status(&self, id: i32, status: &OrderStatus) -> Result<Order, ServiceError> {
        let model = OrderEntity::find_by_id(id)
            .one(self.base.get_db())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))?;

        let mut active: order::ActiveModel = model.into();
        active.status = Set(status.to_string());
        active.updated_at = Set(Utc::now());

        let updated = active.update(self.base.get_db()).await.map_err(|e| {
            error!("Failed to update order {} status: {}", id, e);
            ServiceError::DatabaseError(e)
        })?;

        let items = self.load_items(&updated).await?;
        to_domain(updated, items)
    }
}

impl Repository for SeaOrmOrderRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}
