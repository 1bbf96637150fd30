use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use validator::{Validate, ValidationError};

use crate::{
    auth::{Actor, AuthorizationPolicy},
    errors::ServiceError,
    events::{publish, Event, EventSender},
    models::{Order, OrderStatus, OrderWithOwner},
    repositories::OrderRepository,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UpdateStatusInput {
    pub order_id: i32,
    #[validate(length(min = 1, message = "User id is required"))]
    pub user_id: String,
    pub user_email: Option<String>,
    #[validate(custom = "validate_status_tag")]
    pub new_status: String,
}

fn validate_status_tag(status: &str) -> Result<(), ValidationError> {
    let tag = status.trim();
    if tag.is_empty() {
        return Err(ValidationError::new("Status is required"));
    }
    if tag.chars().count() > 50 {
        return Err(ValidationError::new("Status must be at most 50 characters"));
    }
    Ok(())
}

impl UpdateStatusInput {
    fn actor(&self) -> Actor {
        Actor::new(self.user_id.clone(), self.user_email.clone())
    }
}

/// Moves orders through their lifecycle on behalf of store owners.
#[derive(Clone)]
pub struct OrderStatusService {
    orders: Arc<dyn OrderRepository>,
    policy: Arc<dyn AuthorizationPolicy>,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderStatusService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        policy: Arc<dyn AuthorizationPolicy>,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            orders,
            policy,
            event_sender,
        }
    }

    /// Updates the status of an order the caller is allowed to manage.
    #[instrument(skip(self, input), fields(order_id = input.order_id, new_status = %input.new_status))]
    pub async fn update_status(&self, input: UpdateStatusInput) -> Result<Order, ServiceError> {
        input.validate()?;
        let actor = input.actor();
        let current = self.load_authorized(input.order_id, &actor).await?;

        let from = current.order.status.clone();
        let to = OrderStatus::from(input.new_status.as_str());
        if !Self::is_valid_transition(&from, &to) {
            warn!(order_id = input.order_id, %from, %to, "Rejected status transition");
            return Err(ServiceError::ValidationError(format!(
                "cannot change status of a {} order",
                from
            )));
        }

        // cancelled -> cancelled
        if from == to && from == OrderStatus::Cancelled {
            return Ok(current.order);
        }

        let updated = self.orders.update_status(input.order_id, &to).await?;
        info!(
            "Order {} status updated from '{}' to '{}'",
            input.order_id, from, to
        );

        publish(
            self.event_sender.as_deref(),
            Event::OrderStatusChanged {
                order_id: input.order_id,
                old_status: from.to_string(),
                new_status: to.to_string(),
            },
        )
        .await;

        Ok(updated)
    }

    /// Reads an order through the same ownership check used for updates.
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn get_order(&self, order_id: i32, actor: &Actor) -> Result<Order, ServiceError> {
        Ok(self.load_authorized(order_id, actor).await?.order)
    }

    /// Delivered orders may only be cancelled, and cancelled orders stay cancelled.
    pub fn is_valid_transition(from: &OrderStatus, to: &OrderStatus) -> bool {
        !from.is_terminal() || *to == OrderStatus::Cancelled
    }

    async fn load_authorized(
        &self,
        order_id: i32,
        actor: &Actor,
    ) -> Result<OrderWithOwner, ServiceError> {
        let found = self
            .orders
            .find_by_id_with_tenant(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        if !self.policy.can_manage(actor, &found.owner_id) {
            warn!(
                order_id,
                user_id = %actor.user_id,
                tenant_id = found.order.tenant_id,
                "Rejected access to another store's order"
            );
            return Err(ServiceError::Forbidden(
                "you do not own this order".to_string(),
            ));
        }
        Ok(found)
    }
}
