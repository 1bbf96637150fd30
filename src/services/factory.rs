use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::DbPool,
    errors::ServiceError,
    events::EventSender,
    repositories::{
        SeaOrmCustomerRepository, SeaOrmOrderRepository, SeaOrmProductRepository,
        SeaOrmTenantRepository,
    },
    services::{
        commerce::CheckoutService,
        order_status::OrderStatusService,
        orders::OrderService,
        payments::{MercadoPagoClient, PaymentProvider},
    },
};

/// Factory for creating service instances with shared dependencies
pub struct ServiceFactory {
    db_pool: Arc<DbPool>,
    config: AppConfig,
    event_sender: Option<Arc<EventSender>>,
    provider: Arc<dyn PaymentProvider>,
}

impl ServiceFactory {
    /// Builds the factory with the Mercado Pago client configured in `config`.
    pub fn new(
        db_pool: Arc<DbPool>,
        config: AppConfig,
        event_sender: Option<EventSender>,
    ) -> Result<Self, ServiceError> {
        let provider = MercadoPagoClient::new(
            config.payment_api_base_url.clone(),
            config.payment_timeout(),
        )
        .map_err(|e| ServiceError::InternalError(e.to_string()))?;
        Ok(Self::with_provider(
            db_pool,
            config,
            event_sender,
            Arc::new(provider),
        ))
    }

    pub fn with_provider(
        db_pool: Arc<DbPool>,
        config: AppConfig,
        event_sender: Option<EventSender>,
        provider: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self {
            db_pool,
            config,
            event_sender: event_sender.map(Arc::new),
            provider,
        }
    }

    /// Creates an order service instance
    pub fn order_service(&self) -> OrderService {
        OrderService::new(
            Arc::new(SeaOrmTenantRepository::new(self.db_pool.clone())),
            Arc::new(SeaOrmProductRepository::new(self.db_pool.clone())),
            Arc::new(SeaOrmCustomerRepository::new(self.db_pool.clone())),
            Arc::new(SeaOrmOrderRepository::new(self.db_pool.clone())),
            self.event_sender.clone(),
        )
        .with_default_currency(self.config.default_currency.clone())
    }

    /// Creates a checkout service instance
    pub fn checkout_service(&self) -> Result<CheckoutService, ServiceError> {
        Ok(CheckoutService::new(
            Arc::new(SeaOrmTenantRepository::new(self.db_pool.clone())),
            Arc::new(SeaOrmCustomerRepository::new(self.db_pool.clone())),
            Arc::new(SeaOrmOrderRepository::new(self.db_pool.clone())),
            self.provider.clone(),
            self.config.credential_cipher()?,
            self.config.checkout_settings(),
            self.event_sender.clone(),
        ))
    }

    /// Creates an order status service instance
    pub fn order_status_service(&self) -> OrderStatusService {
        OrderStatusService::new(
            Arc::new(SeaOrmOrderRepository::new(self.db_pool.clone())),
            Arc::new(self.config.authorization_policy()),
            self.event_sender.clone(),
        )
    }

    /// Gets a reference to the database pool
    pub fn db_pool(&self) -> &Arc<DbPool> {
        &self.db_pool
    }
}

/// Service container holding all service instances
#[derive(Clone)]
pub struct ServiceContainer {
    pub orders: Arc<OrderService>,
    pub checkout: Arc<CheckoutService>,
    pub order_status: Arc<OrderStatusService>,
}

impl ServiceContainer {
    /// Creates a new service container with all services initialized
    pub fn new(factory: &ServiceFactory) -> Result<Self, ServiceError> {
        Ok(Self {
            orders: Arc::new(factory.order_service()),
            checkout: Arc::new(factory.checkout_service()?),
            order_status: Arc::new(factory.order_status_service()),
        })
    }
}
