#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use storefront_orders::{
    config::AppConfig,
    db::{self, DbConfig, DbPool},
    entities::{customer, order, product, product_size, tenant},
    services::factory::ServiceFactory,
    services::payments::{MercadoPagoClient, PaymentProvider},
};

pub const OWNER: &str = "u1";
pub const SUPERADMIN: &str = "root@shop.io";

/// Helper harness for an in-memory SQLite database with the order schema.
pub struct TestApp {
    pub db: Arc<DbPool>,
    pub config: AppConfig,
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = db::establish_connection_with_config(&DbConfig::sqlite_in_memory())
            .await
            .expect("failed to open test database");
        db::create_schema(&pool)
            .await
            .expect("failed to create schema");

        let mut config = AppConfig::new("sqlite::memory:".into(), "test".into());
        config.superadmin_emails = SUPERADMIN.to_string();
        config.public_base_url = "https://shop.example.com".into();

        Self {
            db: Arc::new(pool),
            config,
        }
    }

    pub fn factory(&self) -> ServiceFactory {
        self.factory_with_provider_url("http://127.0.0.1:9")
    }

    /// Factory whose payment client talks to `base_url` (a wiremock server in tests).
    pub fn factory_with_provider_url(&self, base_url: &str) -> ServiceFactory {
        let provider: Arc<dyn PaymentProvider> = Arc::new(
            MercadoPagoClient::new(base_url, std::time::Duration::from_secs(5))
                .expect("client"),
        );
        ServiceFactory::with_provider(self.db.clone(), self.config.clone(), None, provider)
    }

    pub async fn seed_tenant(&self, slug: &str, enforces_stock: bool) -> tenant::Model {
        self.seed_tenant_with_credential(slug, enforces_stock, None)
            .await
    }

    pub async fn seed_tenant_with_credential(
        &self,
        slug: &str,
        enforces_stock: bool,
        payment_credential: Option<String>,
    ) -> tenant::Model {
        let now = Utc::now();
        tenant::ActiveModel {
            slug: Set(slug.to_string()),
            name: Set(format!("Store {}", slug)),
            template: Set(if enforces_stock { "clothing" } else { "food" }.to_string()),
            enforces_stock: Set(enforces_stock),
            owner_id: Set(OWNER.to_string()),
            payment_credential: Set(payment_credential),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await
        .expect("seed tenant")
    }

    pub async fn seed_product(
        &self,
        tenant_id: i32,
        name: &str,
        price: Decimal,
        stock: Option<i32>,
    ) -> product::Model {
        let now = Utc::now();
        product::ActiveModel {
            tenant_id: Set(tenant_id),
            name: Set(name.to_string()),
            price: Set(price),
            active: Set(true),
            stock: Set(stock),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await
        .expect("seed product")
    }

    pub async fn seed_size(
        &self,
        product_id: i32,
        size_key: &str,
        label: &str,
        stock: i32,
    ) -> product_size::Model {
        product_size::ActiveModel {
            product_id: Set(product_id),
            size_key: Set(size_key.to_string()),
            label: Set(label.to_string()),
            stock: Set(stock),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await
        .expect("seed size")
    }

    pub async fn deactivate(&self, product: product::Model) {
        let mut active: product::ActiveModel = product.into();
        active.active = Set(false);
        active.update(self.db.as_ref()).await.expect("deactivate");
    }

    pub async fn product_stock(&self, id: i32) -> Option<i32> {
        product::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .expect("load product")
            .and_then(|p| p.stock)
    }

    pub async fn size_stock(&self, id: i32) -> i32 {
        product_size::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .expect("load size")
            .expect("size exists")
            .stock
    }

    pub async fn orders(&self) -> Vec<order::Model> {
        order::Entity::find()
            .all(self.db.as_ref())
            .await
            .expect("load orders")
    }

    pub async fn customers(&self) -> Vec<customer::Model> {
        customer::Entity::find()
            .all(self.db.as_ref())
            .await
            .expect("load customers")
    }
}
