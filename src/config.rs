use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::auth::OwnerOrSuperadmin;
use crate::services::commerce::CheckoutSettings;
use crate::services::payment_credentials::{CredentialCipher, CredentialError};
use crate::services::payments::MERCADO_PAGO_API_URL;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const CONFIG_DIR: &str = "config";
/// Development-only credential key (32 zero bytes). Rejected outside development.
const DEV_DEFAULT_CREDENTIAL_KEY: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    #[validate(length(min = 1, message = "database_url is required"))]
    pub database_url: String,

    /// Application environment
    #[validate(length(min = 1))]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    // ========== Database Pool ==========
    #[serde(default = "default_db_max_connections")]
    #[validate(range(min = 1, max = 1000))]
    pub db_max_connections: u32,

    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,

    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,

    // ========== Authorization ==========
    /// Comma separated e-mails allowed to manage every store
    #[serde(default)]
    pub superadmin_emails: String,

    // ========== Payments ==========
    /// Base64 encoded 32 byte AES-256-GCM key for stored provider credentials
    #[validate(custom = "validate_credential_key")]
    pub credential_key: String,

    #[serde(default = "default_payment_api_base_url")]
    #[validate(url)]
    pub payment_api_base_url: String,

    #[serde(default = "default_payment_timeout_secs")]
    #[validate(range(min = 1, max = 120))]
    pub payment_timeout_secs: u64,

    // ========== Storefront ==========
    /// Origin used for payment return URLs when the request has none
    #[serde(default = "default_public_base_url")]
    #[validate(url)]
    pub public_base_url: String,

    /// Public origin that receives payment notifications
    #[serde(default)]
    pub webhook_base_url: Option<String>,

    #[serde(default = "default_locale")]
    pub default_locale: String,

    #[serde(default = "default_currency")]
    #[validate(length(equal = 3))]
    pub default_currency: String,
}

impl AppConfig {
    /// Creates a configuration with built-in defaults for everything but the
    /// database and environment.
    pub fn new(database_url: String, environment: String) -> Self {
        Self {
            database_url,
            environment,
            log_level: default_log_level(),
            log_json: false,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
            superadmin_emails: String::new(),
            credential_key: DEV_DEFAULT_CREDENTIAL_KEY.to_string(),
            payment_api_base_url: default_payment_api_base_url(),
            payment_timeout_secs: default_payment_timeout_secs(),
            public_base_url: default_public_base_url(),
            webhook_base_url: None,
            default_locale: default_locale(),
            default_currency: default_currency(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Owner-or-superadmin policy built from `superadmin_emails`.
    pub fn authorization_policy(&self) -> OwnerOrSuperadmin {
        OwnerOrSuperadmin::from_list(&self.superadmin_emails)
    }

    pub fn credential_cipher(&self) -> Result<CredentialCipher, CredentialError> {
        CredentialCipher::from_base64_key(&self.credential_key)
    }

    pub fn checkout_settings(&self) -> CheckoutSettings {
        CheckoutSettings {
            public_base_url: self.public_base_url.clone(),
            webhook_base_url: self.webhook_base_url.clone(),
            default_locale: self.default_locale.clone(),
        }
    }

    pub fn payment_timeout(&self) -> Duration {
        Duration::from_secs(self.payment_timeout_secs)
    }

    fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.is_development() && self.credential_key.trim() == DEV_DEFAULT_CREDENTIAL_KEY {
            let mut err = ValidationError::new("credential_key_default_dev");
            err.message = Some(
                "The development credential key must not be used outside development. Set APP__CREDENTIAL_KEY."
                    .into(),
            );
            errors.add("credential_key", err);
        }

        if let Some(webhook) = &self.webhook_base_url {
            if url::Url::parse(webhook).is_err() {
                let mut err = ValidationError::new("url");
                err.message = Some("webhook_base_url must be an absolute URL".into());
                errors.add("webhook_base_url", err);
            }
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Default value functions
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_db_max_connections() -> u32 {
    10
}
fn default_db_min_connections() -> u32 {
    1
}
fn default_db_connect_timeout_secs() -> u64 {
    8
}
fn default_db_acquire_timeout_secs() -> u64 {
    8
}
fn default_db_idle_timeout_secs() -> u64 {
    300
}
fn default_payment_api_base_url() -> String {
    MERCADO_PAGO_API_URL.to_string()
}
fn default_payment_timeout_secs() -> u64 {
    15
}
fn default_public_base_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_locale() -> String {
    "es".to_string()
}
fn default_currency() -> String {
    "ARS".to_string()
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

fn validate_credential_key(key: &str) -> Result<(), ValidationError> {
    if CredentialCipher::from_base64_key(key).is_ok() {
        Ok(())
    } else {
        let mut err = ValidationError::new("credential_key");
        err.message = Some("Must be a base64 encoded 32 byte key".into());
        Err(err)
    }
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::fmt;

    let default_directive = format!("storefront_orders={},sea_orm=warn", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt().with_env_filter(filter_directive).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter_directive).try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (config/default.toml)
/// 3. Environment-specific config (config/{env}.toml)
/// 4. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    load_config_from(Path::new(CONFIG_DIR))
}

/// Same as [`load_config`] with an explicit config directory.
pub fn load_config_from(config_dir: &Path) -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !config_dir.exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            config_dir.display()
        );
    }

    let config = Config::builder()
        .set_default("database_url", "sqlite://storefront.db?mode=rwc")?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .set_default("credential_key", DEV_DEFAULT_CREDENTIAL_KEY)?
        .add_source(File::from(config_dir.join("default")).required(false))
        .add_source(File::from(config_dir.join(&run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    app_config.validate_additional_constraints().map_err(|e| {
        error!("Configuration security validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}
