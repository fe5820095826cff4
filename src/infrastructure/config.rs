use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::str::FromStr;
use thiserror::Error;

use crate::services::pricing::PricingPolicy;

const DEV_JWT_SECRET: &str = "bookstore-dev-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable must be set in production")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Google sign-in credentials. Sign-in is disabled unless all three are set.
#[derive(Debug)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub callback_url: String,
}

#[derive(Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: SecretString,
    pub jwt_ttl_hours: i64,
    /// Frontend origin, used for CORS and post-login redirects
    pub client_url: String,
    pub cookie_secure: bool,
    pub google: Option<GoogleConfig>,
    pub pricing: PricingPolicy,
    pub low_stock_threshold: i32,
    pub seed_demo: bool,
}

impl Config {
    /// Defaults suitable for local development and tests.
    pub fn with_defaults(database_url: &str, jwt_secret: &str) -> Self {
        Self {
            database_url: database_url.to_string(),
            port: 5000,
            jwt_secret: SecretString::new(jwt_secret.to_string()),
            jwt_ttl_hours: 24,
            client_url: "http://localhost:5173".to_string(),
            cookie_secure: false,
            google: None,
            pricing: PricingPolicy::default(),
            low_stock_threshold: 5,
            seed_demo: false,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://bookstore.db?mode=rwc".to_string());

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                DEV_JWT_SECRET.to_string()
            }
            _ => return Err(ConfigError::Missing("JWT_SECRET")),
        };

        let mut config = Self::with_defaults(&database_url, &jwt_secret);

        config.port = parse_var("PORT", config.port)?;
        config.jwt_ttl_hours = parse_var("JWT_TTL_HOURS", config.jwt_ttl_hours)?;
        config.cookie_secure = parse_var("COOKIE_SECURE", config.cookie_secure)?;
        config.low_stock_threshold = parse_var("LOW_STOCK_THRESHOLD", config.low_stock_threshold)?;
        config.seed_demo = env::var("SEED_DEMO").is_ok();
        if let Ok(url) = env::var("CLIENT_URL") {
            config.client_url = url.trim_end_matches('/').to_string();
        }

        config.pricing = PricingPolicy {
            free_shipping_threshold: parse_var(
                "FREE_SHIPPING_THRESHOLD",
                config.pricing.free_shipping_threshold,
            )?,
            shipping_fee: parse_var("SHIPPING_FEE", config.pricing.shipping_fee)?,
            tax_rate: parse_var("TAX_RATE", config.pricing.tax_rate)?,
        };

        config.google = match (
            env::var("GOOGLE_CLIENT_ID"),
            env::var("GOOGLE_CLIENT_SECRET"),
            env::var("GOOGLE_CALLBACK_URL"),
        ) {
            (Ok(client_id), Ok(secret), Ok(callback_url)) => Some(GoogleConfig {
                client_id,
                client_secret: SecretString::new(secret),
                callback_url,
            }),
            _ => {
                tracing::info!("Google sign-in disabled (GOOGLE_* variables not set)");
                None
            }
        };

        Ok(config)
    }

    pub fn jwt_secret(&self) -> &str {
        self.jwt_secret.expose_secret()
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => parse_value(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T: FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_string(),
    })
}
