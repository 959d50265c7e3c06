//! Configuration management for the Shopify MCP Server
//!
//! Handles the access token, store domain and API settings, read once from the
//! environment at startup.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::{ConfigError, Result};

/// Environment variable holding the Admin API access token
pub const ACCESS_TOKEN_VAR: &str = "SHOPIFY_ACCESS_TOKEN";

/// Environment variable holding the `*.myshopify.com` domain
pub const DOMAIN_VAR: &str = "MYSHOPIFY_DOMAIN";

/// Environment variable overriding the Admin API version
pub const API_VERSION_VAR: &str = "SHOPIFY_API_VERSION";

/// Environment variable overriding the HTTP request timeout
pub const TIMEOUT_VAR: &str = "SHOPIFY_REQUEST_TIMEOUT_SECS";

/// Configuration for the Shopify MCP Server
///
/// `Debug` is implemented by hand so the access token never reaches a log line.
#[derive(Clone)]
pub struct Config {
    /// Admin API access token (HIGH PRIVILEGE)
    pub access_token: SecretString,

    /// Store domain, e.g. `my-store.myshopify.com`
    pub shop_domain: String,

    /// Admin API version, e.g. `2026-01`
    pub api_version: String,

    /// Per-request HTTP timeout
    pub request_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("access_token", &"[REDACTED]")
            .field("shop_domain", &self.shop_domain)
            .field("api_version", &self.api_version)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_token = lookup(ACCESS_TOKEN_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar {
                var: ACCESS_TOKEN_VAR.to_string(),
            })?;

        let raw_domain = lookup(DOMAIN_VAR).ok_or_else(|| ConfigError::MissingEnvVar {
            var: DOMAIN_VAR.to_string(),
        })?;
        let shop_domain = normalize_domain(&raw_domain)?;

        let api_version = lookup(API_VERSION_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| shopify::DEFAULT_API_VERSION.to_string());

        let request_timeout = match lookup(TIMEOUT_VAR) {
            Some(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| ConfigError::InvalidConfig {
                        message: format!(
                            "{} must be a positive whole number of seconds, got '{}'",
                            TIMEOUT_VAR, raw
                        ),
                    })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(shopify::DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            access_token: SecretString::from(access_token),
            shop_domain,
            api_version,
            request_timeout,
        })
    }

    /// Replace the API version (used by CLI overrides)
    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// GraphQL endpoint for the configured store and API version
    pub fn graphql_endpoint(&self) -> String {
        format!(
            "https://{}/admin/api/{}/graphql.json",
            self.shop_domain, self.api_version
        )
    }
}

/// Strip scheme and trailing slashes from a store domain
fn normalize_domain(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let domain = without_scheme.trim_end_matches('/');

    if domain.is_empty() || domain.contains('/') || domain.contains(char::is_whitespace) {
        return Err(ConfigError::InvalidConfig {
            message: format!("{} is not a valid store domain: '{}'", DOMAIN_VAR, raw),
        }
        .into());
    }

    Ok(domain.to_string())
}

/// Shopify API constants
pub mod shopify {
    /// Admin API version used when none is configured
    /// Oldest release whose `draftOrderCreate` takes the `@idempotent` directive
    pub const DEFAULT_API_VERSION: &str = "2026-01";

    /// HTTP timeout used when none is configured
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Header carrying the Admin API access token
    pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

    /// Largest page Shopify accepts for a connection
    pub const MAX_PAGE_SIZE: i64 = 250;

    /// Default page sizes
    pub const DEFAULT_ORDERS_PAGE: i64 = 10;
    pub const DEFAULT_COLLECTIONS_PAGE: i64 = 10;
    pub const DEFAULT_PRODUCTS_PAGE: i64 = 50;

    /// Nested connection sizes when loading a product or order
    pub const VARIANTS_PER_PRODUCT: i64 = 50;
    pub const IMAGES_PER_PRODUCT: i64 = 20;
    pub const LINE_ITEMS_PER_ORDER: i64 = 50;
}
