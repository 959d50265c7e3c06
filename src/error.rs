//! Error types for the Shopify MCP Server
//!
//! This module defines the error hierarchy for all operations in the server.
//! [`DomainError`] is the structured failure reported by the Shopify API; every
//! other variant is a plain runtime error.

use serde_json::Value;
use thiserror::Error;

/// Main error type for the Shopify MCP Server
#[derive(Error, Debug)]
pub enum ShopifyMcpError {
    /// Structured rejection from the Shopify API (carries a machine-readable code)
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Shopify API errors without a structured code
    #[error("Shopify API error: {0}")]
    Shopify(#[from] ShopifyApiError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// MCP protocol errors
    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A failure reported by the remote commerce API.
///
/// `code` is stable and meant for programmatic consumers; `message` is for
/// display. `context_data` holds whatever the remote returned alongside
/// (user errors, status codes, ids).
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct DomainError {
    pub code: String,
    pub message: String,
    pub context_data: Option<Value>,
    pub inner_error: Option<String>,
}

impl DomainError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context_data: None,
            inner_error: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context_data: Value) -> Self {
        self.context_data = Some(context_data);
        self
    }

    #[must_use]
    pub fn with_inner(mut self, inner: impl std::fmt::Display) -> Self {
        self.inner_error = Some(inner.to_string());
        self
    }
}

/// Domain error codes produced by the Shopify client
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const RATE_LIMITED: &str = "RATE_LIMITED";
    pub const HTTP_ERROR: &str = "HTTP_ERROR";
    pub const GRAPHQL_ERROR: &str = "GRAPHQL_ERROR";
    pub const DRAFT_ORDER_CREATE_FAILED: &str = "DRAFT_ORDER_CREATE_FAILED";
    pub const DRAFT_ORDER_COMPLETE_FAILED: &str = "DRAFT_ORDER_COMPLETE_FAILED";
    pub const DRAFT_ORDER_NOT_FOUND: &str = "DRAFT_ORDER_NOT_FOUND";
    pub const DRAFT_ORDER_VARIANT_MISMATCH: &str = "DRAFT_ORDER_VARIANT_MISMATCH";
    pub const PRODUCT_CREATE_FAILED: &str = "PRODUCT_CREATE_FAILED";
    pub const PRODUCT_VARIANTS_CREATE_FAILED: &str = "PRODUCT_VARIANTS_CREATE_FAILED";
    pub const PRODUCT_UPDATE_FAILED: &str = "PRODUCT_UPDATE_FAILED";
}

/// Shopify API errors
#[derive(Error, Debug)]
pub enum ShopifyApiError {
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: String },

    #[error("Variant not found: {variant_id}")]
    VariantNotFound { variant_id: String },

    #[error("Collection not found: {collection_id}")]
    CollectionNotFound { collection_id: String },

    #[error("No data returned for {operation}")]
    MissingData { operation: String },

    #[error("No location available to stock inventory")]
    NoLocation,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}")]
    MissingEnvVar { var: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid arguments: {message}")]
    InvalidArguments { message: String },
}

/// MCP protocol errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Tool {name} was cancelled before completing")]
    ToolCancelled { name: String },
}

/// Result type alias for Shopify MCP operations
pub type Result<T> = std::result::Result<T, ShopifyMcpError>;

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ValidationError::InvalidArguments {
            message: errors.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for ShopifyMcpError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ShopifyMcpError::Validation(ValidationError::from(errors))
    }
}

impl ShopifyMcpError {
    /// The structured domain error, if this is one
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            ShopifyMcpError::Domain(domain) => Some(domain),
            _ => None,
        }
    }
}
