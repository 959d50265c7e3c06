//! Shopify Admin API module
//!
//! Contains types, the client port and its GraphQL implementation.

pub mod client;
pub mod graphql;
pub mod orders;
pub mod port;
pub mod products;
pub mod queries;
pub mod types;

pub use client::ShopifyClient;
pub use port::ShopifyClientPort;

/// Search query selecting collections by title
pub fn collection_name_query(name: &str) -> String {
    format!("title:{}", name)
}
