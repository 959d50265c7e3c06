//! Shopify MCP Server Library
//!
//! A Model Context Protocol (MCP) server for the Shopify Admin API.
//! Provides tools for reading orders, managing draft orders, products and
//! collections through Shopify's GraphQL API.

pub mod config;
pub mod error;
pub mod mcp;
pub mod shopify;

pub use config::Config;
pub use error::{Result, ShopifyMcpError};
