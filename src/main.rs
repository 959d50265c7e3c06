//! Shopify MCP Server - Rust Implementation
//!
//! A Model Context Protocol (MCP) server for the Shopify Admin API.
//! Provides tools for orders, draft orders, products and collections.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use shopify_mcp_server::config::{Config, DOMAIN_VAR};
use shopify_mcp_server::mcp::server::McpServer;
use shopify_mcp_server::mcp::tools::ToolHandler;
use shopify_mcp_server::shopify::{ShopifyClient, ShopifyClientPort};

/// Shopify MCP Server
#[derive(Parser)]
#[command(name = "shopify-mcp-server")]
#[command(author, version, about = "Shopify MCP Server - A Model Context Protocol server for the Shopify Admin API")]
struct Cli {
    /// Store domain, overrides MYSHOPIFY_DOMAIN
    #[arg(long, global = true)]
    domain: Option<String>,

    /// Admin API version, overrides SHOPIFY_API_VERSION
    #[arg(long, global = true)]
    api_version: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tool catalogue as JSON
    Tools,

    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "no .env file loaded");
    }

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Some(Commands::Check) => {
            let endpoint = config.graphql_endpoint();
            ShopifyClient::new(&config).context("Failed to build Shopify client")?;
            eprintln!("Configuration OK: {}", endpoint);
        }
        Some(Commands::Tools) => {
            let handler = ToolHandler::new(build_client(&config)?);
            let catalogue = serde_json::to_string_pretty(&handler.list_tools())?;
            println!("{}", catalogue);
        }
        None => {
            run_server(config).await?;
        }
    }

    Ok(())
}

/// Environment (and `.env`) configuration with CLI overrides applied
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let config = match &cli.domain {
        None => Config::from_env(),
        Some(domain) => Config::from_lookup(|key| match key {
            DOMAIN_VAR => Some(domain.clone()),
            _ => std::env::var(key).ok(),
        }),
    }
    .context("Failed to load configuration")?;

    Ok(match &cli.api_version {
        Some(version) => config.with_api_version(version.clone()),
        None => config,
    })
}

fn build_client(config: &Config) -> anyhow::Result<Arc<dyn ShopifyClientPort>> {
    let client = ShopifyClient::new(config).context("Failed to build Shopify client")?;
    Ok(Arc::new(client))
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        shop = %config.shop_domain,
        api_version = %config.api_version,
        "starting shopify MCP server"
    );

    let mut server = McpServer::new(build_client(&config)?);
    server.run_stdio().await.context("MCP server stopped")?;

    Ok(())
}
