//! MCP Server implementation
//!
//! Implements the Model Context Protocol server for stdio transport.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::error::{Result, ValidationError};
use crate::mcp::envelope::{handle_error, Failure};
use crate::mcp::tools::ToolHandler;
use crate::mcp::types::*;
use crate::shopify::port::ShopifyClientPort;

/// MCP Server info
const SERVER_NAME: &str = "shopify";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP Server for the Shopify Admin API
pub struct McpServer {
    /// Tool handler
    tool_handler: ToolHandler,

    /// Whether the client confirmed initialization
    initialized: bool,
}

impl McpServer {
    /// Create a new MCP server exposing every Shopify tool
    pub fn new(client: Arc<dyn ShopifyClientPort>) -> Self {
        Self::with_tools(ToolHandler::new(client))
    }

    /// Create a server around an existing tool handler
    pub fn with_tools(tool_handler: ToolHandler) -> Self {
        Self {
            tool_handler,
            initialized: false,
        }
    }

    /// Whether `notifications/initialized` has been received
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the server on stdio
    pub async fn run_stdio(&mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        tracing::info!("shopify MCP server listening on stdio");

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            match self.handle_message(&line).await {
                Ok(Some(response)) => {
                    let mut response_str = serde_json::to_string(&response)?;
                    response_str.push('\n');
                    stdout.write_all(response_str.as_bytes()).await?;
                    stdout.flush().await?;
                }
                Ok(None) => {
                    // Notification, no response needed
                }
                Err(e) => {
                    tracing::error!(error = %e, "error handling message");
                }
            }
        }

        tracing::info!("stdin closed, shutting down");
        Ok(())
    }

    /// Handle an incoming JSON-RPC message
    pub async fn handle_message(&mut self, message: &str) -> Result<Option<JsonRpcResponse>> {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(req) => req,
            Err(e) => {
                tracing::warn!(error = %e, "unparseable message");
                return Ok(Some(JsonRpcResponse::error(
                    None,
                    JsonRpcError::parse_error(e.to_string()),
                )));
            }
        };

        tracing::debug!(method = %request.method, "received request");

        let response = match request.method.as_str() {
            methods::INITIALIZE => {
                let result = self.handle_initialize(&request)?;
                JsonRpcResponse::success(request.id.clone(), result)
            }
            methods::INITIALIZED => {
                self.initialized = true;
                return Ok(None);
            }
            methods::PING => JsonRpcResponse::success(request.id.clone(), json!({})),
            methods::LIST_TOOLS => {
                let result = self.handle_list_tools()?;
                JsonRpcResponse::success(request.id.clone(), result)
            }
            methods::CALL_TOOL => {
                let result = self.handle_call_tool(&request).await;
                JsonRpcResponse::success(request.id.clone(), result)
            }
            _ => JsonRpcResponse::error(
                request.id.clone(),
                JsonRpcError::method_not_found(&request.method),
            ),
        };

        // Notifications never get a response
        if request.id.is_none() {
            return Ok(None);
        }
        Ok(Some(response))
    }

    /// Handle initialize request
    fn handle_initialize(&self, request: &JsonRpcRequest) -> Result<Value> {
        let params = request
            .params
            .clone()
            .and_then(|p| serde_json::from_value::<InitializeParams>(p).ok());

        match params {
            Some(InitializeParams {
                protocol_version,
                client_info: Some(client),
            }) => tracing::info!(
                client = %client.name,
                client_version = client.version.as_deref().unwrap_or("unknown"),
                %protocol_version,
                "initializing"
            ),
            _ => tracing::info!("initializing"),
        }

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability::default()),
            },
        };

        Ok(serde_json::to_value(result)?)
    }

    /// Handle list tools request
    fn handle_list_tools(&self) -> Result<Value> {
        let result = ListToolsResult {
            tools: self.tool_handler.list_tools(),
        };

        Ok(serde_json::to_value(result)?)
    }

    /// Handle call tool request
    async fn handle_call_tool(&self, request: &JsonRpcRequest) -> Value {
        let params: CallToolParams = match request.params.as_ref() {
            Some(p) => match serde_json::from_value(p.clone()) {
                Ok(params) => params,
                Err(e) => {
                    return invalid_call("Invalid tool parameters", e.to_string());
                }
            },
            None => {
                return invalid_call("Missing tool parameters", "params are required".to_string());
            }
        };

        let result = self.tool_handler.call_tool(&params.name, params.arguments).await;
        envelope_value(&result)
    }
}

fn invalid_call(default_message: &str, message: String) -> Value {
    let err = ValidationError::InvalidArguments { message };
    envelope_value(&handle_error(default_message, Failure::Error(err.into())))
}

fn envelope_value(result: &CallToolResult) -> Value {
    serde_json::to_value(result).unwrap_or_else(|e| {
        json!({
            "content": [{"type": "text", "text": e.to_string()}],
            "isError": true
        })
    })
}
