//! MCP Tool definitions and handlers
//!
//! Every tool is registered through [`ToolHandler::register`], which owns the
//! validate → delegate → normalize pipeline; the per-domain modules only
//! supply argument types and the call into the Shopify client.

mod collections;
mod orders;
mod products;

pub use collections::GetCollectionsArgs;
pub use orders::{CompleteDraftOrderArgs, CreateDraftOrderArgs, GetOrdersArgs};
pub use products::{
    BulkUpdateProductsArgs, CreateProductArgs, GetProductDetailsArgs, GetProductInventoryArgs,
    SearchProductsArgs,
};

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::error::{McpError, Result, ShopifyMcpError, ValidationError};
use crate::mcp::envelope::{format_success, handle_error, Failure};
use crate::mcp::types::{CallToolResult, Tool};
use crate::shopify::port::ShopifyClientPort;

type ToolFuture = Pin<Box<dyn Future<Output = CallToolResult> + Send>>;
type BoxedTool = Arc<dyn Fn(Arc<dyn ShopifyClientPort>, Value) -> ToolFuture + Send + Sync>;

struct RegisteredTool {
    name: &'static str,
    description: &'static str,
    input_schema: Value,
    run: BoxedTool,
}

/// Tool handler
pub struct ToolHandler {
    client: Arc<dyn ShopifyClientPort>,
    tools: Vec<RegisteredTool>,
}

impl ToolHandler {
    /// Create a tool handler with the full Shopify tool set
    pub fn new(client: Arc<dyn ShopifyClientPort>) -> Self {
        let mut handler = Self::empty(client);
        orders::register(&mut handler);
        products::register(&mut handler);
        collections::register(&mut handler);
        handler
    }

    /// Create a tool handler with no tools registered
    pub fn empty(client: Arc<dyn ShopifyClientPort>) -> Self {
        Self {
            client,
            tools: Vec::new(),
        }
    }

    /// Register a tool.
    ///
    /// `A` is the argument type: its JSON schema is advertised, raw arguments
    /// are deserialized into it and validated before `handler` runs.
    /// `default_message` names the failure when nothing better is known.
    pub fn register<A, R, F, Fut>(
        &mut self,
        name: &'static str,
        description: &'static str,
        default_message: fn(&A) -> String,
        handler: F,
    ) where
        A: DeserializeOwned + JsonSchema + Validate + Send + 'static,
        R: Serialize + Send + 'static,
        F: Fn(Arc<dyn ShopifyClientPort>, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let run: BoxedTool = Arc::new(move |client: Arc<dyn ShopifyClientPort>, args: Value| -> ToolFuture {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                let args: A = match parse_arguments(args) {
                    Ok(a) => a,
                    Err(e) => {
                        tracing::warn!(tool = name, error = %e, "rejected tool arguments");
                        return handle_error(&format!("Invalid arguments for {}", name), e.into());
                    }
                };

                let default_message = default_message(&args);
                let task = tokio::spawn(async move {
                    let data = handler(client, args).await?;
                    format_success(&data)
                });

                let failure = match task.await {
                    Ok(Ok(result)) => return result,
                    Ok(Err(err)) => Failure::Error(err),
                    Err(join_err) if join_err.is_panic() => Failure::Panic(join_err.into_panic()),
                    Err(_) => Failure::Error(
                        McpError::ToolCancelled {
                            name: name.to_string(),
                        }
                        .into(),
                    ),
                };

                tracing::warn!(tool = name, "{}", default_message);
                handle_error(&default_message, failure)
            })
        });

        self.tools.push(RegisteredTool {
            name,
            description,
            input_schema: input_schema::<A>(),
            run,
        });
    }

    /// List all available tools
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tools
            .iter()
            .map(|t| Tool {
                name: t.name.to_string(),
                description: Some(t.description.to_string()),
                input_schema: t.input_schema.clone(),
            })
            .collect()
    }

    /// Call a tool by name
    pub async fn call_tool(&self, name: &str, args: Value) -> CallToolResult {
        let Some(tool) = self.tools.iter().find(|t| t.name == name) else {
            let err: ShopifyMcpError = McpError::UnknownTool {
                name: name.to_string(),
            }
            .into();
            return handle_error(&format!("Unknown tool: {}", name), err.into());
        };

        tracing::info!(tool = name, "calling tool");
        (tool.run)(Arc::clone(&self.client), args).await
    }
}

/// Deserialize and validate raw tool arguments
fn parse_arguments<A: DeserializeOwned + Validate>(args: Value) -> Result<A> {
    let args = match args {
        Value::Null => json!({}),
        other => other,
    };

    let parsed: A = serde_json::from_value(args).map_err(|e| ValidationError::InvalidArguments {
        message: e.to_string(),
    })?;
    parsed.validate()?;
    Ok(parsed)
}

/// JSON schema of `A` with nested definitions inlined
fn input_schema<A: JsonSchema>() -> Value {
    let schema = SchemaSettings::draft07()
        .with(|s| s.inline_subschemas = true)
        .into_generator()
        .into_root_schema_for::<A>();

    let mut value =
        serde_json::to_value(schema).unwrap_or_else(|_| json!({ "type": "object", "properties": {} }));
    if let Some(obj) = value.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
        obj.entry("properties").or_insert_with(|| json!({}));
    }
    value
}

/// Schema-level check that a list argument is not empty
fn require_non_empty<T>(items: &[T], code: &'static str) -> std::result::Result<(), validator::ValidationError> {
    if items.is_empty() {
        let mut err = validator::ValidationError::new(code);
        err.message = Some(format!("{} must not be empty", code).into());
        return Err(err);
    }
    Ok(())
}
