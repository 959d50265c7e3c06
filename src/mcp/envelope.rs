//! Success and error envelopes returned by every tool.

use std::any::Any;
use std::error::Error as StdError;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Result, ShopifyMcpError};
use crate::mcp::types::{CallToolResult, ToolResultContent};

/// Anything that can stop a tool handler
#[derive(Debug)]
pub enum Failure {
    /// The handler returned an error
    Error(ShopifyMcpError),

    /// The handler panicked with this payload
    Panic(Box<dyn Any + Send + 'static>),
}

impl From<ShopifyMcpError> for Failure {
    fn from(err: ShopifyMcpError) -> Self {
        Failure::Error(err)
    }
}

/// Wrap `data` in a success envelope: compact JSON text plus the value itself.
pub fn format_success<T: Serialize + ?Sized>(data: &T) -> Result<CallToolResult> {
    let value = serde_json::to_value(data)?;
    let text = serde_json::to_string(&value)?;

    Ok(CallToolResult {
        content: vec![ToolResultContent::Text { text }],
        is_error: false,
        data: Some(value),
        error: None,
    })
}

/// Turn any failure into an error envelope.
///
/// Domain errors keep their code and context, other errors carry their source
/// chain, and panics fall back to `default_message`.
pub fn handle_error(default_message: &str, failure: Failure) -> CallToolResult {
    match failure {
        Failure::Error(ShopifyMcpError::Domain(domain)) => {
            let mut detail = Map::new();
            detail.insert("code".into(), Value::String(domain.code));
            if let Some(context) = domain.context_data {
                detail.insert("contextData".into(), context);
            }
            if let Some(inner) = domain.inner_error {
                detail.insert("innerError".into(), Value::String(inner));
            }
            CallToolResult::error(
                non_empty_or(domain.message, default_message),
                Value::Object(detail),
            )
        }
        Failure::Error(err) => {
            let trace = error_trace(&err);
            CallToolResult::error(
                non_empty_or(err.to_string(), default_message),
                Value::String(trace),
            )
        }
        Failure::Panic(payload) => {
            CallToolResult::error(default_message, Value::String(panic_message(payload.as_ref())))
        }
    }
}

fn non_empty_or(message: String, default_message: &str) -> String {
    if message.trim().is_empty() {
        default_message.to_string()
    } else {
        message
    }
}

/// `Debug` of the error followed by its `source()` chain
fn error_trace(err: &ShopifyMcpError) -> String {
    let mut trace = format!("{:?}", err);
    let mut source = err.source();
    while let Some(cause) = source {
        trace.push_str("\ncaused by: ");
        trace.push_str(&cause.to_string());
        source = cause.source();
    }
    trace
}

/// Best-effort string form of a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
