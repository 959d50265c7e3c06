//! Order and draft order tools

use std::sync::Arc;

use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

use super::{require_non_empty, ToolHandler};
use crate::config::shopify::DEFAULT_ORDERS_PAGE;
use crate::error::Result;
use crate::shopify::orders::{draft_order_input, generate_idempotency_key};
use crate::shopify::port::ShopifyClientPort;
use crate::shopify::types::{
    DraftLineItem, DraftOrderCompleted, DraftOrderCreated, MailingAddress, OrderQuery,
    OrderSortKey, OrdersPage,
};

/// Arguments of `get-orders`
#[derive(Debug, Clone, Default, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GetOrdersArgs {
    /// Limit of orders to return
    #[serde(default)]
    #[validate(range(min = 1, max = 250))]
    pub first: Option<i64>,

    /// Next page cursor
    #[serde(default)]
    pub after: Option<String>,

    /// Filter orders using query syntax
    #[serde(default)]
    pub query: Option<String>,

    /// Field to sort by
    #[serde(default)]
    pub sort_key: Option<OrderSortKey>,

    /// Reverse sort order
    #[serde(default)]
    pub reverse: Option<bool>,
}

/// Arguments of `create-draft-order`
#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "has_line_items"))]
pub struct CreateDraftOrderArgs {
    /// Line items to add to the order
    #[validate]
    pub line_items: Vec<DraftLineItem>,

    /// Customer email
    #[validate(email)]
    pub email: String,

    /// Shipping address details
    #[validate]
    pub shipping_address: MailingAddress,

    /// Optional note for the order
    #[serde(default)]
    pub note: Option<String>,

    /// Key that makes retries of this call create the order only once
    #[serde(default)]
    #[validate(length(min = 1, max = 255))]
    pub idempotency_key: Option<String>,
}

fn has_line_items(args: &CreateDraftOrderArgs) -> std::result::Result<(), validator::ValidationError> {
    require_non_empty(&args.line_items, "lineItems")
}

/// Arguments of `complete-draft-order`
#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompleteDraftOrderArgs {
    /// ID of the draft order to complete
    #[validate(length(min = 1))]
    pub draft_order_id: String,

    /// ID of the variant in the draft order
    #[validate(length(min = 1))]
    pub variant_id: String,
}

pub(super) fn register(handler: &mut ToolHandler) {
    handler.register(
        "get-orders",
        "Get orders with advanced filtering and sorting",
        |_: &GetOrdersArgs| "Failed to retrieve orders".to_string(),
        get_orders,
    );

    handler.register(
        "create-draft-order",
        "Create a draft order",
        |_: &CreateDraftOrderArgs| "Failed to create draft order".to_string(),
        create_draft_order,
    );

    handler.register(
        "complete-draft-order",
        "Complete a draft order",
        |args: &CompleteDraftOrderArgs| {
            format!("Failed to complete draft order {}", args.draft_order_id)
        },
        complete_draft_order,
    );
}

async fn get_orders(client: Arc<dyn ShopifyClientPort>, args: GetOrdersArgs) -> Result<OrdersPage> {
    client
        .load_orders(OrderQuery {
            first: args.first.unwrap_or(DEFAULT_ORDERS_PAGE),
            after: args.after,
            query: args.query,
            sort_key: args.sort_key,
            reverse: args.reverse,
        })
        .await
}

async fn create_draft_order(
    client: Arc<dyn ShopifyClientPort>,
    args: CreateDraftOrderArgs,
) -> Result<DraftOrderCreated> {
    let idempotency_key = args
        .idempotency_key
        .unwrap_or_else(generate_idempotency_key);
    let input = draft_order_input(args.line_items, args.email, args.shipping_address, args.note);

    tracing::debug!(%idempotency_key, "creating draft order");
    client.create_draft_order(input, &idempotency_key).await
}

async fn complete_draft_order(
    client: Arc<dyn ShopifyClientPort>,
    args: CompleteDraftOrderArgs,
) -> Result<DraftOrderCompleted> {
    client
        .complete_draft_order(&args.draft_order_id, &args.variant_id)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft_args() -> serde_json::Value {
        json!({
            "lineItems": [{"variantId": "gid://shopify/ProductVariant/1", "quantity": 2}],
            "email": "ada@example.com",
            "shippingAddress": {
                "address1": "1 Main St",
                "countryCode": "US",
                "firstName": "Ada",
                "lastName": "Lovelace",
                "zip": "10001",
                "city": "New York",
                "country": "United States"
            }
        })
    }

    #[test]
    fn test_draft_order_args_accept_minimal_input() {
        let args: CreateDraftOrderArgs = serde_json::from_value(draft_args()).unwrap();
        assert!(args.validate().is_ok());
        assert!(args.note.is_none());
        assert!(args.idempotency_key.is_none());
    }

    #[test]
    fn test_draft_order_args_rejects_bad_input() {
        let mut value = draft_args();
        value["email"] = json!("not-an-email");
        let args: CreateDraftOrderArgs = serde_json::from_value(value).unwrap();
        assert!(args.validate().is_err());

        let mut value = draft_args();
        value["lineItems"] = json!([]);
        let args: CreateDraftOrderArgs = serde_json::from_value(value).unwrap();
        assert!(args.validate().is_err());

        let mut value = draft_args();
        value["lineItems"][0]["quantity"] = json!(0);
        let args: CreateDraftOrderArgs = serde_json::from_value(value).unwrap();
        assert!(args.validate().is_err());

        let mut value = draft_args();
        value["shippingAddress"]["countryCode"] = json!("USA");
        let args: CreateDraftOrderArgs = serde_json::from_value(value).unwrap();
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_orders_page_size_bounds() {
        let args = GetOrdersArgs {
            first: Some(251),
            ..Default::default()
        };
        assert!(args.validate().is_err());

        let args = GetOrdersArgs {
            first: Some(250),
            ..Default::default()
        };
        assert!(args.validate().is_ok());
    }
}
