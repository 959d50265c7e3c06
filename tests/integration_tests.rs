//! Integration tests for Shopify MCP Server
//!
//! These tests drive the tool handler and the MCP protocol layer against an
//! in-memory Shopify double - they don't make real API calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use shopify_mcp_server::error::{codes, DomainError, Result, ShopifyApiError};
use shopify_mcp_server::mcp::server::McpServer;
use shopify_mcp_server::mcp::tools::ToolHandler;
use shopify_mcp_server::mcp::types::CallToolResult;
use shopify_mcp_server::shopify::port::ShopifyClientPort;
use shopify_mcp_server::shopify::types::*;

/// Helper to create a JSON-RPC request
fn make_request(id: i64, method: &str, params: Option<Value>) -> String {
    let mut request = json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
    });
    if let Some(p) = params {
        request["params"] = p;
    }
    request.to_string()
}

/// Helper to parse JSON-RPC response
fn parse_response(response: &impl serde::Serialize) -> Value {
    serde_json::to_value(response).expect("Failed to serialize JSON response")
}

fn page_info() -> PageInfo {
    PageInfo {
        has_next_page: false,
        end_cursor: None,
    }
}

fn order(n: u32) -> Order {
    Order {
        id: format!("gid://shopify/Order/{}", n),
        name: format!("#{}", 1000 + n),
        created_at: format!("2024-01-0{}T00:00:00Z", n),
        financial_status: Some("PAID".to_string()),
        fulfillment_status: None,
        email: Some("buyer@example.com".to_string()),
        total_price: Some(Money {
            amount: "10.00".to_string(),
            currency_code: "USD".to_string(),
        }),
        subtotal_price: None,
        total_shipping_price: None,
        total_tax: None,
        customer: None,
        shipping_address: None,
        line_items: vec![],
        tags: vec![],
        note: None,
    }
}

fn variant(id: &str, price: &str) -> ProductVariant {
    ProductVariant {
        id: id.to_string(),
        title: "Default Title".to_string(),
        price: price.to_string(),
        sku: None,
        available_for_sale: true,
        inventory_policy: InventoryPolicy::Deny,
        inventory_quantity: Some(3),
    }
}

fn product(id: &str, title: &str, variants: Vec<ProductVariant>) -> Product {
    Product {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("{} description", title),
        handle: None,
        status: Some(ProductStatus::Active),
        vendor: None,
        product_type: None,
        tags: vec![],
        variants,
        images: vec![],
    }
}

fn products_page(products: Vec<Product>) -> ProductsPage {
    ProductsPage {
        products,
        page_info: page_info(),
    }
}

/// In-memory Shopify that records every call it receives
#[derive(Default)]
struct MockShopify {
    calls: Mutex<Vec<String>>,
    orders: Vec<Order>,
    draft_orders: Mutex<HashMap<String, DraftOrderCreated>>,
    complete_error: Option<DomainError>,
}

impl MockShopify {
    fn with_orders(orders: Vec<Order>) -> Self {
        Self {
            orders,
            ..Default::default()
        }
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn draft_order_count(&self) -> usize {
        self.draft_orders.lock().unwrap().len()
    }
}

#[async_trait]
impl ShopifyClientPort for MockShopify {
    async fn load_orders(&self, query: OrderQuery) -> Result<OrdersPage> {
        self.record(format!(
            "load_orders:{}:{:?}:{:?}",
            query.first, query.sort_key, query.reverse
        ));
        let mut orders: Vec<Order> = self.orders.iter().take(query.first as usize).cloned().collect();
        if query.reverse == Some(true) {
            orders.reverse();
        }
        Ok(OrdersPage {
            orders,
            page_info: page_info(),
        })
    }

    async fn create_draft_order(
        &self,
        input: DraftOrderInput,
        idempotency_key: &str,
    ) -> Result<DraftOrderCreated> {
        self.record(format!("create_draft_order:{}", idempotency_key));
        assert_eq!(input.billing_address, input.shipping_address);

        let mut drafts = self.draft_orders.lock().unwrap();
        let next = drafts.len() + 1;
        let created = drafts
            .entry(idempotency_key.to_string())
            .or_insert_with(|| DraftOrderCreated {
                draft_order_id: format!("gid://shopify/DraftOrder/{}", next),
                draft_order_name: format!("#D{}", next),
            });
        Ok(created.clone())
    }

    async fn complete_draft_order(
        &self,
        draft_order_id: &str,
        variant_id: &str,
    ) -> Result<DraftOrderCompleted> {
        self.record(format!("complete_draft_order:{}:{}", draft_order_id, variant_id));
        if let Some(err) = &self.complete_error {
            return Err(err.clone().into());
        }
        Ok(DraftOrderCompleted {
            draft_order_id: draft_order_id.to_string(),
            draft_order_name: "#D1".to_string(),
            order_id: Some("gid://shopify/Order/77".to_string()),
        })
    }

    async fn load_products(&self, search_title: Option<&str>, limit: i64) -> Result<ProductsPage> {
        self.record(format!("load_products:{}:{}", search_title.unwrap_or("*"), limit));
        Ok(products_page(vec![
            product("gid://shopify/Product/1", "Soap", vec![variant("gid://shopify/ProductVariant/1", "4.50")]),
            product("gid://shopify/Product/2", "Gift card", vec![]),
        ]))
    }

    async fn load_product(&self, product_id: &str) -> Result<Option<Product>> {
        self.record(format!("load_product:{}", product_id));
        if product_id == "gid://shopify/Product/1" {
            return Ok(Some(product(
                product_id,
                "Soap",
                vec![variant("gid://shopify/ProductVariant/1", "4.50")],
            )));
        }
        Ok(None)
    }

    async fn load_variant(&self, variant_id: &str) -> Result<Option<ProductVariant>> {
        self.record(format!("load_variant:{}", variant_id));
        if variant_id == "gid://shopify/ProductVariant/1" {
            return Ok(Some(variant(variant_id, "4.50")));
        }
        Ok(None)
    }

    async fn search_products_by_price_range(
        &self,
        min_price: f64,
        max_price: f64,
    ) -> Result<ProductsPage> {
        self.record(format!("price:{}:{}", min_price, max_price));
        Ok(products_page(vec![product(
            "gid://shopify/Product/3",
            "Candle",
            vec![variant("gid://shopify/ProductVariant/3", "15.00")],
        )]))
    }

    async fn load_products_by_collection_id(&self, collection_id: &str) -> Result<ProductsPage> {
        self.record(format!("collection:{}", collection_id));
        Ok(products_page(vec![]))
    }

    async fn create_product(&self, input: CreateProductInput) -> Result<Product> {
        self.record(format!("create_product:{}", input.title));
        if input.title == "explode" {
            panic!("product factory exploded while creating {}", input.title);
        }
        Ok(product("gid://shopify/Product/9", &input.title, vec![]))
    }

    async fn update_product(&self, product_id: &str, update: ProductUpdate) -> Result<Product> {
        self.record(format!("update_product:{}", product_id));
        if product_id.ends_with("/404") {
            return Err(ShopifyApiError::ProductNotFound {
                product_id: product_id.to_string(),
            }
            .into());
        }
        let title = update.title.unwrap_or_else(|| "Soap".to_string());
        Ok(product(product_id, &title, vec![]))
    }

    async fn load_collections(&self, query: CollectionQuery) -> Result<CollectionsPage> {
        self.record(format!(
            "load_collections:{}:{}",
            query.limit,
            query.query.unwrap_or_default()
        ));
        Ok(CollectionsPage {
            collections: vec![Collection {
                id: "gid://shopify/Collection/1".to_string(),
                title: "Summer".to_string(),
                handle: "summer".to_string(),
                description: String::new(),
                products_count: Some(4),
                updated_at: None,
            }],
            page_info: page_info(),
        })
    }
}

fn handler_with(mock: MockShopify) -> (Arc<MockShopify>, ToolHandler) {
    let mock = Arc::new(mock);
    let handler = ToolHandler::new(mock.clone());
    (mock, handler)
}

fn draft_order_args() -> Value {
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

/// The success payload, after checking the text mirrors it exactly
fn success_data(result: &CallToolResult) -> &Value {
    assert!(!result.is_error, "unexpected error: {:?}", result);
    let data = result.data.as_ref().expect("success carries data");
    assert_eq!(result.first_text(), Some(serde_json::to_string(data).unwrap().as_str()));
    data
}

mod tool_tests {
    use super::*;

    #[tokio::test]
    async fn test_get_orders() {
        let (mock, handler) = handler_with(MockShopify::with_orders(vec![order(1), order(2), order(3)]));

        let result = handler
            .call_tool(
                "get-orders",
                json!({"first": 2, "sortKey": "CREATED_AT", "reverse": true}),
            )
            .await;

        let data = success_data(&result);
        assert_eq!(data["orders"].as_array().unwrap().len(), 2);
        assert!(data["pageInfo"].is_object());
        assert_eq!(data["orders"][0]["id"], "gid://shopify/Order/2");
        assert_eq!(mock.calls(), vec!["load_orders:2:Some(CreatedAt):Some(true)"]);
    }

    #[tokio::test]
    async fn test_get_orders_defaults() {
        let (mock, handler) = handler_with(MockShopify::with_orders(vec![order(1)]));

        let result = handler.call_tool("get-orders", Value::Null).await;
        success_data(&result);
        assert_eq!(mock.calls(), vec!["load_orders:10:None:None"]);
    }

    #[tokio::test]
    async fn test_create_draft_order_generates_key() {
        let (mock, handler) = handler_with(MockShopify::default());

        let result = handler.call_tool("create-draft-order", draft_order_args()).await;
        let data = success_data(&result);
        assert_eq!(data["draftOrderId"], "gid://shopify/DraftOrder/1");
        assert_eq!(data["draftOrderName"], "#D1");

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].starts_with("create_draft_order:draft-order-"));
    }

    #[tokio::test]
    async fn test_create_draft_order_is_idempotent() {
        let (mock, handler) = handler_with(MockShopify::default());
        let mut args = draft_order_args();
        args["idempotencyKey"] = json!("checkout-42");

        let first = handler.call_tool("create-draft-order", args.clone()).await;
        let second = handler.call_tool("create-draft-order", args).await;

        assert_eq!(success_data(&first), success_data(&second));
        assert_eq!(mock.draft_order_count(), 1);
        assert_eq!(mock.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_complete_draft_order() {
        let (_, handler) = handler_with(MockShopify::default());

        let result = handler
            .call_tool(
                "complete-draft-order",
                json!({"draftOrderId": "gid://shopify/DraftOrder/1", "variantId": "gid://shopify/ProductVariant/1"}),
            )
            .await;

        let data = success_data(&result);
        assert_eq!(data["orderId"], "gid://shopify/Order/77");
    }

    #[tokio::test]
    async fn test_complete_draft_order_not_found() {
        let (_, handler) = handler_with(MockShopify {
            complete_error: Some(
                DomainError::new(codes::DRAFT_ORDER_NOT_FOUND, "Draft order not found")
                    .with_context(json!({"draftOrderId": "gid://shopify/DraftOrder/404"})),
            ),
            ..Default::default()
        });

        let result = handler
            .call_tool(
                "complete-draft-order",
                json!({"draftOrderId": "gid://shopify/DraftOrder/404", "variantId": "gid://shopify/ProductVariant/1"}),
            )
            .await;

        assert!(result.is_error);
        assert!(result.data.is_none());
        let error = result.error.unwrap();
        assert_eq!(error["code"], "DRAFT_ORDER_NOT_FOUND");
        assert_eq!(error["contextData"]["draftOrderId"], "gid://shopify/DraftOrder/404");
    }

    #[tokio::test]
    async fn test_get_product_details() {
        let (_, handler) = handler_with(MockShopify::default());

        let result = handler
            .call_tool("get-product-details", json!({"productId": "gid://shopify/Product/1"}))
            .await;
        let data = success_data(&result);
        assert_eq!(data["product"]["title"], "Soap");
        assert_eq!(data["product"]["variants"][0]["price"], "4.50");
    }

    #[tokio::test]
    async fn test_get_product_details_missing() {
        let (_, handler) = handler_with(MockShopify::default());

        let result = handler
            .call_tool("get-product-details", json!({"productId": "gid://shopify/Product/404"}))
            .await;
        assert!(result.is_error);
        assert!(result
            .first_text()
            .unwrap()
            .contains("Product not found: gid://shopify/Product/404"));
        assert!(result.error.unwrap().is_string());
    }

    #[tokio::test]
    async fn test_get_product_inventory() {
        let (_, handler) = handler_with(MockShopify::default());

        let result = handler
            .call_tool("get-product-inventory", json!({"variantId": "gid://shopify/ProductVariant/1"}))
            .await;
        let data = success_data(&result);
        assert_eq!(data, &json!({"isAvailable": true, "inventoryPolicy": "DENY"}));
    }

    #[tokio::test]
    async fn test_search_by_price_range_only_calls_price_path() {
        let (mock, handler) = handler_with(MockShopify::default());

        let result = handler
            .call_tool(
                "search-products",
                json!({"title": "Soap", "collection": "gid://shopify/Collection/1", "priceRange": {"min": 10, "max": 20}}),
            )
            .await;

        let data = success_data(&result);
        assert_eq!(data[0]["title"], "Candle");
        assert_eq!(mock.calls(), vec!["price:10:20"]);
    }

    #[tokio::test]
    async fn test_search_by_collection_beats_title() {
        let (mock, handler) = handler_with(MockShopify::default());

        let result = handler
            .call_tool(
                "search-products",
                json!({"title": "Soap", "collection": "gid://shopify/Collection/1"}),
            )
            .await;
        success_data(&result);
        assert_eq!(mock.calls(), vec!["collection:gid://shopify/Collection/1"]);
    }

    #[tokio::test]
    async fn test_search_by_title_summaries() {
        let (mock, handler) = handler_with(MockShopify::default());

        let result = handler.call_tool("search-products", json!({"title": "Soap"})).await;
        let data = success_data(&result);
        assert_eq!(
            data,
            &json!([
                {"id": "gid://shopify/Product/1", "title": "Soap", "price": "4.50", "availableForSale": true},
                {"id": "gid://shopify/Product/2", "title": "Gift card", "price": "0", "availableForSale": false}
            ])
        );
        assert_eq!(mock.calls(), vec!["load_products:Soap:50"]);
    }

    #[tokio::test]
    async fn test_search_blank_filters_are_unset() {
        let (mock, handler) = handler_with(MockShopify::default());

        let result = handler
            .call_tool("search-products", json!({"title": "Soap", "collection": ""}))
            .await;
        success_data(&result);

        let result = handler
            .call_tool("search-products", json!({"title": "  ", "collection": " "}))
            .await;
        success_data(&result);

        assert_eq!(mock.calls(), vec!["load_products:Soap:50", "load_products:*:50"]);
    }

    #[tokio::test]
    async fn test_update_product() {
        let (mock, handler) = handler_with(MockShopify::default());

        let result = handler
            .call_tool(
                "update-product",
                json!({"productId": "gid://shopify/Product/1", "title": "Lavender Soap"}),
            )
            .await;
        let data = success_data(&result);
        assert_eq!(data["title"], "Lavender Soap");
        assert_eq!(mock.calls(), vec!["update_product:gid://shopify/Product/1"]);
    }

    #[tokio::test]
    async fn test_bulk_update_continues_past_failures() {
        let (mock, handler) = handler_with(MockShopify::default());

        let result = handler
            .call_tool(
                "bulk-update-products",
                json!({"updates": [
                    {"productId": "gid://shopify/Product/1", "status": "DRAFT"},
                    {"productId": "gid://shopify/Product/404", "title": "Ghost"},
                    {"productId": "gid://shopify/Product/2", "tags": ["sale"]}
                ]}),
            )
            .await;

        let data = success_data(&result);
        let outcomes = data.as_array().unwrap();
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0], json!({"id": "gid://shopify/Product/1", "success": true}));
        assert_eq!(outcomes[1]["success"], false);
        assert!(outcomes[1]["error"].as_str().unwrap().contains("Product not found"));
        assert_eq!(outcomes[2]["success"], true);
        assert_eq!(mock.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_get_collections_by_name() {
        let (mock, handler) = handler_with(MockShopify::default());

        let result = handler.call_tool("get-collections", json!({"name": "Summer"})).await;
        let data = success_data(&result);
        assert_eq!(data["collections"][0]["productsCount"], 4);
        assert_eq!(mock.calls(), vec!["load_collections:10:title:Summer"]);
    }
}

mod error_tests {
    use super::*;

    #[tokio::test]
    async fn test_panicking_handler_yields_default_message() {
        let (_, handler) = handler_with(MockShopify::default());

        let result = handler
            .call_tool(
                "create-product",
                json!({
                    "title": "explode",
                    "description": "never created",
                    "variants": [{"title": "Only", "price": 1.0, "inventory": 1}]
                }),
            )
            .await;

        assert!(result.is_error);
        assert_eq!(result.first_text(), Some("Failed to create product"));
        assert_eq!(
            result.error,
            Some(json!("product factory exploded while creating explode"))
        );
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let (mock, handler) = handler_with(MockShopify::default());

        let result = handler.call_tool("delete-store", json!({})).await;
        assert!(result.is_error);
        assert_eq!(result.first_text(), Some("Unknown tool: delete-store"));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_arguments_never_reach_client() {
        let (mock, handler) = handler_with(MockShopify::default());

        let mut bad_email = draft_order_args();
        bad_email["email"] = json!("not-an-email");
        let mut no_items = draft_order_args();
        no_items["lineItems"] = json!([]);

        let cases = vec![
            ("create-draft-order", bad_email),
            ("create-draft-order", no_items),
            ("get-orders", json!({"first": 0})),
            ("get-orders", json!({"sortKey": "PRICE"})),
            ("search-products", json!({"priceRange": {"min": 30, "max": 20}})),
            ("get-collections", json!({"limit": 500})),
            ("get-product-details", json!({})),
            ("update-product", json!({"productId": ""})),
        ];

        for (tool, args) in cases {
            let result = handler.call_tool(tool, args.clone()).await;
            assert!(result.is_error, "{} accepted {}", tool, args);
            assert!(result.data.is_none());
            assert!(result.first_text().unwrap().contains("Invalid arguments"));
        }

        assert!(mock.calls().is_empty());
    }
}

mod mcp_protocol_tests {
    use super::*;

    fn server() -> McpServer {
        McpServer::new(Arc::new(MockShopify::with_orders(vec![order(1)])))
    }

    #[test]
    fn test_initialize() {
        let mut server = server();
        let request = make_request(
            1,
            "initialize",
            Some(json!({
                "protocolVersion": "2024-11-05",
                "clientInfo": {"name": "test-client", "version": "1.0.0"},
                "capabilities": {}
            })),
        );

        let response = tokio_test::block_on(server.handle_message(&request)).unwrap().unwrap();
        let response = parse_response(&response);
        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(response["result"]["serverInfo"]["name"], "shopify");
        assert!(response["result"]["capabilities"]["tools"].is_object());
    }

    #[test]
    fn test_initialized_notification_has_no_response() {
        let mut server = server();
        let notification = json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string();

        let response = tokio_test::block_on(server.handle_message(&notification)).unwrap();
        assert!(response.is_none());
        assert!(server.is_initialized());
    }

    #[test]
    fn test_ping() {
        let mut server = server();
        let response = tokio_test::block_on(server.handle_message(&make_request(7, "ping", None)))
            .unwrap()
            .unwrap();
        assert_eq!(parse_response(&response)["result"], json!({}));
    }

    #[test]
    fn test_list_tools() {
        let mut server = server();
        let response = tokio_test::block_on(server.handle_message(&make_request(2, "tools/list", None)))
            .unwrap()
            .unwrap();
        let response = parse_response(&response);

        let tools = response["result"]["tools"].as_array().unwrap();
        let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(
            names,
            vec![
                "get-orders",
                "create-draft-order",
                "complete-draft-order",
                "get-product-details",
                "get-product-inventory",
                "search-products",
                "create-product",
                "update-product",
                "bulk-update-products",
                "get-collections",
            ]
        );
        for tool in tools {
            assert_eq!(tool["inputSchema"]["type"], "object", "{}", tool["name"]);
            assert!(tool["description"].is_string());
        }
    }

    #[tokio::test]
    async fn test_call_tool() {
        let mut server = server();
        let request = make_request(3, "tools/call", Some(json!({"name": "get-orders", "arguments": {"first": 1}})));

        let response = server.handle_message(&request).await.unwrap().unwrap();
        let response = parse_response(&response);
        let result = &response["result"];
        assert!(result.get("isError").is_none());
        assert_eq!(result["data"]["orders"].as_array().unwrap().len(), 1);
        assert_eq!(result["content"][0]["type"], "text");
    }

    #[tokio::test]
    async fn test_call_tool_without_params() {
        let mut server = server();

        let response = server
            .handle_message(&make_request(4, "tools/call", None))
            .await
            .unwrap()
            .unwrap();
        let response = parse_response(&response);
        assert!(response.get("error").is_none());
        assert_eq!(response["result"]["isError"], true);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let mut server = server();

        let response = server
            .handle_message(&make_request(5, "resources/list", None))
            .await
            .unwrap()
            .unwrap();
        let response = parse_response(&response);
        assert_eq!(response["error"]["code"], -32601);
        assert_eq!(response["id"], 5);
    }

    #[tokio::test]
    async fn test_parse_error() {
        let mut server = server();

        let response = server.handle_message("{not json").await.unwrap().unwrap();
        let response = parse_response(&response);
        assert_eq!(response["error"]["code"], -32700);
        assert!(response["id"].is_null());
    }
}
