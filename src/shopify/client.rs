//! Shopify Admin API client
//!
//! GraphQL over `reqwest`. One client (and one connection pool) serves every
//! tool call; it holds no per-call state.

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::instrument;

use crate::config::shopify::{
    ACCESS_TOKEN_HEADER, IMAGES_PER_PRODUCT, LINE_ITEMS_PER_ORDER, MAX_PAGE_SIZE,
    VARIANTS_PER_PRODUCT,
};
use crate::config::Config;
use crate::error::{codes, DomainError, Result, ShopifyApiError, ShopifyMcpError};
use crate::shopify::graphql::{
    convert_collection, convert_order, convert_product, convert_product_connection,
    join_user_errors, Connection, GraphQLErrorResponse, GraphQLResponse, IdOnly, RawCollection,
    RawDraftOrder, RawOrder, RawProduct, UserError,
};
use crate::shopify::port::ShopifyClientPort;
use crate::shopify::products::{price_range_query, title_query};
use crate::shopify::queries;
use crate::shopify::types::*;

/// Shopify Admin API client
pub struct ShopifyClient {
    /// HTTP client
    http_client: reqwest::Client,

    /// `https://{shop}/admin/api/{version}/graphql.json`
    endpoint: String,

    /// Admin API access token
    access_token: SecretString,
}

// ==================== Response payloads ====================

#[derive(Deserialize)]
struct ProductsData {
    products: Connection<RawProduct>,
}

#[derive(Deserialize)]
struct ProductData {
    product: Option<RawProduct>,
}

#[derive(Deserialize)]
struct CollectionProductsData {
    collection: Option<CollectionProducts>,
}

#[derive(Deserialize)]
struct CollectionProducts {
    products: Connection<RawProduct>,
}

#[derive(Deserialize)]
struct VariantData {
    #[serde(rename = "productVariant")]
    product_variant: Option<ProductVariant>,
}

#[derive(Deserialize)]
struct LocationData {
    location: Option<IdOnly>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductPayload {
    product: Option<RawProduct>,
    #[serde(default)]
    user_errors: Vec<UserError>,
}

#[derive(Deserialize)]
struct ProductCreateData {
    #[serde(rename = "productCreate")]
    payload: Option<ProductPayload>,
}

#[derive(Deserialize)]
struct VariantsBulkCreateData {
    #[serde(rename = "productVariantsBulkCreate")]
    payload: Option<ProductPayload>,
}

#[derive(Deserialize)]
struct ProductUpdateData {
    #[serde(rename = "productUpdate")]
    payload: Option<ProductPayload>,
}

#[derive(Deserialize)]
struct OrdersData {
    orders: Connection<RawOrder>,
}

#[derive(Deserialize)]
struct DraftOrderRef {
    id: String,
    name: String,
    #[serde(default)]
    order: Option<IdOnly>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DraftOrderPayload {
    draft_order: Option<DraftOrderRef>,
    #[serde(default)]
    user_errors: Vec<UserError>,
}

#[derive(Deserialize)]
struct DraftOrderCreateData {
    #[serde(rename = "draftOrderCreate")]
    payload: Option<DraftOrderPayload>,
}

#[derive(Deserialize)]
struct DraftOrderCompleteData {
    #[serde(rename = "draftOrderComplete")]
    payload: Option<DraftOrderPayload>,
}

#[derive(Deserialize)]
struct DraftOrderData {
    #[serde(rename = "draftOrder")]
    draft_order: Option<RawDraftOrder>,
}

#[derive(Deserialize)]
struct CollectionsData {
    collections: Connection<RawCollection>,
}

impl ShopifyClient {
    /// Create a new Shopify client
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("shopify-mcp-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            endpoint: config.graphql_endpoint(),
            access_token: config.access_token.clone(),
        })
    }

    /// Execute a GraphQL document and decode its `data`
    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: Value,
    ) -> Result<T> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .header(ACCESS_TOKEN_HEADER, self.access_token.expose_secret())
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<f64>().ok())
                .map(|secs| secs.ceil() as u64)
                .unwrap_or(2);
            tracing::warn!(operation, retry_after_secs, "Shopify rate limit hit");
            return Err(DomainError::new(
                codes::RATE_LIMITED,
                format!("Rate limited by Shopify, retry after {} seconds", retry_after_secs),
            )
            .with_context(json!({ "retryAfterSecs": retry_after_secs }))
            .into());
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(DomainError::new(
                codes::UNAUTHORIZED,
                "Invalid or expired Shopify access token",
            )
            .with_context(json!({ "status": status.as_u16() }))
            .into());
        }

        if !status.is_success() {
            tracing::warn!(operation, status = status.as_u16(), "Shopify request failed");
            let failure = DomainError::new(
                codes::HTTP_ERROR,
                format!("{} failed ({})", operation, status),
            );
            return Err(match response.text().await {
                Ok(text) => failure.with_context(json!({ "status": status.as_u16(), "body": text })),
                Err(e) => failure
                    .with_context(json!({ "status": status.as_u16() }))
                    .with_inner(format!("reading response body: {}", e)),
            }
            .into());
        }

        let body: GraphQLResponse<T> = response.json().await?;

        if !body.errors.is_empty() {
            return Err(graphql_failure(operation, &body.errors).into());
        }

        body.data.ok_or_else(|| {
            ShopifyApiError::MissingData {
                operation: operation.to_string(),
            }
            .into()
        })
    }

    /// Primary location, where new inventory is stocked
    async fn primary_location_id(&self) -> Result<String> {
        let data: LocationData = self
            .execute("PrimaryLocation", queries::PRIMARY_LOCATION, json!({}))
            .await?;
        data.location
            .map(|l| l.id)
            .ok_or_else(|| ShopifyApiError::NoLocation.into())
    }

    /// One page of a draft order's line items, starting after `after`
    async fn load_draft_order(
        &self,
        draft_order_id: &str,
        after: Option<&str>,
    ) -> Result<RawDraftOrder> {
        let data: DraftOrderData = self
            .execute(
                "LoadDraftOrder",
                queries::LOAD_DRAFT_ORDER,
                json!({ "id": draft_order_id, "after": after }),
            )
            .await?;
        data.draft_order.ok_or_else(|| {
            DomainError::new(
                codes::DRAFT_ORDER_NOT_FOUND,
                format!("Draft order not found: {}", draft_order_id),
            )
            .with_context(json!({ "draftOrderId": draft_order_id }))
            .into()
        })
    }

    /// Walk the draft order's line items until `variant_id` turns up
    async fn draft_order_with_variant(
        &self,
        draft_order_id: &str,
        variant_id: &str,
    ) -> Result<(RawDraftOrder, bool)> {
        let mut draft_order = self.load_draft_order(draft_order_id, None).await?;
        loop {
            if draft_order.has_variant(variant_id) {
                return Ok((draft_order, true));
            }
            let page_info = &draft_order.line_items.page_info;
            let next = page_info.end_cursor.clone().filter(|_| page_info.has_next_page);
            let Some(after) = next else {
                return Ok((draft_order, false));
            };
            draft_order = self.load_draft_order(draft_order_id, Some(&after)).await?;
        }
    }

    /// Attach variants to a freshly created product
    async fn create_variants(
        &self,
        product_id: &str,
        variants: &[NewVariant],
        location_id: &str,
    ) -> Result<Option<RawProduct>> {
        let variables = with_product_counts(json!({
            "productId": product_id,
            "variants": variants
                .iter()
                .map(|v| variant_input(v, location_id))
                .collect::<Vec<_>>(),
        }));

        let data: VariantsBulkCreateData = self
            .execute(
                "ProductVariantsBulkCreate",
                &queries::product_variants_bulk_create(),
                variables,
            )
            .await?;
        let payload = require_payload(data.payload, "ProductVariantsBulkCreate")?;
        check_user_errors(
            codes::PRODUCT_VARIANTS_CREATE_FAILED,
            "create product variants",
            &payload.user_errors,
        )?;
        Ok(payload.product)
    }
}

/// The product exists remotely but has no variants; callers need its id to clean up
fn variants_not_created(product_id: &str, cause: ShopifyMcpError) -> DomainError {
    let mut context = json!({ "productId": product_id });
    if let Some(domain) = cause.as_domain() {
        context["causeCode"] = json!(domain.code);
        if let Some(cause_context) = &domain.context_data {
            context["causeContext"] = cause_context.clone();
        }
    }
    DomainError::new(
        codes::PRODUCT_VARIANTS_CREATE_FAILED,
        format!(
            "Product {} was created but its variants were not: {}",
            product_id, cause
        ),
    )
    .with_context(context)
    .with_inner(cause)
}

/// Map top-level GraphQL errors into a domain error
fn graphql_failure(operation: &str, errors: &[GraphQLErrorResponse]) -> DomainError {
    let throttled = errors.iter().any(|e| {
        e.extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .and_then(Value::as_str)
            == Some("THROTTLED")
    });
    let code = if throttled {
        codes::RATE_LIMITED
    } else {
        codes::GRAPHQL_ERROR
    };
    let message = errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");

    tracing::warn!(operation, code, %message, "GraphQL errors");

    DomainError::new(code, format!("{} failed: {}", operation, message))
        .with_context(json!({ "errors": errors }))
}

/// Fail with `code` when a mutation reported user errors
fn check_user_errors(code: &str, what: &str, errors: &[UserError]) -> Result<()> {
    if errors.is_empty() {
        return Ok(());
    }
    Err(DomainError::new(
        code,
        format!("Failed to {}: {}", what, join_user_errors(errors)),
    )
    .with_context(json!({ "userErrors": errors }))
    .into())
}

/// The mutation payload, or a missing-data error
fn require_payload<T>(payload: Option<T>, operation: &str) -> Result<T> {
    payload.ok_or_else(|| {
        ShopifyApiError::MissingData {
            operation: operation.to_string(),
        }
        .into()
    })
}

fn product_counts() -> Value {
    json!({
        "variantCount": VARIANTS_PER_PRODUCT,
        "imageCount": IMAGES_PER_PRODUCT,
    })
}

fn with_product_counts(mut variables: Value) -> Value {
    if let (Some(target), Value::Object(counts)) = (variables.as_object_mut(), product_counts()) {
        target.extend(counts);
    }
    variables
}

/// `MailingAddressInput` for Shopify (country/province names are derived from codes remotely)
fn mailing_address_input(address: &MailingAddress) -> Value {
    let mut input = Map::new();
    input.insert("address1".into(), json!(address.address1));
    input.insert("countryCode".into(), json!(address.country_code));
    input.insert("firstName".into(), json!(address.first_name));
    input.insert("lastName".into(), json!(address.last_name));
    input.insert("zip".into(), json!(address.zip));
    input.insert("city".into(), json!(address.city));
    if let Some(address2) = &address.address2 {
        input.insert("address2".into(), json!(address2));
    }
    if let Some(province_code) = &address.province_code {
        input.insert("provinceCode".into(), json!(province_code));
    }
    if let Some(phone) = &address.phone {
        input.insert("phone".into(), json!(phone));
    }
    Value::Object(input)
}

fn product_update_input(product_id: &str, update: &ProductUpdate) -> Value {
    let mut input = Map::new();
    input.insert("id".into(), json!(product_id));
    if let Some(title) = &update.title {
        input.insert("title".into(), json!(title));
    }
    if let Some(description) = &update.description {
        input.insert("descriptionHtml".into(), json!(description));
    }
    if let Some(status) = update.status {
        input.insert("status".into(), json!(status));
    }
    if let Some(vendor) = &update.vendor {
        input.insert("vendor".into(), json!(vendor));
    }
    if let Some(product_type) = &update.product_type {
        input.insert("productType".into(), json!(product_type));
    }
    if let Some(tags) = &update.tags {
        input.insert("tags".into(), json!(tags));
    }
    Value::Object(input)
}

fn variant_input(variant: &NewVariant, location_id: &str) -> Value {
    let mut inventory_item = Map::new();
    inventory_item.insert("tracked".into(), json!(true));
    if let Some(sku) = &variant.sku {
        inventory_item.insert("sku".into(), json!(sku));
    }
    if let Some(requires_shipping) = variant.requires_shipping {
        inventory_item.insert("requiresShipping".into(), json!(requires_shipping));
    }

    let mut input = Map::new();
    input.insert("price".into(), json!(format!("{:.2}", variant.price)));
    input.insert(
        "optionValues".into(),
        json!([{ "optionName": "Title", "name": variant.title }]),
    );
    input.insert("inventoryItem".into(), Value::Object(inventory_item));
    input.insert(
        "inventoryQuantities".into(),
        json!([{ "availableQuantity": variant.inventory, "locationId": location_id }]),
    );
    if let Some(taxable) = variant.taxable {
        input.insert("taxable".into(), json!(taxable));
    }
    Value::Object(input)
}

#[async_trait]
impl ShopifyClientPort for ShopifyClient {
    #[instrument(skip(self))]
    async fn load_orders(&self, query: OrderQuery) -> Result<OrdersPage> {
        let variables = json!({
            "first": query.first.clamp(1, MAX_PAGE_SIZE),
            "after": query.after,
            "query": query.query,
            "sortKey": query.sort_key,
            "reverse": query.reverse,
            "lineItemCount": LINE_ITEMS_PER_ORDER,
        });

        let data: OrdersData = self
            .execute("LoadOrders", queries::LOAD_ORDERS, variables)
            .await?;

        let page_info = data.orders.page_info.clone();
        Ok(OrdersPage {
            orders: data.orders.into_nodes().into_iter().map(convert_order).collect(),
            page_info,
        })
    }

    #[instrument(skip(self, input))]
    async fn create_draft_order(
        &self,
        input: DraftOrderInput,
        idempotency_key: &str,
    ) -> Result<DraftOrderCreated> {
        let variables = json!({
            "input": {
                "lineItems": input.line_items.iter().map(|li| json!({
                    "variantId": li.variant_id,
                    "quantity": li.quantity,
                })).collect::<Vec<_>>(),
                "email": input.email,
                "shippingAddress": mailing_address_input(&input.shipping_address),
                "billingAddress": mailing_address_input(&input.billing_address),
                "tags": input.tags,
                "note": input.note,
            },
            "idempotencyKey": idempotency_key,
        });

        let data: DraftOrderCreateData = self
            .execute("DraftOrderCreate", queries::DRAFT_ORDER_CREATE, variables)
            .await?;
        let payload = require_payload(data.payload, "DraftOrderCreate")?;
        check_user_errors(
            codes::DRAFT_ORDER_CREATE_FAILED,
            "create draft order",
            &payload.user_errors,
        )?;

        let draft_order = payload.draft_order.ok_or_else(|| ShopifyApiError::MissingData {
            operation: "DraftOrderCreate".to_string(),
        })?;

        tracing::info!(draft_order_id = %draft_order.id, "draft order created");

        Ok(DraftOrderCreated {
            draft_order_id: draft_order.id,
            draft_order_name: draft_order.name,
        })
    }

    #[instrument(skip(self))]
    async fn complete_draft_order(
        &self,
        draft_order_id: &str,
        variant_id: &str,
    ) -> Result<DraftOrderCompleted> {
        let (draft_order, has_variant) = self
            .draft_order_with_variant(draft_order_id, variant_id)
            .await?;

        if !has_variant {
            return Err(DomainError::new(
                codes::DRAFT_ORDER_VARIANT_MISMATCH,
                format!(
                    "Draft order {} has no line item for variant {}",
                    draft_order_id, variant_id
                ),
            )
            .with_context(json!({
                "draftOrderId": draft_order_id,
                "variantId": variant_id,
                "status": draft_order.status,
            }))
            .into());
        }

        let data: DraftOrderCompleteData = self
            .execute(
                "DraftOrderComplete",
                queries::DRAFT_ORDER_COMPLETE,
                json!({ "id": draft_order_id }),
            )
            .await?;
        let payload = require_payload(data.payload, "DraftOrderComplete")?;
        check_user_errors(
            codes::DRAFT_ORDER_COMPLETE_FAILED,
            "complete draft order",
            &payload.user_errors,
        )?;

        let completed = payload.draft_order.ok_or_else(|| ShopifyApiError::MissingData {
            operation: "DraftOrderComplete".to_string(),
        })?;

        Ok(DraftOrderCompleted {
            draft_order_id: completed.id,
            draft_order_name: completed.name,
            order_id: completed.order.map(|o| o.id),
        })
    }

    #[instrument(skip(self))]
    async fn load_products(&self, search_title: Option<&str>, limit: i64) -> Result<ProductsPage> {
        let variables = with_product_counts(json!({
            "first": limit.clamp(1, MAX_PAGE_SIZE),
            "query": search_title.map(title_query),
        }));

        let data: ProductsData = self
            .execute("LoadProducts", &queries::load_products(), variables)
            .await?;
        Ok(convert_product_connection(data.products))
    }

    #[instrument(skip(self))]
    async fn load_product(&self, product_id: &str) -> Result<Option<Product>> {
        let variables = with_product_counts(json!({ "id": product_id }));
        let data: ProductData = self
            .execute("LoadProduct", &queries::load_product(), variables)
            .await?;
        Ok(data.product.map(convert_product))
    }

    #[instrument(skip(self))]
    async fn load_variant(&self, variant_id: &str) -> Result<Option<ProductVariant>> {
        let data: VariantData = self
            .execute(
                "LoadVariant",
                queries::LOAD_VARIANT,
                json!({ "id": variant_id }),
            )
            .await?;
        Ok(data.product_variant)
    }

    #[instrument(skip(self))]
    async fn search_products_by_price_range(
        &self,
        min_price: f64,
        max_price: f64,
    ) -> Result<ProductsPage> {
        let variables = with_product_counts(json!({
            "first": crate::config::shopify::DEFAULT_PRODUCTS_PAGE,
            "query": price_range_query(min_price, max_price),
        }));

        let data: ProductsData = self
            .execute("SearchProductsByPrice", &queries::load_products(), variables)
            .await?;
        Ok(convert_product_connection(data.products))
    }

    #[instrument(skip(self))]
    async fn load_products_by_collection_id(&self, collection_id: &str) -> Result<ProductsPage> {
        let variables = with_product_counts(json!({
            "id": collection_id,
            "first": crate::config::shopify::DEFAULT_PRODUCTS_PAGE,
        }));

        let data: CollectionProductsData = self
            .execute(
                "LoadProductsByCollection",
                &queries::load_products_by_collection(),
                variables,
            )
            .await?;

        let collection = data.collection.ok_or_else(|| ShopifyApiError::CollectionNotFound {
            collection_id: collection_id.to_string(),
        })?;
        Ok(convert_product_connection(collection.products))
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    async fn create_product(&self, input: CreateProductInput) -> Result<Product> {
        let mut product = Map::new();
        product.insert("title".into(), json!(input.title));
        product.insert("descriptionHtml".into(), json!(input.description));
        if let Some(vendor) = &input.vendor {
            product.insert("vendor".into(), json!(vendor));
        }
        if let Some(product_type) = &input.product_type {
            product.insert("productType".into(), json!(product_type));
        }
        if let Some(tags) = &input.tags {
            product.insert("tags".into(), json!(tags));
        }
        product.insert(
            "productOptions".into(),
            json!([{
                "name": "Title",
                "values": input.variants.iter().map(|v| json!({ "name": v.title })).collect::<Vec<_>>(),
            }]),
        );

        // Before creating anything, so a store without a location leaves nothing behind
        let location_id = self.primary_location_id().await?;

        let data: ProductCreateData = self
            .execute(
                "ProductCreate",
                &queries::product_create(),
                with_product_counts(json!({ "product": product })),
            )
            .await?;
        let created = require_payload(data.payload, "ProductCreate")?;
        check_user_errors(codes::PRODUCT_CREATE_FAILED, "create product", &created.user_errors)?;
        let created = created.product.ok_or_else(|| ShopifyApiError::MissingData {
            operation: "ProductCreate".to_string(),
        })?;

        tracing::info!(product_id = %created.id, "product created");

        let with_variants = self
            .create_variants(&created.id, &input.variants, &location_id)
            .await;
        match with_variants {
            Ok(with_variants) => Ok(convert_product(with_variants.unwrap_or(created))),
            Err(e) => {
                tracing::warn!(product_id = %created.id, error = %e, "product left without variants");
                Err(variants_not_created(&created.id, e).into())
            }
        }
    }

    #[instrument(skip(self, update))]
    async fn update_product(&self, product_id: &str, update: ProductUpdate) -> Result<Product> {
        let variables = with_product_counts(json!({
            "product": product_update_input(product_id, &update),
        }));

        let data: ProductUpdateData = self
            .execute("ProductUpdate", &queries::product_update(), variables)
            .await?;
        let updated = require_payload(data.payload, "ProductUpdate")?;
        check_user_errors(codes::PRODUCT_UPDATE_FAILED, "update product", &updated.user_errors)?;

        updated
            .product
            .map(convert_product)
            .ok_or_else(|| {
                ShopifyApiError::ProductNotFound {
                    product_id: product_id.to_string(),
                }
                .into()
            })
    }

    #[instrument(skip(self))]
    async fn load_collections(&self, query: CollectionQuery) -> Result<CollectionsPage> {
        let variables = json!({
            "first": query.limit.clamp(1, MAX_PAGE_SIZE),
            "query": query.query,
        });

        let data: CollectionsData = self
            .execute("LoadCollections", queries::LOAD_COLLECTIONS, variables)
            .await?;

        let page_info = data.collections.page_info.clone();
        Ok(CollectionsPage {
            collections: data
                .collections
                .into_nodes()
                .into_iter()
                .map(convert_collection)
                .collect(),
            page_info,
        })
    }
}
