//! Shopify entity and input types
//!
//! Entities are what the tools hand back to the caller (already flattened out
//! of GraphQL connections). Inputs double as tool argument schemas, so they
//! derive `JsonSchema` and `Validate` next to serde.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

// ==================== Shared ====================

/// Pagination metadata for a connection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Whether another page follows
    pub has_next_page: bool,

    /// Cursor to pass as `after` for the next page
    #[serde(default)]
    pub end_cursor: Option<String>,
}

/// A money amount in shop currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub amount: String,
    pub currency_code: String,
}

// ==================== Orders ====================

/// Sort keys accepted by the orders connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSortKey {
    ProcessedAt,
    TotalPrice,
    Id,
    CreatedAt,
    UpdatedAt,
    OrderNumber,
}

/// Filters for a page of orders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderQuery {
    pub first: i64,
    pub after: Option<String>,
    pub query: Option<String>,
    pub sort_key: Option<OrderSortKey>,
    pub reverse: Option<bool>,
}

/// Customer attached to an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCustomer {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Postal address as reported on an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAddress {
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
}

/// Variant referenced by an order line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemVariant {
    pub id: String,
    pub title: String,
    pub sku: Option<String>,
}

/// One line of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub id: String,
    pub title: String,
    pub quantity: i64,
    pub original_total: Option<Money>,
    pub variant: Option<LineItemVariant>,
}

/// An order, flattened for tool output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub financial_status: Option<String>,
    pub fulfillment_status: Option<String>,
    pub email: Option<String>,
    pub total_price: Option<Money>,
    pub subtotal_price: Option<Money>,
    pub total_shipping_price: Option<Money>,
    pub total_tax: Option<Money>,
    pub customer: Option<OrderCustomer>,
    pub shipping_address: Option<OrderAddress>,
    pub line_items: Vec<OrderLineItem>,
    pub tags: Vec<String>,
    pub note: Option<String>,
}

/// A page of orders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersPage {
    pub orders: Vec<Order>,
    pub page_info: PageInfo,
}

// ==================== Draft Orders ====================

/// A variant and quantity to put on a draft order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DraftLineItem {
    /// ID of the variant
    #[validate(length(min = 1))]
    pub variant_id: String,

    /// Quantity of the variant
    #[validate(range(min = 1))]
    pub quantity: i64,
}

/// Shipping (and billing) address for a draft order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MailingAddress {
    /// Address line 1
    #[validate(length(min = 1))]
    pub address1: String,

    /// Address line 2
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,

    /// Country code (e.g., US, CA)
    #[validate(length(equal = 2))]
    pub country_code: String,

    /// First name
    pub first_name: String,

    /// Last name
    pub last_name: String,

    /// ZIP/Postal code
    pub zip: String,

    /// City
    #[validate(length(min = 1))]
    pub city: String,

    /// Country name
    pub country: String,

    /// Province/State name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,

    /// Province/State code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province_code: Option<String>,

    /// Phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Everything needed to create a draft order
#[derive(Debug, Clone, PartialEq)]
pub struct DraftOrderInput {
    pub line_items: Vec<DraftLineItem>,
    pub email: String,
    pub shipping_address: MailingAddress,
    pub billing_address: MailingAddress,
    pub tags: Vec<String>,
    pub note: String,
}

/// Identity of a freshly created draft order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftOrderCreated {
    pub draft_order_id: String,
    pub draft_order_name: String,
}

/// A completed draft order and the order it turned into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftOrderCompleted {
    pub draft_order_id: String,
    pub draft_order_name: String,
    pub order_id: Option<String>,
}

// ==================== Products ====================

/// What happens when a variant runs out of stock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InventoryPolicy {
    /// Keep selling
    Continue,
    /// Stop selling
    Deny,
}

/// Lifecycle status of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    Active,
    Archived,
    Draft,
}

/// A sellable variant of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: String,
    pub title: String,
    pub price: String,
    pub sku: Option<String>,
    pub available_for_sale: bool,
    pub inventory_policy: InventoryPolicy,
    pub inventory_quantity: Option<i64>,
}

/// A product image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub src: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// A product with its variants and images
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    pub description: String,
    pub handle: Option<String>,
    pub status: Option<ProductStatus>,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    pub tags: Vec<String>,
    pub variants: Vec<ProductVariant>,
    pub images: Vec<ProductImage>,
}

/// A page of products
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsPage {
    pub products: Vec<Product>,
    pub page_info: PageInfo,
}

/// A variant to create alongside a new product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewVariant {
    /// Variant title
    #[validate(length(min = 1))]
    pub title: String,

    /// Variant price
    #[validate(range(min = 0.0))]
    pub price: f64,

    /// Variant SKU
    #[serde(default)]
    pub sku: Option<String>,

    /// Initial inventory quantity
    pub inventory: i64,

    /// Whether shipping is required
    #[serde(default)]
    pub requires_shipping: Option<bool>,

    /// Whether the variant is taxable
    #[serde(default)]
    pub taxable: Option<bool>,
}

/// Everything needed to create a product
#[derive(Debug, Clone, PartialEq)]
pub struct CreateProductInput {
    pub title: String,
    pub description: String,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    pub tags: Option<Vec<String>>,
    pub variants: Vec<NewVariant>,
}

/// Fields to change on a product; `None` leaves the field alone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    /// New product title
    #[serde(default)]
    #[validate(length(min = 1))]
    pub title: Option<String>,

    /// New product description
    #[serde(default)]
    pub description: Option<String>,

    /// Product status
    #[serde(default)]
    pub status: Option<ProductStatus>,

    /// New vendor name
    #[serde(default)]
    pub vendor: Option<String>,

    /// New product type
    #[serde(default)]
    pub product_type: Option<String>,

    /// New product tags
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// One entry of a bulk product update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdateItem {
    /// ID of the product to update
    #[validate(length(min = 1))]
    pub product_id: String,

    #[serde(flatten)]
    #[validate]
    pub update: ProductUpdate,
}

/// Per-product result of a bulk update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUpdateOutcome {
    pub id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ==================== Collections ====================

/// Filters for a page of collections
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionQuery {
    pub limit: i64,
    pub query: Option<String>,
}

/// A product collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub description: String,
    pub products_count: Option<i64>,
    pub updated_at: Option<String>,
}

/// A page of collections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionsPage {
    pub collections: Vec<Collection>,
    pub page_info: PageInfo,
}
