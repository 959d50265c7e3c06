//! Raw GraphQL response shapes and their conversion into flat entities.
//!
//! Shopify wraps every list in a `{ edges { node } pageInfo }` connection; the
//! tools only ever hand out plain vectors, so everything is unwrapped here.

use serde::{Deserialize, Serialize};

use crate::shopify::types::{
    Collection, LineItemVariant, Money, Order, OrderAddress, OrderCustomer, OrderLineItem,
    PageInfo, Product, ProductImage, ProductStatus, ProductVariant, ProductsPage,
};

/// Top-level GraphQL response
#[derive(Debug, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQLErrorResponse>,
}

/// Top-level GraphQL error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQLErrorResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

/// Validation error returned inside a mutation payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

/// Join user error messages for display
pub fn join_user_errors(errors: &[UserError]) -> String {
    errors
        .iter()
        .map(|e| match &e.field {
            Some(field) if !field.is_empty() => format!("{}: {}", field.join("."), e.message),
            _ => e.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<T>>,
    #[serde(default)]
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

impl<T> Connection<T> {
    pub fn into_nodes(self) -> Vec<T> {
        self.edges.into_iter().map(|e| e.node).collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct MoneyBag {
    #[serde(rename = "shopMoney")]
    pub shop_money: Money,
}

fn money(bag: Option<MoneyBag>) -> Option<Money> {
    bag.map(|b| b.shop_money)
}

// ==================== Products ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawImage {
    pub src: String,
    pub alt_text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub handle: Option<String>,
    pub status: Option<String>,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub variants: Connection<ProductVariant>,
    pub images: Connection<RawImage>,
}

fn product_status(raw: Option<&str>) -> Option<ProductStatus> {
    match raw? {
        "ACTIVE" => Some(ProductStatus::Active),
        "ARCHIVED" => Some(ProductStatus::Archived),
        "DRAFT" => Some(ProductStatus::Draft),
        _ => None,
    }
}

/// Empty strings from Shopify mean "not set"
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub fn convert_product(raw: RawProduct) -> Product {
    Product {
        status: product_status(raw.status.as_deref()),
        id: raw.id,
        title: raw.title,
        description: raw.description,
        handle: raw.handle,
        vendor: non_empty(raw.vendor),
        product_type: non_empty(raw.product_type),
        tags: raw.tags,
        variants: raw.variants.into_nodes(),
        images: raw
            .images
            .into_nodes()
            .into_iter()
            .map(|img| ProductImage {
                src: img.src,
                alt: non_empty(img.alt_text),
            })
            .collect(),
    }
}

pub fn convert_product_connection(connection: Connection<RawProduct>) -> ProductsPage {
    let page_info = connection.page_info.clone();
    ProductsPage {
        products: connection.into_nodes().into_iter().map(convert_product).collect(),
        page_info,
    }
}

// ==================== Orders ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLineItem {
    pub id: String,
    pub title: String,
    pub quantity: i64,
    pub original_total_set: Option<MoneyBag>,
    pub variant: Option<LineItemVariant>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrder {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub display_financial_status: Option<String>,
    pub display_fulfillment_status: Option<String>,
    pub email: Option<String>,
    pub note: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub total_price_set: Option<MoneyBag>,
    pub subtotal_price_set: Option<MoneyBag>,
    pub total_shipping_price_set: Option<MoneyBag>,
    pub total_tax_set: Option<MoneyBag>,
    pub customer: Option<OrderCustomer>,
    pub shipping_address: Option<OrderAddress>,
    pub line_items: Connection<RawLineItem>,
}

pub fn convert_order(raw: RawOrder) -> Order {
    Order {
        id: raw.id,
        name: raw.name,
        created_at: raw.created_at,
        financial_status: raw.display_financial_status,
        fulfillment_status: raw.display_fulfillment_status,
        email: raw.email,
        total_price: money(raw.total_price_set),
        subtotal_price: money(raw.subtotal_price_set),
        total_shipping_price: money(raw.total_shipping_price_set),
        total_tax: money(raw.total_tax_set),
        customer: raw.customer,
        shipping_address: raw.shipping_address,
        line_items: raw
            .line_items
            .into_nodes()
            .into_iter()
            .map(|li| OrderLineItem {
                id: li.id,
                title: li.title,
                quantity: li.quantity,
                original_total: money(li.original_total_set),
                variant: li.variant,
            })
            .collect(),
        tags: raw.tags,
        note: raw.note,
    }
}

// ==================== Collections ====================

#[derive(Debug, Deserialize)]
pub struct Count {
    pub count: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCollection {
    pub id: String,
    pub title: String,
    pub handle: String,
    #[serde(default)]
    pub description: String,
    pub updated_at: Option<String>,
    pub products_count: Option<Count>,
}

pub fn convert_collection(raw: RawCollection) -> Collection {
    Collection {
        id: raw.id,
        title: raw.title,
        handle: raw.handle,
        description: raw.description,
        products_count: raw.products_count.map(|c| c.count),
        updated_at: raw.updated_at,
    }
}

// ==================== Draft Orders ====================

#[derive(Debug, Deserialize)]
pub struct IdOnly {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct DraftLine {
    pub variant: Option<IdOnly>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDraftOrder {
    pub id: String,
    pub name: String,
    pub status: Option<String>,
    pub line_items: Connection<DraftLine>,
}

impl RawDraftOrder {
    pub fn has_variant(&self, variant_id: &str) -> bool {
        self.line_items
            .edges
            .iter()
            .filter_map(|e| e.node.variant.as_ref())
            .any(|v| v.id == variant_id)
    }
}
