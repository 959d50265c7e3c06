//! Product tools

use std::sync::Arc;

use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

use super::{require_non_empty, ToolHandler};
use crate::error::Result;
use crate::shopify::port::ShopifyClientPort;
use crate::shopify::products::{
    get_product_full_details, get_product_inventory_status, search_products_by_attributes,
    InventoryStatus, PriceRange, ProductFullDetails, ProductSummary, SearchAttributes,
};
use crate::shopify::types::{
    BulkUpdateOutcome, CreateProductInput, NewVariant, Product, ProductUpdateItem,
};

/// Arguments of `get-product-details`
#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GetProductDetailsArgs {
    /// ID of the product
    #[validate(length(min = 1))]
    pub product_id: String,
}

/// Arguments of `get-product-inventory`
#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GetProductInventoryArgs {
    /// ID of the product variant
    #[validate(length(min = 1))]
    pub variant_id: String,
}

/// Arguments of `search-products`
#[derive(Debug, Clone, Default, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchProductsArgs {
    /// Product title to search for
    #[serde(default)]
    pub title: Option<String>,

    /// Price range to filter by
    #[serde(default)]
    #[validate]
    pub price_range: Option<PriceRange>,

    /// Collection ID to filter by
    #[serde(default)]
    pub collection: Option<String>,
}

/// Arguments of `create-product`
#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "has_variants"))]
pub struct CreateProductArgs {
    /// Product title
    #[validate(length(min = 1))]
    pub title: String,

    /// Product description
    pub description: String,

    /// Product vendor
    #[serde(default)]
    pub vendor: Option<String>,

    /// Product type
    #[serde(default)]
    pub product_type: Option<String>,

    /// Product tags
    #[serde(default)]
    pub tags: Option<Vec<String>>,

    /// Product variants
    #[validate]
    pub variants: Vec<NewVariant>,
}

fn has_variants(args: &CreateProductArgs) -> std::result::Result<(), validator::ValidationError> {
    require_non_empty(&args.variants, "variants")
}

/// Arguments of `bulk-update-products`
#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "has_updates"))]
pub struct BulkUpdateProductsArgs {
    /// Array of product updates
    #[validate]
    pub updates: Vec<ProductUpdateItem>,
}

fn has_updates(args: &BulkUpdateProductsArgs) -> std::result::Result<(), validator::ValidationError> {
    require_non_empty(&args.updates, "updates")
}

pub(super) fn register(handler: &mut ToolHandler) {
    handler.register(
        "get-product-details",
        "Get full details of a product including variants and images",
        |args: &GetProductDetailsArgs| format!("Failed to retrieve product {}", args.product_id),
        get_product_details,
    );

    handler.register(
        "get-product-inventory",
        "Get inventory status of a product variant",
        |args: &GetProductInventoryArgs| {
            format!("Failed to get inventory status for variant {}", args.variant_id)
        },
        get_product_inventory,
    );

    handler.register(
        "search-products",
        "Search products by various attributes",
        |_: &SearchProductsArgs| "Failed to search products".to_string(),
        search_products,
    );

    handler.register(
        "create-product",
        "Create a new product",
        |_: &CreateProductArgs| "Failed to create product".to_string(),
        create_product,
    );

    handler.register(
        "update-product",
        "Update an existing product",
        |args: &ProductUpdateItem| format!("Failed to update product {}", args.product_id),
        update_product,
    );

    handler.register(
        "bulk-update-products",
        "Update multiple products at once",
        |_: &BulkUpdateProductsArgs| "Failed to bulk update products".to_string(),
        bulk_update_products,
    );
}

async fn get_product_details(
    client: Arc<dyn ShopifyClientPort>,
    args: GetProductDetailsArgs,
) -> Result<ProductFullDetails> {
    get_product_full_details(client.as_ref(), &args.product_id).await
}

async fn get_product_inventory(
    client: Arc<dyn ShopifyClientPort>,
    args: GetProductInventoryArgs,
) -> Result<InventoryStatus> {
    get_product_inventory_status(client.as_ref(), &args.variant_id).await
}

async fn search_products(
    client: Arc<dyn ShopifyClientPort>,
    args: SearchProductsArgs,
) -> Result<Vec<ProductSummary>> {
    let attributes = SearchAttributes {
        title: args.title,
        price_range: args.price_range,
        collection: args.collection,
    };
    search_products_by_attributes(client.as_ref(), attributes).await
}

async fn create_product(client: Arc<dyn ShopifyClientPort>, args: CreateProductArgs) -> Result<Product> {
    client
        .create_product(CreateProductInput {
            title: args.title,
            description: args.description,
            vendor: args.vendor,
            product_type: args.product_type,
            tags: args.tags,
            variants: args.variants,
        })
        .await
}

async fn update_product(client: Arc<dyn ShopifyClientPort>, args: ProductUpdateItem) -> Result<Product> {
    client.update_product(&args.product_id, args.update).await
}

async fn bulk_update_products(
    client: Arc<dyn ShopifyClientPort>,
    args: BulkUpdateProductsArgs,
) -> Result<Vec<BulkUpdateOutcome>> {
    client.bulk_update_products(args.updates).await
}
