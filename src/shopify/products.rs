//! Product lookups and search built on top of the client port.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Result, ShopifyApiError};
use crate::shopify::port::ShopifyClientPort;
use crate::shopify::types::{InventoryPolicy, Product, ProductImage, ProductVariant, ProductsPage};

/// Inclusive price bounds for a product search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
#[validate(schema(function = "validate_price_range"))]
pub struct PriceRange {
    /// Minimum price
    #[validate(range(min = 0.0))]
    pub min: f64,

    /// Maximum price
    #[validate(range(min = 0.0))]
    pub max: f64,
}

fn validate_price_range(range: &PriceRange) -> std::result::Result<(), validator::ValidationError> {
    if range.min > range.max {
        let mut err = validator::ValidationError::new("price_range");
        err.message = Some("min must not exceed max".into());
        return Err(err);
    }
    Ok(())
}

/// Attributes a product search can filter on
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchAttributes {
    pub title: Option<String>,
    pub price_range: Option<PriceRange>,
    pub collection: Option<String>,
}

/// One product in a search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: String,
    pub title: String,
    pub price: String,
    pub available_for_sale: bool,
}

/// Availability of a variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStatus {
    pub is_available: bool,
    pub inventory_policy: InventoryPolicy,
}

/// The product part of a details lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub id: String,
    pub title: String,
    pub description: String,
    pub variants: Vec<ProductVariant>,
    pub images: Vec<ProductImage>,
}

/// Result of a details lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFullDetails {
    pub product: ProductDetails,
}

/// Shopify search query matching titles containing `title`
pub fn title_query(title: &str) -> String {
    let title = title.trim();
    if title.contains(char::is_whitespace) {
        format!("title:\"{}\"", title.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        format!("title:*{}*", title)
    }
}

/// Shopify search query matching variant prices within `[min, max]`
pub fn price_range_query(min: f64, max: f64) -> String {
    format!("variants.price:>={} variants.price:<={}", min, max)
}

/// Load a product with its variants and images
pub async fn get_product_full_details(
    client: &dyn ShopifyClientPort,
    product_id: &str,
) -> Result<ProductFullDetails> {
    let product = client
        .load_product(product_id)
        .await?
        .ok_or_else(|| ShopifyApiError::ProductNotFound {
            product_id: product_id.to_string(),
        })?;

    Ok(ProductFullDetails {
        product: ProductDetails {
            id: product.id,
            title: product.title,
            description: product.description,
            variants: product.variants,
            images: product.images,
        },
    })
}

/// Availability and out-of-stock policy of a variant
pub async fn get_product_inventory_status(
    client: &dyn ShopifyClientPort,
    variant_id: &str,
) -> Result<InventoryStatus> {
    let variant = client
        .load_variant(variant_id)
        .await?
        .ok_or_else(|| ShopifyApiError::VariantNotFound {
            variant_id: variant_id.to_string(),
        })?;

    Ok(InventoryStatus {
        is_available: variant.available_for_sale,
        inventory_policy: variant.inventory_policy,
    })
}

/// Search products by one attribute.
///
/// Only one filter applies: a price range wins over a collection, which wins
/// over a title. With none given, the first page of all products is returned.
pub async fn search_products_by_attributes(
    client: &dyn ShopifyClientPort,
    attributes: SearchAttributes,
) -> Result<Vec<ProductSummary>> {
    let page: ProductsPage = if let Some(range) = attributes.price_range {
        client
            .search_products_by_price_range(range.min, range.max)
            .await?
    } else if let Some(collection) = present(attributes.collection.as_deref()) {
        client.load_products_by_collection_id(collection).await?
    } else {
        client
            .load_products(
                present(attributes.title.as_deref()),
                crate::config::shopify::DEFAULT_PRODUCTS_PAGE,
            )
            .await?
    };

    Ok(page.products.iter().map(summarize).collect())
}

/// Blank filters count as not given
fn present(filter: Option<&str>) -> Option<&str> {
    filter.filter(|f| !f.trim().is_empty())
}

/// Price and availability come from the first variant
fn summarize(product: &Product) -> ProductSummary {
    let first = product.variants.first();
    ProductSummary {
        id: product.id.clone(),
        title: product.title.clone(),
        price: first.map_or_else(|| "0".to_string(), |v| v.price.clone()),
        available_for_sale: first.is_some_and(|v| v.available_for_sale),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shopify::types::ProductStatus;

    fn product(variants: Vec<ProductVariant>) -> Product {
        Product {
            id: "gid://shopify/Product/1".to_string(),
            title: "Soap".to_string(),
            description: String::new(),
            handle: None,
            status: Some(ProductStatus::Active),
            vendor: None,
            product_type: None,
            tags: vec![],
            variants,
            images: vec![],
        }
    }

    #[test]
    fn test_title_query() {
        assert_eq!(title_query("soap"), "title:*soap*");
        assert_eq!(title_query(" red \"soap\" "), "title:\"red \\\"soap\\\"\"");
    }

    #[test]
    fn test_blank_filter_is_absent() {
        assert_eq!(present(Some("soap")), Some("soap"));
        assert_eq!(present(Some(" \t")), None);
        assert_eq!(present(None), None);
    }

    #[test]
    fn test_price_range_query() {
        assert_eq!(price_range_query(10.0, 20.5), "variants.price:>=10 variants.price:<=20.5");
    }

    #[test]
    fn test_price_range_validation() {
        assert!(PriceRange { min: 10.0, max: 20.0 }.validate().is_ok());
        assert!(PriceRange { min: 30.0, max: 20.0 }.validate().is_err());
        assert!(PriceRange { min: -1.0, max: 20.0 }.validate().is_err());
    }

    #[test]
    fn test_summary_defaults_without_variants() {
        let summary = summarize(&product(vec![]));
        assert_eq!(summary.price, "0");
        assert!(!summary.available_for_sale);
    }

    #[test]
    fn test_summary_uses_first_variant() {
        let variant = |price: &str, available: bool| ProductVariant {
            id: format!("gid://shopify/ProductVariant/{}", price),
            title: "Default".to_string(),
            price: price.to_string(),
            sku: None,
            available_for_sale: available,
            inventory_policy: InventoryPolicy::Deny,
            inventory_quantity: None,
        };
        let summary = summarize(&product(vec![variant("9.99", true), variant("19.99", false)]));
        assert_eq!(summary.price, "9.99");
        assert!(summary.available_for_sale);
    }
}
