//! The operations the tools need from the Shopify Admin API.
//!
//! [`ShopifyClient`](crate::shopify::client::ShopifyClient) implements this
//! against the real API; tests plug in an in-memory double.

use async_trait::async_trait;

use crate::error::Result;
use crate::shopify::types::{
    BulkUpdateOutcome, CollectionQuery, CollectionsPage, CreateProductInput, DraftOrderCompleted,
    DraftOrderCreated, DraftOrderInput, OrderQuery, OrdersPage, Product, ProductUpdate,
    ProductUpdateItem, ProductVariant, ProductsPage,
};

#[async_trait]
pub trait ShopifyClientPort: Send + Sync {
    /// A page of orders
    async fn load_orders(&self, query: OrderQuery) -> Result<OrdersPage>;

    /// Create a draft order; retries with the same key must not duplicate it
    async fn create_draft_order(
        &self,
        input: DraftOrderInput,
        idempotency_key: &str,
    ) -> Result<DraftOrderCreated>;

    /// Complete a draft order that contains `variant_id`
    async fn complete_draft_order(
        &self,
        draft_order_id: &str,
        variant_id: &str,
    ) -> Result<DraftOrderCompleted>;

    /// Products, optionally filtered by title
    async fn load_products(&self, search_title: Option<&str>, limit: i64) -> Result<ProductsPage>;

    /// One product by id
    async fn load_product(&self, product_id: &str) -> Result<Option<Product>>;

    /// One variant by id
    async fn load_variant(&self, variant_id: &str) -> Result<Option<ProductVariant>>;

    /// Products having a variant priced within `[min_price, max_price]`
    async fn search_products_by_price_range(
        &self,
        min_price: f64,
        max_price: f64,
    ) -> Result<ProductsPage>;

    /// Products belonging to a collection
    async fn load_products_by_collection_id(&self, collection_id: &str) -> Result<ProductsPage>;

    async fn create_product(&self, input: CreateProductInput) -> Result<Product>;

    async fn update_product(&self, product_id: &str, update: ProductUpdate) -> Result<Product>;

    /// Apply each update in turn. A failed item is reported and the rest still run.
    async fn bulk_update_products(
        &self,
        updates: Vec<ProductUpdateItem>,
    ) -> Result<Vec<BulkUpdateOutcome>> {
        let mut outcomes = Vec::with_capacity(updates.len());

        for item in updates {
            match self.update_product(&item.product_id, item.update).await {
                Ok(_) => outcomes.push(BulkUpdateOutcome {
                    id: item.product_id,
                    success: true,
                    error: None,
                }),
                Err(e) => {
                    tracing::warn!(product_id = %item.product_id, error = %e, "bulk update item failed");
                    outcomes.push(BulkUpdateOutcome {
                        id: item.product_id,
                        success: false,
                        error: Some(e.to_string()),
                    })
                }
            }
        }

        Ok(outcomes)
    }

    async fn load_collections(&self, query: CollectionQuery) -> Result<CollectionsPage>;
}
