//! Collection tools

use std::sync::Arc;

use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

use super::ToolHandler;
use crate::config::shopify::DEFAULT_COLLECTIONS_PAGE;
use crate::error::Result;
use crate::shopify::collection_name_query;
use crate::shopify::port::ShopifyClientPort;
use crate::shopify::types::{CollectionQuery, CollectionsPage};

/// Arguments of `get-collections`
#[derive(Debug, Clone, Default, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GetCollectionsArgs {
    /// Maximum number of collections to return
    #[serde(default)]
    #[validate(range(min = 1, max = 250))]
    pub limit: Option<i64>,

    /// Filter collections by name
    #[serde(default)]
    pub name: Option<String>,
}

impl From<GetCollectionsArgs> for CollectionQuery {
    fn from(args: GetCollectionsArgs) -> Self {
        CollectionQuery {
            limit: args.limit.unwrap_or(DEFAULT_COLLECTIONS_PAGE),
            query: args.name.as_deref().map(collection_name_query),
        }
    }
}

pub(super) fn register(handler: &mut ToolHandler) {
    handler.register(
        "get-collections",
        "Get collections with optional filtering",
        |_: &GetCollectionsArgs| "Failed to retrieve collections".to_string(),
        get_collections,
    );
}

async fn get_collections(
    client: Arc<dyn ShopifyClientPort>,
    args: GetCollectionsArgs,
) -> Result<CollectionsPage> {
    client.load_collections(args.into()).await
}
