//! Draft order helpers.

use crate::shopify::types::{DraftLineItem, DraftOrderInput, MailingAddress};

/// Prefix of generated draft order idempotency keys
const IDEMPOTENCY_PREFIX: &str = "draft-order-";

/// A fresh idempotency key for one draft order creation
pub fn generate_idempotency_key() -> String {
    format!("{}{}", IDEMPOTENCY_PREFIX, uuid::Uuid::new_v4())
}

/// Draft order input billed to the shipping address, untagged.
pub fn draft_order_input(
    line_items: Vec<DraftLineItem>,
    email: String,
    shipping_address: MailingAddress,
    note: Option<String>,
) -> DraftOrderInput {
    DraftOrderInput {
        line_items,
        email,
        billing_address: shipping_address.clone(),
        shipping_address,
        tags: Vec::new(),
        note: note.unwrap_or_default(),
    }
}
