//! GraphQL documents sent to the Shopify Admin API.

/// Fields selected for every product
const PRODUCT_FIELDS: &str = r#"
  id
  title
  description
  handle
  status
  vendor
  productType
  tags
  variants(first: $variantCount) {
    edges {
      node {
        id
        title
        price
        sku
        availableForSale
        inventoryPolicy
        inventoryQuantity
      }
    }
  }
  images(first: $imageCount) {
    edges {
      node {
        src: url
        altText
      }
    }
  }
"#;

/// Build a product query/mutation with the shared product selection spliced in.
fn with_product_fields(template: &str) -> String {
    template.replace("...ProductFields", PRODUCT_FIELDS)
}

pub fn load_products() -> String {
    with_product_fields(
        r#"
query LoadProducts($first: Int!, $query: String, $variantCount: Int!, $imageCount: Int!) {
  products(first: $first, query: $query) {
    pageInfo { hasNextPage endCursor }
    edges { node { ...ProductFields } }
  }
}
"#,
    )
}

pub fn load_product() -> String {
    with_product_fields(
        r#"
query LoadProduct($id: ID!, $variantCount: Int!, $imageCount: Int!) {
  product(id: $id) { ...ProductFields }
}
"#,
    )
}

pub fn load_products_by_collection() -> String {
    with_product_fields(
        r#"
query LoadProductsByCollection($id: ID!, $first: Int!, $variantCount: Int!, $imageCount: Int!) {
  collection(id: $id) {
    products(first: $first) {
      pageInfo { hasNextPage endCursor }
      edges { node { ...ProductFields } }
    }
  }
}
"#,
    )
}

pub fn product_create() -> String {
    with_product_fields(
        r#"
mutation ProductCreate($product: ProductCreateInput!, $variantCount: Int!, $imageCount: Int!) {
  productCreate(product: $product) {
    product { ...ProductFields }
    userErrors { field message }
  }
}
"#,
    )
}

pub fn product_variants_bulk_create() -> String {
    with_product_fields(
        r#"
mutation ProductVariantsBulkCreate(
  $productId: ID!,
  $variants: [ProductVariantsBulkInput!]!,
  $variantCount: Int!,
  $imageCount: Int!
) {
  productVariantsBulkCreate(productId: $productId, variants: $variants, strategy: REMOVE_STANDALONE_VARIANT) {
    product { ...ProductFields }
    userErrors { field message }
  }
}
"#,
    )
}

pub fn product_update() -> String {
    with_product_fields(
        r#"
mutation ProductUpdate($product: ProductUpdateInput!, $variantCount: Int!, $imageCount: Int!) {
  productUpdate(product: $product) {
    product { ...ProductFields }
    userErrors { field message }
  }
}
"#,
    )
}

pub const LOAD_VARIANT: &str = r#"
query LoadVariant($id: ID!) {
  productVariant(id: $id) {
    id
    title
    price
    sku
    availableForSale
    inventoryPolicy
    inventoryQuantity
  }
}
"#;

pub const PRIMARY_LOCATION: &str = r#"
query PrimaryLocation {
  location { id }
}
"#;

pub const LOAD_ORDERS: &str = r#"
query LoadOrders(
  $first: Int!,
  $after: String,
  $query: String,
  $sortKey: OrderSortKeys,
  $reverse: Boolean,
  $lineItemCount: Int!
) {
  orders(first: $first, after: $after, query: $query, sortKey: $sortKey, reverse: $reverse) {
    pageInfo { hasNextPage endCursor }
    edges {
      node {
        id
        name
        createdAt
        displayFinancialStatus
        displayFulfillmentStatus
        email
        note
        tags
        totalPriceSet { shopMoney { amount currencyCode } }
        subtotalPriceSet { shopMoney { amount currencyCode } }
        totalShippingPriceSet { shopMoney { amount currencyCode } }
        totalTaxSet { shopMoney { amount currencyCode } }
        customer { id email firstName lastName }
        shippingAddress { address1 address2 city province zip country phone }
        lineItems(first: $lineItemCount) {
          edges {
            node {
              id
              title
              quantity
              originalTotalSet { shopMoney { amount currencyCode } }
              variant { id title sku }
            }
          }
        }
      }
    }
  }
}
"#;

pub const DRAFT_ORDER_CREATE: &str = r#"
mutation DraftOrderCreate($input: DraftOrderInput!, $idempotencyKey: String!) {
  draftOrderCreate(input: $input) @idempotent(key: $idempotencyKey) {
    draftOrder { id name }
    userErrors { field message }
  }
}
"#;

pub const LOAD_DRAFT_ORDER: &str = r#"
query LoadDraftOrder($id: ID!, $after: String) {
  draftOrder(id: $id) {
    id
    name
    status
    lineItems(first: 250, after: $after) {
      pageInfo { hasNextPage endCursor }
      edges { node { variant { id } } }
    }
  }
}
"#;

pub const DRAFT_ORDER_COMPLETE: &str = r#"
mutation DraftOrderComplete($id: ID!) {
  draftOrderComplete(id: $id) {
    draftOrder { id name order { id } }
    userErrors { field message }
  }
}
"#;

pub const LOAD_COLLECTIONS: &str = r#"
query LoadCollections($first: Int!, $query: String) {
  collections(first: $first, query: $query) {
    pageInfo { hasNextPage endCursor }
    edges {
      node {
        id
        title
        handle
        description
        updatedAt
        productsCount { count }
      }
    }
  }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_fields_spliced() {
        for doc in [load_products(), load_product(), product_update(), product_create()] {
            assert!(!doc.contains("...ProductFields"));
            assert!(doc.contains("availableForSale"));
        }
    }

    #[test]
    fn test_draft_order_create_is_idempotent() {
        assert!(DRAFT_ORDER_CREATE.contains("@idempotent(key: $idempotencyKey)"));
    }
}
