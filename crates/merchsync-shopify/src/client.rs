//! HTTP client for the Shopify Admin API.
//!
//! SKU and tag lookups go through GraphQL (the REST API cannot query by
//! SKU); everything else uses the Admin REST endpoints. All calls are paced
//! by the injected [`Pacer`] and retried with back-off on transient errors.
//!
//! In dry-run mode the five mutating operations return synthetic results
//! (id `0`) without issuing HTTP, while reads and lookups stay live — used
//! to preview a run's decisions without side effects.

use std::time::Duration;

use reqwest::{Client, Method, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;

use merchsync_core::{MappedProduct, MappedVariant};

use crate::error::ShopifyError;
use crate::rate_limit::{retry_with_backoff, Pacer};
use crate::types::{
    ProductEnvelope, ProductHit, ProductPatch, RemoteProduct, RemoteVariant, VariantEnvelope,
    VariantHit, VariantPatch,
};

const VARIANT_LOOKUP_QUERY: &str =
    "query($q: String!) { productVariants(first: 1, query: $q) { nodes { id sku product { id } } } }";
const PRODUCT_TAG_QUERY: &str =
    "query($q: String!) { products(first: 1, query: $q) { nodes { id title handle } } }";

/// Construction knobs for [`ShopifyClient`]; defaults mirror the config
/// defaults in `merchsync-core`.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts after the first failure for retriable errors.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    /// Courtesy delay before each remote call.
    pub inter_request_delay_ms: u64,
    pub dry_run: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            user_agent: "merchsync/0.1 (feed-import)".to_string(),
            max_retries: 3,
            backoff_base_ms: 1000,
            inter_request_delay_ms: 120,
            dry_run: false,
        }
    }
}

/// Client for the Shopify Admin API (REST + GraphQL).
///
/// Use [`ShopifyClient::new`] for production or
/// [`ShopifyClient::with_base_url`] to point at a mock server in tests.
pub struct ShopifyClient {
    client: Client,
    rest_base: Url,
    graphql_url: Url,
    token: String,
    pacer: Pacer,
    max_retries: u32,
    backoff_base_ms: u64,
    dry_run: bool,
}

impl ShopifyClient {
    /// Creates a client for `https://{shop_domain}/admin/api/{api_version}`.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ShopifyError::InvalidBaseUrl`] when the
    /// domain does not form a valid URL.
    pub fn new(
        shop_domain: &str,
        admin_token: &str,
        api_version: &str,
        options: &ClientOptions,
    ) -> Result<Self, ShopifyError> {
        let base = format!("https://{shop_domain}/admin/api/{api_version}");
        Self::with_base_url(&base, admin_token, options)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`ShopifyClient::new`].
    pub fn with_base_url(
        base_url: &str,
        admin_token: &str,
        options: &ClientOptions,
    ) -> Result<Self, ShopifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&options.user_agent)
            .build()?;

        // Normalise: exactly one trailing slash so Url::join appends path
        // segments instead of replacing the last one.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let rest_base = Url::parse(&normalised).map_err(|e| ShopifyError::InvalidBaseUrl {
            base_url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        let graphql_url = rest_base
            .join("graphql.json")
            .map_err(|e| ShopifyError::InvalidBaseUrl {
                base_url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            rest_base,
            graphql_url,
            token: admin_token.to_string(),
            pacer: Pacer::fixed_ms(options.inter_request_delay_ms),
            max_retries: options.max_retries,
            backoff_base_ms: options.backoff_base_ms,
            dry_run: options.dry_run,
        })
    }

    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    // -----------------------------------------------------------------------
    // GraphQL lookups
    // -----------------------------------------------------------------------

    /// Exact natural-key lookup: the SKU is JSON-quoted in the search query.
    ///
    /// # Errors
    ///
    /// [`ShopifyError::Api`] on a GraphQL error envelope, plus the transport
    /// errors shared by every call.
    pub async fn find_variant_by_sku(&self, sku: &str) -> Result<Option<VariantHit>, ShopifyError> {
        self.variant_lookup(format!("sku:{}", json_quote(sku))).await
    }

    /// Loose fallback lookup: the SKU goes into the search query unquoted,
    /// which matches stores whose stored SKUs defeat strict quoting.
    ///
    /// # Errors
    ///
    /// Same as [`ShopifyClient::find_variant_by_sku`].
    pub async fn find_variant_by_sku_loose(
        &self,
        sku: &str,
    ) -> Result<Option<VariantHit>, ShopifyError> {
        self.variant_lookup(format!("sku:{sku}")).await
    }

    async fn variant_lookup(&self, q: String) -> Result<Option<VariantHit>, ShopifyError> {
        let data = self
            .graphql(VARIANT_LOOKUP_QUERY, json!({ "q": q }))
            .await?;
        let decoded: VariantLookupData = decode(data, "productVariants lookup")?;
        decoded
            .product_variants
            .nodes
            .into_iter()
            .next()
            .map(|node| {
                Ok(VariantHit {
                    variant_id: gid_to_id(&node.id)?,
                    product_id: gid_to_id(&node.product.id)?,
                })
            })
            .transpose()
    }

    /// Finds the parent carrying `tag` (the `GMGroup:` idempotency anchor).
    ///
    /// # Errors
    ///
    /// Same as [`ShopifyClient::find_variant_by_sku`].
    pub async fn find_product_by_tag(&self, tag: &str) -> Result<Option<ProductHit>, ShopifyError> {
        let data = self
            .graphql(PRODUCT_TAG_QUERY, json!({ "q": format!("tag:{}", json_quote(tag)) }))
            .await?;
        let decoded: ProductLookupData = decode(data, "products tag lookup")?;
        decoded
            .products
            .nodes
            .into_iter()
            .next()
            .map(|node| {
                Ok(ProductHit {
                    product_id: gid_to_id(&node.id)?,
                })
            })
            .transpose()
    }

    // -----------------------------------------------------------------------
    // REST reads
    // -----------------------------------------------------------------------

    /// Fetches the full current representation of a product, tags and
    /// variants included.
    ///
    /// # Errors
    ///
    /// [`ShopifyError::UnexpectedStatus`] for non-2xx responses (including
    /// 404), [`ShopifyError::Deserialize`] on shape mismatch.
    pub async fn get_product(&self, product_id: i64) -> Result<RemoteProduct, ShopifyError> {
        let url = self.rest_url(&format!("products/{product_id}.json"))?;
        let value = self.execute(Method::GET, url, None).await?;
        Ok(decode::<ProductEnvelope>(value, "get product")?.product)
    }

    /// Resolves a variant's inventory item id, if stock tracking is set up.
    ///
    /// # Errors
    ///
    /// Same as [`ShopifyClient::get_product`].
    pub async fn get_inventory_item_id(
        &self,
        variant_id: i64,
    ) -> Result<Option<i64>, ShopifyError> {
        let url = self.rest_url(&format!("variants/{variant_id}.json"))?;
        let value = self.execute(Method::GET, url, None).await?;
        Ok(decode::<VariantEnvelope>(value, "get variant")?
            .variant
            .inventory_item_id)
    }

    // -----------------------------------------------------------------------
    // REST mutations (no-ops under dry run)
    // -----------------------------------------------------------------------

    /// Creates a product with its full variant/image/tag/option set in one
    /// mutation.
    ///
    /// # Errors
    ///
    /// Transport/status/deserialize errors as usual; never errors in dry run.
    pub async fn create_product(
        &self,
        product: &MappedProduct,
    ) -> Result<RemoteProduct, ShopifyError> {
        if self.dry_run {
            tracing::info!(title = %product.title, "dry run — skipping product create");
            return Ok(synthetic_product(product));
        }
        let url = self.rest_url("products.json")?;
        let value = self
            .execute(Method::POST, url, Some(json!({ "product": product })))
            .await?;
        Ok(decode::<ProductEnvelope>(value, "create product")?.product)
    }

    /// Applies a parent-level patch.
    ///
    /// # Errors
    ///
    /// Transport/status errors as usual; never errors in dry run.
    pub async fn update_product(
        &self,
        product_id: i64,
        patch: &ProductPatch,
    ) -> Result<(), ShopifyError> {
        if self.dry_run {
            tracing::info!(product_id, "dry run — skipping product update");
            return Ok(());
        }
        let url = self.rest_url(&format!("products/{product_id}.json"))?;
        let mut payload = to_object(patch, "product patch")?;
        payload.insert("id".to_string(), json!(product_id));
        self.execute(Method::PUT, url, Some(json!({ "product": payload })))
            .await?;
        Ok(())
    }

    /// Creates a variant under an existing product.
    ///
    /// # Errors
    ///
    /// Transport/status/deserialize errors as usual; never errors in dry run.
    pub async fn create_variant(
        &self,
        product_id: i64,
        variant: &MappedVariant,
    ) -> Result<RemoteVariant, ShopifyError> {
        if self.dry_run {
            tracing::info!(product_id, sku = %variant.sku, "dry run — skipping variant create");
            return Ok(synthetic_variant(variant));
        }
        let url = self.rest_url("variants.json")?;
        let mut payload = to_object(variant, "variant")?;
        payload.insert("product_id".to_string(), json!(product_id));
        let value = self
            .execute(Method::POST, url, Some(json!({ "variant": payload })))
            .await?;
        Ok(decode::<VariantEnvelope>(value, "create variant")?.variant)
    }

    /// Applies a field-level variant patch.
    ///
    /// # Errors
    ///
    /// Transport/status errors as usual; never errors in dry run.
    pub async fn update_variant(
        &self,
        variant_id: i64,
        patch: &VariantPatch,
    ) -> Result<(), ShopifyError> {
        if self.dry_run {
            tracing::info!(variant_id, "dry run — skipping variant update");
            return Ok(());
        }
        let url = self.rest_url(&format!("variants/{variant_id}.json"))?;
        let mut payload = to_object(patch, "variant patch")?;
        payload.insert("id".to_string(), json!(variant_id));
        self.execute(Method::PUT, url, Some(json!({ "variant": payload })))
            .await?;
        Ok(())
    }

    /// Sets an absolute stock level at a location.
    ///
    /// # Errors
    ///
    /// Transport/status errors as usual; never errors in dry run.
    pub async fn set_inventory_level(
        &self,
        inventory_item_id: i64,
        location_id: i64,
        available: i64,
    ) -> Result<(), ShopifyError> {
        if self.dry_run {
            tracing::info!(inventory_item_id, available, "dry run — skipping inventory set");
            return Ok(());
        }
        let url = self.rest_url("inventory_levels/set.json")?;
        let body = json!({
            "location_id": location_id,
            "inventory_item_id": inventory_item_id,
            "available": available,
        });
        self.execute(Method::POST, url, Some(body)).await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    fn rest_url(&self, path: &str) -> Result<Url, ShopifyError> {
        self.rest_base
            .join(path)
            .map_err(|e| ShopifyError::InvalidBaseUrl {
                base_url: self.rest_base.to_string(),
                reason: e.to_string(),
            })
    }

    async fn graphql(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<serde_json::Value, ShopifyError> {
        let body = json!({ "query": query, "variables": variables });
        let value = self
            .execute(Method::POST, self.graphql_url.clone(), Some(body))
            .await?;

        if let Some(errors) = value.get("errors").and_then(serde_json::Value::as_array) {
            if let Some(first) = errors.first() {
                let message = first
                    .get("message")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("unknown GraphQL error")
                    .to_string();
                return Err(ShopifyError::Api(message));
            }
        }

        value
            .get("data")
            .filter(|d| !d.is_null())
            .cloned()
            .ok_or_else(|| ShopifyError::Api("GraphQL response has no data".to_string()))
    }

    /// Sends one paced, retried request and parses the body as JSON
    /// (`null` for empty bodies).
    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, ShopifyError> {
        self.pacer.pause().await;
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let method = method.clone();
            let url = url.clone();
            let body = body.clone();
            async move {
                let mut request = self
                    .client
                    .request(method, url.clone())
                    .header("X-Shopify-Access-Token", &self.token);
                if let Some(payload) = &body {
                    request = request.json(payload);
                }

                let response = request.send().await?;
                let status = response.status();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(ShopifyError::RateLimited { retry_after_secs });
                }

                if !status.is_success() {
                    return Err(ShopifyError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                let text = response.text().await?;
                if text.trim().is_empty() {
                    return Ok(serde_json::Value::Null);
                }
                serde_json::from_str(&text).map_err(|e| ShopifyError::Deserialize {
                    context: url.to_string(),
                    source: e,
                })
            }
        })
        .await
    }
}

// ---------------------------------------------------------------------------
// Helpers and private GraphQL shapes
// ---------------------------------------------------------------------------

fn decode<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
    context: &str,
) -> Result<T, ShopifyError> {
    serde_json::from_value(value).map_err(|e| ShopifyError::Deserialize {
        context: context.to_string(),
        source: e,
    })
}

fn to_object<T: serde::Serialize>(
    value: &T,
    context: &str,
) -> Result<serde_json::Map<String, serde_json::Value>, ShopifyError> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(ShopifyError::Api(format!(
            "{context} serialized to non-object JSON: {other}"
        ))),
        Err(e) => Err(ShopifyError::Deserialize {
            context: context.to_string(),
            source: e,
        }),
    }
}

/// Extracts the numeric tail of a `gid://shopify/...` identifier.
fn gid_to_id(gid: &str) -> Result<i64, ShopifyError> {
    gid.rsplit('/')
        .next()
        .and_then(|tail| tail.parse::<i64>().ok())
        .ok_or_else(|| ShopifyError::Api(format!("unexpected gid format: {gid}")))
}

/// Minimal JSON string quoting for search-query embedding.
fn json_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

fn synthetic_product(product: &MappedProduct) -> RemoteProduct {
    RemoteProduct {
        id: 0,
        title: product.title.clone(),
        body_html: Some(product.body_html.clone()),
        vendor: Some(product.vendor.clone()),
        product_type: Some(product.product_type.clone()),
        tags: product.tags.clone(),
        handle: Some(product.handle.clone()),
        status: Some(product.status.clone()),
        variants: Vec::new(),
    }
}

fn synthetic_variant(variant: &MappedVariant) -> RemoteVariant {
    RemoteVariant {
        id: 0,
        sku: Some(variant.sku.clone()),
        price: variant.price.clone(),
        compare_at_price: variant.compare_at_price.clone(),
        inventory_management: Some(variant.inventory_management.clone()),
        inventory_item_id: None,
    }
}

#[derive(Debug, Deserialize)]
struct VariantLookupData {
    #[serde(rename = "productVariants")]
    product_variants: NodeList<VariantNode>,
}

#[derive(Debug, Deserialize)]
struct ProductLookupData {
    products: NodeList<ProductNode>,
}

#[derive(Debug, Deserialize)]
struct NodeList<T> {
    nodes: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct VariantNode {
    id: String,
    product: ProductRef,
}

#[derive(Debug, Deserialize)]
struct ProductRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ProductNode {
    id: String,
}
