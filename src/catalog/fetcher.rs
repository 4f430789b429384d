// src/catalog/fetcher.rs - Read access to the upstream product catalog

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::catalog::cache::ResponseCache;
use crate::catalog::models::{PageResult, ProductDetail, ProductSummary};
use crate::catalog::query::{self, FilterState, QueryParams};
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::platform::{NetworkArc, NetworkRequest};

/// Reads products from the upstream catalog.
///
/// Implementations never retry; every failure is returned to the caller.
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
pub trait ProductFetcher: FetcherBounds {
    /// Fetches the page of products described by `filters`
    async fn fetch_page(&self, filters: &FilterState) -> Result<PageResult>;

    /// Fetches one product with its reviews
    async fn fetch_one(&self, id: &str) -> Result<ProductDetail>;

    /// Category names for the filter options; empty when unavailable
    async fn fetch_categories(&self) -> Vec<String>;

    fn page_size(&self) -> u32;
}

#[cfg(not(target_arch = "wasm32"))]
pub trait FetcherBounds: Send + Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync> FetcherBounds for T {}

#[cfg(target_arch = "wasm32")]
pub trait FetcherBounds: Sync {}
#[cfg(target_arch = "wasm32")]
impl<T: Sync> FetcherBounds for T {}

#[cfg(not(target_arch = "wasm32"))]
pub type DynFetcher = dyn ProductFetcher + Send + Sync;
#[cfg(target_arch = "wasm32")]
pub type DynFetcher = dyn ProductFetcher + Sync;

pub type FetcherArc = Arc<DynFetcher>;

/// Listing response bodies the upstream is known to send
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListingEnvelope {
    Bare(Vec<ProductSummary>),
    Wrapped {
        #[serde(alias = "items")]
        products: Vec<ProductSummary>,
        #[serde(default)]
        total: Option<u64>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CategoryEntry {
    Name(String),
    Record {
        #[serde(default)]
        slug: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
}

impl CategoryEntry {
    fn into_name(self) -> Option<String> {
        match self {
            Self::Name(name) => Some(name),
            Self::Record { slug, name } => slug.or(name),
        }
        .filter(|n| !n.trim().is_empty())
    }
}

/// A response body and whether it came out of the cache
struct Body {
    bytes: Arc<Vec<u8>>,
    cached: bool,
}

/// HTTP implementation of [`ProductFetcher`]
pub struct CatalogClient {
    network: NetworkArc,
    base_url: String,
    page_size: u32,
    timeout_ms: u64,
    cache: Option<Arc<ResponseCache>>,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .field("timeout_ms", &self.timeout_ms)
            .field("cache", &self.cache.as_ref().map(|c| c.ttl()))
            .finish()
    }
}

impl CatalogClient {
    pub fn new(network: NetworkArc, config: &ApiConfig) -> Self {
        let cache = (config.cache_ttl_secs > 0)
            .then(|| Arc::new(ResponseCache::new(Duration::from_secs(config.cache_ttl_secs))));

        Self {
            network,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size.max(1),
            timeout_ms: config.timeout_ms,
            cache,
        }
    }

    /// Replaces the response cache (`None` disables caching)
    pub fn with_cache(mut self, cache: Option<Arc<ResponseCache>>) -> Self {
        self.cache = cache;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> Option<&Arc<ResponseCache>> {
        self.cache.as_ref()
    }

    /// Upstream parameters for a listing request: `limit`/`skip` from the
    /// page, plus whichever filters are set.
    pub fn page_request_params(&self, filters: &FilterState) -> QueryParams {
        let mut params = QueryParams::new();
        params.insert("limit".to_string(), self.page_size.to_string());
        params.insert("skip".to_string(), self.skip_for(filters).to_string());

        if !filters.search.is_empty() {
            params.insert("search".to_string(), filters.search.clone());
        }
        if !filters.category.is_empty() {
            params.insert("category".to_string(), filters.category.clone());
        }
        if let Some(sort) = &filters.sort {
            params.insert("sortBy".to_string(), sort.by.clone());
            params.insert("order".to_string(), sort.order.to_string());
        }

        params
    }

    pub fn products_url(&self, filters: &FilterState) -> String {
        format!(
            "{}/products?{}",
            self.base_url,
            query::to_query_string(&self.page_request_params(filters))
        )
    }

    pub fn product_url(&self, id: &str) -> String {
        format!("{}/products/{}", self.base_url, urlencoding::encode(id))
    }

    pub fn categories_url(&self) -> String {
        format!("{}/categories", self.base_url)
    }

    fn skip_for(&self, filters: &FilterState) -> u64 {
        u64::from(filters.page().saturating_sub(1)) * u64::from(self.page_size)
    }

    /// GETs `url`, answering from the cache when possible. Non-success
    /// statuses become [`ErrorKind::Upstream`](crate::error::ErrorKind::Upstream).
    ///
    /// Nothing is cached here; callers [`remember`](Self::remember) a body
    /// once it has decoded.
    async fn get_body(&self, url: &str) -> Result<Body> {
        if let Some(bytes) = self.cache.as_ref().and_then(|c| c.get(url)) {
            tracing::debug!(url, "catalog cache hit");
            return Ok(Body {
                bytes,
                cached: true,
            });
        }

        tracing::debug!(url, "requesting catalog");
        let request = NetworkRequest::get(url)
            .header("Accept", "application/json")
            .timeout_ms(self.timeout_ms);
        let response = self.network.request(request).await?;

        if !response.is_success() {
            tracing::warn!(url, status = response.status_code, "catalog request failed");
            return Err(Error::upstream(response.status_code, url));
        }

        Ok(Body {
            bytes: Arc::new(response.body),
            cached: false,
        })
    }

    fn remember(&self, url: &str, body: Body) {
        if let (Some(cache), false) = (&self.cache, body.cached) {
            cache.insert(url, body.bytes);
        }
    }

    fn normalize(envelope: ListingEnvelope, skip: u64, page_size: u32) -> PageResult {
        let (items, total) = match envelope {
            ListingEnvelope::Bare(items) => (items, None),
            ListingEnvelope::Wrapped { products, total } => (products, total),
        };

        match total {
            Some(total_count) => PageResult {
                items,
                total_count,
                page_size,
                has_more: false,
            },
            None => {
                let returned = items.len() as u64;
                PageResult {
                    has_more: returned >= u64::from(page_size),
                    total_count: skip + returned,
                    items,
                    page_size,
                }
            }
        }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
impl ProductFetcher for CatalogClient {
    async fn fetch_page(&self, filters: &FilterState) -> Result<PageResult> {
        let url = self.products_url(filters);
        let body = self.get_body(&url).await?;

        let envelope: ListingEnvelope = serde_json::from_slice(&body.bytes).map_err(|e| {
            Error::decode(&url, format!("Unexpected product listing shape: {}", e)).caused_by(e)
        })?;
        self.remember(&url, body);

        let page = Self::normalize(envelope, self.skip_for(filters), self.page_size);
        tracing::debug!(
            url = %url,
            items = page.items.len(),
            total = page.total_count,
            "catalog page loaded"
        );
        Ok(page)
    }

    async fn fetch_one(&self, id: &str) -> Result<ProductDetail> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::not_found("product", id));
        }

        let url = self.product_url(id);
        let body = match self.get_body(&url).await {
            Ok(body) => body,
            Err(e) if e.status_code() == Some(404) => {
                return Err(Error::not_found("product", id).caused_by(e));
            }
            Err(e) => return Err(e),
        };

        let value: serde_json::Value = serde_json::from_slice(&body.bytes)
            .map_err(|e| Error::decode(&url, format!("Product body is not JSON: {}", e)))?;
        if value.is_null() {
            return Err(Error::not_found("product", id));
        }

        let mut detail: ProductDetail = serde_json::from_value(value).map_err(|e| {
            Error::decode(&url, format!("Unexpected product shape: {}", e)).caused_by(e)
        })?;
        detail.assign_review_ids();
        self.remember(&url, body);
        Ok(detail)
    }

    async fn fetch_categories(&self) -> Vec<String> {
        let url = self.categories_url();
        let body = match self.get_body(&url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "categories unavailable");
                return Vec::new();
            }
        };

        match serde_json::from_slice::<Vec<CategoryEntry>>(&body.bytes) {
            Ok(entries) => {
                self.remember(&url, body);
                entries.into_iter().filter_map(CategoryEntry::into_name).collect()
            }
            Err(e) => {
                tracing::warn!(error = %e, url = %url, "categories response was not a list");
                Vec::new()
            }
        }
    }

    fn page_size(&self) -> u32 {
        self.page_size
    }
}
