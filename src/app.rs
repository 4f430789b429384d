// src/app.rs

//! Application core
//!
//! Wires configuration, the platform network provider, the response cache
//! and the catalog client together, and hands out view controllers bound
//! to them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{
    CatalogClient, DetailController, FetcherArc, ListingController, QueryParams, QuerySync,
    ResponseCache,
};
use crate::config::{ConfigManager, StorefrontConfig};
use crate::error::{Error, ErrorKind, Result};
use crate::platform::{self, NetworkArc};
use crate::utils::Time;

/// Summary of a running storefront
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationInfo {
    pub name: String,
    pub version: String,
    pub platform: String,
    pub base_url: String,
    pub page_size: u32,
    pub cache_enabled: bool,
    pub cache_entries: usize,
    pub started_at: DateTime<Utc>,
}

pub struct ApplicationCore {
    config: StorefrontConfig,
    client: Arc<CatalogClient>,
    started_at: DateTime<Utc>,
}

impl std::fmt::Debug for ApplicationCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationCore")
            .field("client", &self.client)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

impl ApplicationCore {
    /// Builds the core on the platform's default network provider
    pub fn new(config: StorefrontConfig) -> Result<Self> {
        let network = platform::create_network()?;
        Self::with_network(config, network)
    }

    /// Builds the core from the merged configuration of `manager`
    pub fn from_config_manager(manager: &ConfigManager) -> Result<Self> {
        Self::new(manager.validated_config()?)
    }

    pub fn with_network(config: StorefrontConfig, network: NetworkArc) -> Result<Self> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(Error::new(
                ErrorKind::Configuration {
                    key: errors.first().map(|e| e.key.clone()),
                    validation_errors: errors.iter().map(ToString::to_string).collect(),
                },
                "Cannot start with an invalid configuration",
            )
            .source("application"));
        }

        let client = CatalogClient::new(network, &config.api);
        tracing::info!(
            base_url = client.base_url(),
            page_size = config.api.page_size,
            cache_ttl_secs = config.api.cache_ttl_secs,
            platform = platform::platform_name(),
            "storefront ready"
        );

        Ok(Self {
            config,
            client: Arc::new(client),
            started_at: Time::now(),
        })
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn fetcher(&self) -> FetcherArc {
        self.client.clone()
    }

    /// Listing controller starting from the given URL query
    pub fn listing(&self, params: &QueryParams) -> ListingController {
        ListingController::from_query(self.fetcher(), params)
    }

    pub fn listing_with_sync(
        &self,
        params: &QueryParams,
        query_sync: Arc<dyn QuerySync>,
    ) -> ListingController {
        self.listing(params).with_query_sync(query_sync)
    }

    pub fn detail(&self) -> DetailController {
        DetailController::new(self.fetcher())
    }

    pub fn cache(&self) -> Option<&Arc<ResponseCache>> {
        self.client.cache()
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = self.client.cache() {
            cache.clear();
        }
    }

    pub fn info(&self) -> ApplicationInfo {
        ApplicationInfo {
            name: self.config.app.name.clone(),
            version: crate::VERSION.to_string(),
            platform: platform::platform_name().to_string(),
            base_url: self.client.base_url().to_string(),
            page_size: self.config.api.page_size,
            cache_enabled: self.client.cache().is_some(),
            cache_entries: self.client.cache().map_or(0, |c| c.len()),
            started_at: self.started_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FetchOutcome, MemoryQuerySync};
    use crate::testing::{fake_products, StubNetwork};

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = StorefrontConfig::default();
        config.api.base_url = String::new();
        let stub = Arc::new(StubNetwork::catalog(Vec::new()));

        let error = ApplicationCore::with_network(config, stub).unwrap_err();
        assert!(matches!(error.kind, ErrorKind::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_controllers_share_cached_client() {
        let stub = Arc::new(StubNetwork::catalog(fake_products(25)));
        let core = ApplicationCore::with_network(StorefrontConfig::default(), stub.clone()).unwrap();
        let sync = Arc::new(MemoryQuerySync::new());

        let listing = core.listing_with_sync(&QueryParams::new(), sync.clone());
        assert_eq!(listing.load().await, FetchOutcome::Applied);
        let again = core.listing(&QueryParams::new());
        assert_eq!(again.load().await, FetchOutcome::Applied);
        assert_eq!(stub.request_count(), 1);

        let detail = core.detail();
        assert_eq!(detail.load("3").await, FetchOutcome::Applied);

        let info = core.info();
        assert!(info.cache_enabled);
        assert_eq!(info.cache_entries, 2);

        core.clear_cache();
        assert_eq!(core.info().cache_entries, 0);
    }
}
