// src/ui/state.rs - Storefront context shared by every page

use std::sync::Arc;

use dioxus::prelude::*;

use crate::app::ApplicationCore;
use crate::catalog::{QueryParams, QuerySync};
use crate::config::{StorefrontConfig, UiConfig};

/// Application core handed to the view layer, or why it could not start
#[derive(Clone)]
pub struct StorefrontContext {
    pub core: Option<Arc<ApplicationCore>>,
    pub startup_error: Option<String>,
    pub ui: UiConfig,
}

impl StorefrontContext {
    pub fn from_core(core: Arc<ApplicationCore>) -> Self {
        Self {
            ui: core.config().ui.clone(),
            core: Some(core),
            startup_error: None,
        }
    }

    /// Builds a core from built-in defaults (the web target has no config files)
    pub fn from_defaults() -> Self {
        let config = StorefrontConfig::default();
        match ApplicationCore::new(config.clone()) {
            Ok(core) => Self::from_core(Arc::new(core)),
            Err(error) => {
                tracing::error!(error = %error, "storefront failed to start");
                Self {
                    core: None,
                    startup_error: Some(error.user_message()),
                    ui: config.ui,
                }
            }
        }
    }
}

/// Provides [`StorefrontContext`], reusing a core supplied at launch if any
#[component]
pub fn StorefrontProvider(children: Element) -> Element {
    use_context_provider(|| match try_consume_context::<Arc<ApplicationCore>>() {
        Some(core) => StorefrontContext::from_core(core),
        None => StorefrontContext::from_defaults(),
    });

    rsx! { {children} }
}

pub fn use_storefront() -> StorefrontContext {
    use_context::<StorefrontContext>()
}

/// [`QuerySync`] that hands written queries to the router through a signal
#[derive(Clone, Copy)]
pub struct RouterQuerySync {
    pending: SyncSignal<Option<QueryParams>>,
}

impl RouterQuerySync {
    pub fn new(pending: SyncSignal<Option<QueryParams>>) -> Self {
        Self { pending }
    }
}

impl QuerySync for RouterQuerySync {
    fn write(&self, params: &QueryParams) {
        let mut pending = self.pending;
        pending.set(Some(params.clone()));
    }
}
