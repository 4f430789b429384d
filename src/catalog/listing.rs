// src/catalog/listing.rs - Filter, sort and pagination state for the product list

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::catalog::fetcher::FetcherArc;
use crate::catalog::FetchOutcome;
use crate::catalog::models::{PageResult, ProductSummary};
use crate::catalog::query::{self, FilterChange, FilterState, QueryParams};
use crate::error::{Error, Result};

/// Receives the encoded URL query whenever the listing filters change
pub trait QuerySync: Send + Sync {
    fn write(&self, params: &QueryParams);
}

/// [`QuerySync`] that keeps the last written query in memory
#[derive(Debug, Default)]
pub struct MemoryQuerySync {
    last: Mutex<Option<QueryParams>>,
    writes: Mutex<usize>,
}

impl MemoryQuerySync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<QueryParams> {
        self.last.lock().clone()
    }

    /// Takes the pending query, leaving nothing behind
    pub fn take(&self) -> Option<QueryParams> {
        self.last.lock().take()
    }

    pub fn write_count(&self) -> usize {
        *self.writes.lock()
    }
}

impl QuerySync for MemoryQuerySync {
    fn write(&self, params: &QueryParams) {
        *self.last.lock() = Some(params.clone());
        *self.writes.lock() += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingPhase {
    Idle,
    Loading,
}

/// Everything the list view renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingSnapshot {
    pub filters: FilterState,
    pub items: Vec<ProductSummary>,
    pub total_count: u64,
    pub total_pages: u32,
    pub max_page: u32,
    pub loading: bool,
    pub error: Option<String>,
    pub categories: Vec<String>,
}

#[derive(Debug)]
struct ListingState {
    filters: FilterState,
    phase: ListingPhase,
    result: Option<PageResult>,
    error: Option<Error>,
    categories: Vec<String>,
    /// Generation of the most recently issued fetch
    generation: u64,
}

impl ListingState {
    fn max_page(&self) -> u32 {
        self.result.as_ref().map_or(1, PageResult::max_page)
    }
}

/// Owns the listing filters and applies fetch completions last-writer-wins.
///
/// Every issued fetch takes a new generation number. When a fetch
/// completes, its result is applied only if no newer fetch was issued in
/// the meantime. Nothing is cancelled on the wire.
pub struct ListingController {
    fetcher: FetcherArc,
    query_sync: Arc<dyn QuerySync>,
    state: Mutex<ListingState>,
}

impl std::fmt::Debug for ListingController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingController")
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl ListingController {
    pub fn new(fetcher: FetcherArc) -> Self {
        Self::with_filters(fetcher, FilterState::default())
    }

    /// Starts from the filters encoded in the current URL query
    pub fn from_query(fetcher: FetcherArc, params: &QueryParams) -> Self {
        Self::with_filters(fetcher, query::decode(params))
    }

    pub fn with_filters(fetcher: FetcherArc, filters: FilterState) -> Self {
        Self {
            fetcher,
            query_sync: Arc::new(MemoryQuerySync::new()),
            state: Mutex::new(ListingState {
                filters,
                phase: ListingPhase::Idle,
                result: None,
                error: None,
                categories: Vec::new(),
                generation: 0,
            }),
        }
    }

    pub fn with_query_sync(mut self, query_sync: Arc<dyn QuerySync>) -> Self {
        self.query_sync = query_sync;
        self
    }

    /// Fetches the page for the current filters
    pub async fn load(&self) -> FetchOutcome {
        let (generation, filters) = self.begin_fetch();
        self.run_fetch(generation, filters).await
    }

    /// Merges `change` into the filters, writes the URL query and fetches.
    ///
    /// The page goes back to 1 unless the change is only a page change.
    pub async fn apply_filter_change(&self, change: FilterChange) -> FetchOutcome {
        if change.is_empty() {
            return FetchOutcome::Rejected;
        }

        let params = {
            let mut state = self.state.lock();
            state.filters.apply(change);
            query::encode(&state.filters)
        };
        self.query_sync.write(&params);

        self.load().await
    }

    /// Moves to page `page`; out-of-range pages leave everything untouched.
    pub async fn change_page(&self, page: u32) -> FetchOutcome {
        let params = {
            let mut state = self.state.lock();
            let max_page = state.max_page();
            if page < 1 || page > max_page {
                tracing::debug!(page, max_page, "page change rejected");
                return FetchOutcome::Rejected;
            }
            state.filters.set_page(page);
            query::encode(&state.filters)
        };
        self.query_sync.write(&params);

        self.load().await
    }

    /// Restores the default filters, clears the URL query and re-fetches
    pub async fn reset(&self) -> FetchOutcome {
        self.state.lock().filters = FilterState::default();
        self.query_sync.write(&QueryParams::new());

        self.load().await
    }

    /// Loads the category filter options
    pub async fn load_categories(&self) -> Vec<String> {
        let categories = self.fetcher.fetch_categories().await;
        self.state.lock().categories = categories.clone();
        categories
    }

    fn begin_fetch(&self) -> (u64, FilterState) {
        let mut state = self.state.lock();
        state.generation += 1;
        state.phase = ListingPhase::Loading;
        (state.generation, state.filters.clone())
    }

    async fn run_fetch(&self, generation: u64, filters: FilterState) -> FetchOutcome {
        tracing::debug!(generation, page = filters.page(), "fetching listing page");
        let result = self.fetcher.fetch_page(&filters).await;
        self.complete(generation, result)
    }

    fn complete(&self, generation: u64, result: Result<PageResult>) -> FetchOutcome {
        let mut state = self.state.lock();
        if generation != state.generation {
            tracing::debug!(
                generation,
                latest = state.generation,
                "discarding superseded listing result"
            );
            return FetchOutcome::Superseded;
        }

        state.phase = ListingPhase::Idle;
        match result {
            Ok(page) => {
                state.result = Some(page);
                state.error = None;
                FetchOutcome::Applied
            }
            Err(error) => {
                tracing::warn!(error = %error, "listing fetch failed");
                state.error = Some(error);
                FetchOutcome::Failed
            }
        }
    }

    pub fn snapshot(&self) -> ListingSnapshot {
        let state = self.state.lock();
        let (items, total_count, total_pages) = match &state.result {
            Some(page) => (page.items.clone(), page.total_count, page.total_pages()),
            None => (Vec::new(), 0, 0),
        };

        ListingSnapshot {
            filters: state.filters.clone(),
            items,
            total_count,
            total_pages,
            max_page: state.max_page(),
            loading: state.phase == ListingPhase::Loading,
            error: state.error.as_ref().map(Error::user_message),
            categories: state.categories.clone(),
        }
    }

    pub fn filters(&self) -> FilterState {
        self.state.lock().filters.clone()
    }

    /// The URL query for the current filters
    pub fn query(&self) -> QueryParams {
        query::encode(&self.state.lock().filters)
    }

    pub fn phase(&self) -> ListingPhase {
        self.state.lock().phase
    }

    pub fn last_error(&self) -> Option<Error> {
        self.state.lock().error.clone()
    }

    pub fn max_page(&self) -> u32 {
        self.state.lock().max_page()
    }
}
