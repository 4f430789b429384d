// src/catalog/mod.rs - Product catalog: query state, upstream access and view controllers

pub mod cache;
pub mod detail;
pub mod fetcher;
pub mod listing;
pub mod models;
pub mod query;

pub use cache::ResponseCache;
pub use detail::{
    sort_reviews, DetailController, DetailSnapshot, DetailState, ImageGallery, PageMetadata,
    ReviewSort,
};
pub use fetcher::{CatalogClient, FetcherArc, ProductFetcher};
pub use listing::{ListingController, ListingPhase, ListingSnapshot, MemoryQuerySync, QuerySync};
pub use models::{star_fill, Availability, PageResult, ProductDetail, ProductSummary, Review};
pub use query::{FilterChange, FilterState, QueryParams, Sort, SortOrder};

/// What happened to a fetch by the time it completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The result replaced the current state
    Applied,
    /// The fetch failed and the error was recorded
    Failed,
    /// A newer fetch was issued meanwhile, so this completion was dropped
    Superseded,
    /// The request was invalid and nothing was fetched
    Rejected,
}
