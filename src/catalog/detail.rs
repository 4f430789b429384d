// src/catalog/detail.rs - Single product view: loading, review ordering and image gallery

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::catalog::fetcher::FetcherArc;
use crate::catalog::models::{ProductDetail, Review};
use crate::catalog::FetchOutcome;
use crate::error::{Error, Result};

pub const NOT_FOUND_TITLE: &str = "Product Not Found";
pub const NOT_FOUND_DESCRIPTION: &str = "The requested product could not be found.";

#[derive(Debug, Clone)]
pub enum DetailState {
    Idle,
    Loading,
    Ready(ProductDetail),
    Failed(Error),
}

impl DetailState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn detail(&self) -> Option<&ProductDetail> {
        match self {
            Self::Ready(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// Review ordering criteria
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewSort {
    /// Newest first
    #[default]
    DateDesc,
    DateAsc,
    RatingDesc,
    RatingAsc,
}

impl ReviewSort {
    pub const ALL: [ReviewSort; 4] = [
        Self::DateDesc,
        Self::DateAsc,
        Self::RatingDesc,
        Self::RatingAsc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DateDesc => "date-desc",
            Self::DateAsc => "date-asc",
            Self::RatingDesc => "rating-desc",
            Self::RatingAsc => "rating-asc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::DateDesc => "Newest First",
            Self::DateAsc => "Oldest First",
            Self::RatingDesc => "Highest Rating",
            Self::RatingAsc => "Lowest Rating",
        }
    }

    fn compare(self, a: &Review, b: &Review) -> Ordering {
        match self {
            Self::DateDesc => b.date.cmp(&a.date),
            Self::DateAsc => a.date.cmp(&b.date),
            Self::RatingDesc => b.rating.total_cmp(&a.rating),
            Self::RatingAsc => a.rating.total_cmp(&b.rating),
        }
    }
}

impl fmt::Display for ReviewSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewSort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|sort| sort.as_str() == s.trim())
            .ok_or_else(|| {
                Error::validation(
                    "review_sort",
                    format!(
                        "Unknown review order '{}'; expected date-desc, date-asc, rating-desc or rating-asc",
                        s
                    ),
                )
            })
    }
}

/// Returns `reviews` ordered by `sort`. Ties keep their original order.
pub fn sort_reviews(reviews: &[Review], sort: ReviewSort) -> Vec<Review> {
    let mut sorted = reviews.to_vec();
    sorted.sort_by(|a, b| sort.compare(a, b));
    sorted
}

/// Position within a product's images.
///
/// A product without images still has one (placeholder) slot, so the
/// index arithmetic never divides by zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageGallery {
    images: Vec<String>,
    index: usize,
}

impl ImageGallery {
    pub fn new(images: Vec<String>) -> Self {
        Self { images, index: 0 }
    }

    pub fn slot_count(&self) -> usize {
        self.images.len().max(1)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Current image, or `None` for the placeholder slot
    pub fn current_image(&self) -> Option<&str> {
        self.images.get(self.index).map(String::as_str)
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn is_placeholder(&self) -> bool {
        self.images.is_empty()
    }

    pub fn next(&mut self) -> usize {
        self.index = (self.index + 1) % self.slot_count();
        self.index
    }

    pub fn prev(&mut self) -> usize {
        let slots = self.slot_count();
        self.index = (self.index + slots - 1) % slots;
        self.index
    }

    /// Jumps to `index`; out-of-range values are ignored
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.slot_count() {
            self.index = index;
            true
        } else {
            false
        }
    }
}

/// Title and description for the document head
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
}

/// Everything the detail view renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailSnapshot {
    pub detail: Option<ProductDetail>,
    pub loading: bool,
    pub error: Option<String>,
    pub not_found: bool,
    pub image_index: usize,
}

#[derive(Debug)]
struct DetailInner {
    state: DetailState,
    gallery: ImageGallery,
    generation: u64,
}

/// Loads one product and tracks its gallery position.
///
/// Like the listing, only the most recently issued load may change state.
pub struct DetailController {
    fetcher: FetcherArc,
    inner: Mutex<DetailInner>,
}

impl fmt::Debug for DetailController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetailController")
            .field("inner", &*self.inner.lock())
            .finish_non_exhaustive()
    }
}

impl DetailController {
    pub fn new(fetcher: FetcherArc) -> Self {
        Self {
            fetcher,
            inner: Mutex::new(DetailInner {
                state: DetailState::Idle,
                gallery: ImageGallery::default(),
                generation: 0,
            }),
        }
    }

    /// Loads product `id`. Failures end up in [`DetailState::Failed`].
    pub async fn load(&self, id: &str) -> FetchOutcome {
        let generation = {
            let mut inner = self.inner.lock();
            inner.generation += 1;
            inner.state = DetailState::Loading;
            inner.generation
        };

        tracing::debug!(product_id = id, generation, "loading product");
        let result = self.fetcher.fetch_one(id).await;

        let mut inner = self.inner.lock();
        if inner.generation != generation {
            tracing::debug!(product_id = id, generation, "discarding superseded product");
            return FetchOutcome::Superseded;
        }

        match result {
            Ok(detail) => {
                inner.gallery = ImageGallery::new(detail.summary.images.clone());
                inner.state = DetailState::Ready(detail);
                FetchOutcome::Applied
            }
            Err(error) => {
                if error.is_not_found() {
                    tracing::info!(product_id = id, "product not found");
                } else {
                    tracing::warn!(product_id = id, error = %error, "product load failed");
                }
                inner.gallery = ImageGallery::default();
                inner.state = DetailState::Failed(error);
                FetchOutcome::Failed
            }
        }
    }

    pub fn state(&self) -> DetailState {
        self.inner.lock().state.clone()
    }

    pub fn detail(&self) -> Option<ProductDetail> {
        self.inner.lock().state.detail().cloned()
    }

    /// Reviews of the loaded product in the requested order
    pub fn sorted_reviews(&self, sort: ReviewSort) -> Vec<Review> {
        self.inner
            .lock()
            .state
            .detail()
            .map(|detail| sort_reviews(&detail.reviews, sort))
            .unwrap_or_default()
    }

    pub fn gallery(&self) -> ImageGallery {
        self.inner.lock().gallery.clone()
    }

    pub fn next_image(&self) -> usize {
        self.inner.lock().gallery.next()
    }

    pub fn prev_image(&self) -> usize {
        self.inner.lock().gallery.prev()
    }

    pub fn select_image(&self, index: usize) -> bool {
        self.inner.lock().gallery.select(index)
    }

    pub fn metadata(&self) -> PageMetadata {
        match &self.inner.lock().state {
            DetailState::Ready(detail) => PageMetadata {
                title: detail.summary.title.clone(),
                description: detail.description.clone(),
            },
            _ => PageMetadata {
                title: NOT_FOUND_TITLE.to_string(),
                description: NOT_FOUND_DESCRIPTION.to_string(),
            },
        }
    }

    pub fn snapshot(&self) -> DetailSnapshot {
        let inner = self.inner.lock();
        DetailSnapshot {
            detail: inner.state.detail().cloned(),
            loading: inner.state.is_loading(),
            error: inner.state.error().map(Error::user_message),
            not_found: inner.state.error().is_some_and(Error::is_not_found),
            image_index: inner.gallery.index(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fetcher::CatalogClient;
    use crate::config::ApiConfig;
    use crate::testing::{fake_products, StubNetwork};
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::sync::Arc;

    fn review(id: &str, rating: f64, day: u32) -> Review {
        Review {
            id: id.to_string(),
            author: format!("author-{}", id),
            date: Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap(),
            rating,
            text: String::new(),
        }
    }

    fn ids(reviews: &[Review]) -> Vec<&str> {
        reviews.iter().map(|r| r.id.as_str()).collect()
    }

    fn controller(stub: &Arc<StubNetwork>) -> DetailController {
        let config = ApiConfig {
            cache_ttl_secs: 0,
            ..ApiConfig::default()
        };
        DetailController::new(Arc::new(CatalogClient::new(stub.clone(), &config)))
    }

    #[test]
    fn test_rating_desc_is_stable() {
        let reviews = vec![
            review("a", 2.0, 1),
            review("b", 5.0, 2),
            review("c", 5.0, 3),
            review("d", 1.0, 4),
        ];

        let sorted = sort_reviews(&reviews, ReviewSort::RatingDesc);
        assert_eq!(ids(&sorted), vec!["b", "c", "a", "d"]);
        assert_eq!(ids(&reviews), vec!["a", "b", "c", "d"]);

        let sorted = sort_reviews(&reviews, ReviewSort::RatingAsc);
        assert_eq!(ids(&sorted), vec!["d", "a", "b", "c"]);
    }

    #[test]
    fn test_date_orders() {
        let reviews = vec![review("mid", 3.0, 10), review("new", 3.0, 20), review("old", 3.0, 1)];

        assert_eq!(
            ids(&sort_reviews(&reviews, ReviewSort::default())),
            vec!["new", "mid", "old"]
        );
        assert_eq!(
            ids(&sort_reviews(&reviews, ReviewSort::DateAsc)),
            vec!["old", "mid", "new"]
        );
    }

    #[test]
    fn test_review_sort_parse() {
        assert_eq!("rating-desc".parse::<ReviewSort>().unwrap(), ReviewSort::RatingDesc);
        assert_eq!(ReviewSort::DateAsc.to_string(), "date-asc");
        assert!("stars".parse::<ReviewSort>().is_err());
    }

    #[test]
    fn test_gallery_wraps() {
        let mut gallery = ImageGallery::new(vec!["a".into(), "b".into(), "c".into()]);

        assert_eq!(gallery.prev(), 2);
        assert_eq!(gallery.current_image(), Some("c"));

        let mut gallery = ImageGallery::new(vec!["a".into(), "b".into(), "c".into()]);
        gallery.next();
        gallery.next();
        assert_eq!(gallery.next(), 0);
    }

    #[test]
    fn test_gallery_placeholder_slot() {
        let mut gallery = ImageGallery::new(Vec::new());

        assert_eq!(gallery.slot_count(), 1);
        assert!(gallery.is_placeholder());
        assert_eq!(gallery.next(), 0);
        assert_eq!(gallery.prev(), 0);
        assert_eq!(gallery.current_image(), None);
    }

    #[test]
    fn test_gallery_select_ignores_out_of_range() {
        let mut gallery = ImageGallery::new(vec!["a".into(), "b".into()]);

        assert!(gallery.select(1));
        assert!(!gallery.select(5));
        assert_eq!(gallery.index(), 1);
    }

    #[tokio::test]
    async fn test_load_ready_resets_gallery() {
        let stub = Arc::new(StubNetwork::catalog(fake_products(3)));
        let controller = controller(&stub);

        assert_eq!(controller.load("1").await, FetchOutcome::Applied);
        controller.next_image();
        assert_eq!(controller.gallery().index(), 1);

        assert_eq!(controller.load("2").await, FetchOutcome::Applied);
        assert_eq!(controller.gallery().index(), 0);
        assert_eq!(controller.metadata().title, "Product 2");

        let reviews = controller.sorted_reviews(ReviewSort::RatingDesc);
        let ratings: Vec<f64> = reviews.iter().map(|r| r.rating).collect();
        assert_eq!(ratings, vec![5.0, 4.0, 2.0]);
    }

    #[tokio::test]
    async fn test_missing_product_is_failed_not_found() {
        let stub = Arc::new(StubNetwork::catalog(fake_products(3)));
        let controller = controller(&stub);

        assert_eq!(controller.load("missing-id").await, FetchOutcome::Failed);

        let state = controller.state();
        assert!(state.error().is_some_and(Error::is_not_found));
        let snapshot = controller.snapshot();
        assert!(snapshot.not_found);
        assert!(snapshot.detail.is_none());
        assert!(controller.sorted_reviews(ReviewSort::default()).is_empty());
        assert_eq!(
            controller.metadata(),
            PageMetadata {
                title: NOT_FOUND_TITLE.to_string(),
                description: NOT_FOUND_DESCRIPTION.to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_server_error_is_failed() {
        let stub = Arc::new(StubNetwork::new(|_| StubNetwork::json(500, json!({}))));
        let controller = controller(&stub);

        assert_eq!(controller.load("1").await, FetchOutcome::Failed);
        let snapshot = controller.snapshot();
        assert!(!snapshot.not_found);
        assert!(snapshot.error.unwrap().contains("500"));
    }

    #[tokio::test]
    async fn test_superseded_load_is_discarded() {
        let stub = Arc::new(StubNetwork::catalog(fake_products(3)));
        let controller = controller(&stub);
        let release = stub.hold("/products/1");

        let first = controller.load("1");
        let second = async {
            tokio::task::yield_now().await;
            let outcome = controller.load("2").await;
            let _ = release.send(());
            outcome
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first, FetchOutcome::Superseded);
        assert_eq!(second, FetchOutcome::Applied);
        assert_eq!(controller.detail().map(|d| d.summary.id), Some("2".to_string()));
    }
}
