// src/catalog/models.rs - Catalog records as delivered by the upstream API

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ProductId;
use crate::utils::div_ceil;

/// Product as shown in a listing grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    #[serde(deserialize_with = "de::id")]
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Stock availability of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    InStock(u32),
    OutOfStock,
}

impl ProductSummary {
    pub fn availability(&self) -> Availability {
        if self.stock > 0 {
            Availability::InStock(self.stock)
        } else {
            Availability::OutOfStock
        }
    }

    /// Whether the add-to-cart affordance should be enabled
    pub fn can_add_to_cart(&self) -> bool {
        self.stock > 0
    }

    /// Image for grid cards: thumbnail, else the first gallery image
    pub fn cover_image(&self) -> Option<&str> {
        self.thumbnail
            .as_deref()
            .or_else(|| self.images.first().map(String::as_str))
    }
}

/// Full product record for the detail view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub summary: ProductSummary,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Reviews that fail to parse are dropped with a warning
    #[serde(default, deserialize_with = "de::reviews")]
    pub reviews: Vec<Review>,
}

impl ProductDetail {
    /// Gives every review without an upstream id its position in the list.
    pub(crate) fn assign_review_ids(&mut self) {
        for (index, review) in self.reviews.iter_mut().enumerate() {
            if review.id.is_empty() {
                review.id = index.to_string();
            }
        }
    }
}

/// Customer review; never mutated, only re-ordered for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default, deserialize_with = "de::id")]
    pub id: String,
    #[serde(default, alias = "reviewerName", alias = "reviewer_name")]
    pub author: String,
    #[serde(deserialize_with = "de::date")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default, alias = "comment")]
    pub text: String,
}

/// One page of listing results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub items: Vec<ProductSummary>,
    pub total_count: u64,
    pub page_size: u32,
    /// Set when the upstream gave no total and returned a full page.
    #[serde(default)]
    pub has_more: bool,
}

impl PageResult {
    pub fn total_pages(&self) -> u32 {
        let pages = div_ceil(self.total_count, u64::from(self.page_size));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Highest page a caller may navigate to
    pub fn max_page(&self) -> u32 {
        let pages = self.total_pages().max(1);
        if self.has_more {
            pages.saturating_add(1)
        } else {
            pages
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Filled/empty pattern for a five-star rating display
pub fn star_fill(rating: f64) -> [bool; 5] {
    let mut stars = [false; 5];
    for (i, star) in stars.iter_mut().enumerate() {
        *star = (i as f64) < rating;
    }
    stars
}

mod de {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    use super::Review;

    const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
            return Some(date.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
            .map(|naive| naive.and_utc())
    }

    /// RFC 3339, or a zone-less date/time read as UTC
    pub fn date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_date(&raw).ok_or_else(|| D::Error::custom(format!("invalid review date '{}'", raw)))
    }

    pub fn reviews<'de, D>(deserializer: D) -> Result<Vec<Review>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
        Ok(raw
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value::<Review>(value) {
                Ok(review) => Some(review),
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping unreadable review");
                    None
                }
            })
            .collect())
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Unsigned(u64),
        Signed(i64),
        Float(f64),
        Text(String),
    }

    /// Accepts numeric or string ids
    pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match IdRepr::deserialize(deserializer)? {
            IdRepr::Unsigned(n) => n.to_string(),
            IdRepr::Signed(n) => n.to_string(),
            IdRepr::Float(n) => n.to_string(),
            IdRepr::Text(s) => s,
        })
    }
}
