// src/catalog/query.rs - Filter/sort/page state and its URL query representation

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// URL query parameters; ordered so encoding is deterministic
pub type QueryParams = BTreeMap<String, String>;

pub const KEY_SEARCH: &str = "search";
pub const KEY_CATEGORY: &str = "category";
pub const KEY_SORT: &str = "sort";
pub const KEY_SORT_BY: &str = "sortBy";
pub const KEY_SORT_ORDER: &str = "sortOrder";
pub const KEY_ORDER: &str = "order";
pub const KEY_PAGE: &str = "page";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseSortError {
    #[error("unknown sort order '{0}', expected 'asc' or 'desc'")]
    Order(String),
    #[error("sort field must not be empty")]
    EmptyField,
}

impl FromStr for SortOrder {
    type Err = ParseSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(ParseSortError::Order(other.to_string())),
        }
    }
}

/// Sort field plus direction, rendered as `<field>-<order>` in URLs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sort {
    pub by: String,
    pub order: SortOrder,
}

impl Sort {
    /// Surrounding whitespace is stripped from the field name
    pub fn new(by: impl Into<String>, order: SortOrder) -> Self {
        let by = by.into();
        Self {
            by: by.trim().to_string(),
            order,
        }
    }

    /// A sort needs a field name to be sent upstream or written to the URL
    pub fn is_valid(&self) -> bool {
        !self.by.trim().is_empty()
    }

    pub fn asc(by: impl Into<String>) -> Self {
        Self::new(by, SortOrder::Asc)
    }

    pub fn desc(by: impl Into<String>) -> Self {
        Self::new(by, SortOrder::Desc)
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.by, self.order)
    }
}

impl FromStr for Sort {
    type Err = ParseSortError;

    /// `price-desc` is price descending; a value without a recognised
    /// order suffix is a field sorted ascending.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some((field, order)) = s.rsplit_once('-') {
            if let Ok(order) = order.parse::<SortOrder>() {
                if field.is_empty() {
                    return Err(ParseSortError::EmptyField);
                }
                return Ok(Self::new(field, order));
            }
        }
        if s.is_empty() {
            return Err(ParseSortError::EmptyField);
        }
        Ok(Self::asc(s))
    }
}

/// Sort choices offered by the filter bar: (URL value, label)
pub const SORT_OPTIONS: &[(&str, &str)] = &[
    ("price-asc", "Price: Low to High"),
    ("price-desc", "Price: High to Low"),
    ("title-asc", "Title: A-Z"),
    ("title-desc", "Title: Z-A"),
];

/// The complete description of what the shopper wants to see
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub search: String,
    pub category: String,
    pub sort: Option<Sort>,
    #[serde(default = "first_page", deserialize_with = "page_at_least_one")]
    page: u32,
}

fn first_page() -> u32 {
    1
}

fn page_at_least_one<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(u32::deserialize(deserializer)?.max(1))
}

/// Drops sorts without a field and trims the rest
fn valid_sort(sort: Option<Sort>) -> Option<Sort> {
    sort.map(|s| Sort::new(s.by, s.order)).filter(Sort::is_valid)
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: String::new(),
            sort: None,
            page: 1,
        }
    }
}

impl FilterState {
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Sets the page, clamping to the first page
    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.set_page(page);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_sort(mut self, sort: Option<Sort>) -> Self {
        self.sort = valid_sort(sort);
        self
    }

    /// Merges a partial change. The page returns to 1 unless the change
    /// touches nothing but the page.
    pub fn apply(&mut self, change: FilterChange) {
        let page_only = change.is_page_only();

        if let Some(search) = change.search {
            self.search = search;
        }
        if let Some(category) = change.category {
            self.category = category;
        }
        if let Some(sort) = change.sort {
            self.sort = valid_sort(sort);
        }

        match (page_only, change.page) {
            (true, Some(page)) => self.set_page(page),
            _ => self.page = 1,
        }
    }

    /// Whether every field is at its default
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Partial update to a [`FilterState`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterChange {
    pub search: Option<String>,
    pub category: Option<String>,
    /// `Some(None)` clears the sort
    pub sort: Option<Option<Sort>>,
    pub page: Option<u32>,
}

impl FilterChange {
    pub fn search(search: impl Into<String>) -> Self {
        Self {
            search: Some(search.into()),
            ..Self::default()
        }
    }

    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    /// An empty sort field counts as clearing the sort
    pub fn sort(sort: Option<Sort>) -> Self {
        Self {
            sort: Some(valid_sort(sort)),
            ..Self::default()
        }
    }

    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }

    pub fn is_page_only(&self) -> bool {
        self.page.is_some()
            && self.search.is_none()
            && self.category.is_none()
            && self.sort.is_none()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Renders a filter state as URL query parameters, omitting empty values.
pub fn encode(state: &FilterState) -> QueryParams {
    let mut params = QueryParams::new();

    if !state.search.is_empty() {
        params.insert(KEY_SEARCH.to_string(), state.search.clone());
    }
    if !state.category.is_empty() {
        params.insert(KEY_CATEGORY.to_string(), state.category.clone());
    }
    if let Some(sort) = state.sort.as_ref().filter(|s| s.is_valid()) {
        params.insert(KEY_SORT.to_string(), sort.to_string());
    }
    params.insert(KEY_PAGE.to_string(), state.page.to_string());

    params
}

/// Reads a filter state from URL query parameters. Never fails: anything
/// missing or malformed falls back to its default.
pub fn decode(params: &QueryParams) -> FilterState {
    let sort = match non_empty(params, KEY_SORT) {
        Some(combined) => combined.parse::<Sort>().ok(),
        None => non_empty(params, KEY_SORT_BY).map(|by| {
            let order = non_empty(params, KEY_SORT_ORDER)
                .or_else(|| non_empty(params, KEY_ORDER))
                .and_then(|o| o.parse::<SortOrder>().ok())
                .unwrap_or_default();
            Sort::new(by, order)
        }),
    }
    .filter(Sort::is_valid);

    let page = non_empty(params, KEY_PAGE)
        .and_then(|p| p.parse::<u32>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1);

    FilterState {
        search: params.get(KEY_SEARCH).cloned().unwrap_or_default(),
        category: params.get(KEY_CATEGORY).cloned().unwrap_or_default(),
        sort,
        page,
    }
}

/// Renders parameters as `key=value&...` with percent-encoding
pub fn to_query_string(params: &QueryParams) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Parses `?key=value&...`; `+` is read as a space and undecodable
/// pairs are kept verbatim. Later duplicates win.
pub fn parse_query_string(query: &str) -> QueryParams {
    let query = query.trim().trim_start_matches('?');
    let mut params = QueryParams::new();

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(key);
        if key.is_empty() {
            continue;
        }
        params.insert(key, decode_component(value));
    }

    params
}

fn non_empty<'a>(params: &'a QueryParams, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_encode_omits_empty_fields() {
        let encoded = encode(&FilterState::default());
        assert_eq!(encoded, params(&[("page", "1")]));
    }

    #[test]
    fn test_encode_full_state() {
        let state = FilterState::default()
            .with_search("shoe")
            .with_category("footwear")
            .with_sort(Some(Sort::desc("price")))
            .with_page(3);

        assert_eq!(
            encode(&state),
            params(&[
                ("category", "footwear"),
                ("page", "3"),
                ("search", "shoe"),
                ("sort", "price-desc"),
            ])
        );
    }

    #[test]
    fn test_round_trip() {
        let states = [
            FilterState::default(),
            FilterState::default().with_search("red dress"),
            FilterState::default()
                .with_category("home-decoration")
                .with_sort(Some(Sort::asc("title")))
                .with_page(7),
            FilterState::default().with_sort(Some(Sort::desc("rating"))),
        ];

        for state in states {
            assert_eq!(decode(&encode(&state)), state);
        }
    }

    #[test]
    fn test_decode_defaults() {
        let state = decode(&QueryParams::new());
        assert_eq!(state, FilterState::default());
        assert_eq!(state.page(), 1);
        assert!(state.sort.is_none());
    }

    #[test]
    fn test_decode_malformed_page_is_first_page() {
        for bad in ["abc", "0", "-2", "", "1.5"] {
            assert_eq!(decode(&params(&[("page", bad)])).page(), 1, "page={bad}");
        }
    }

    #[test]
    fn test_decode_legacy_sort_keys() {
        let state = decode(&params(&[("sortBy", "price"), ("sortOrder", "desc")]));
        assert_eq!(state.sort, Some(Sort::desc("price")));

        let state = decode(&params(&[("sortBy", "title"), ("order", "asc")]));
        assert_eq!(state.sort, Some(Sort::asc("title")));

        let state = decode(&params(&[("sortBy", "title")]));
        assert_eq!(state.sort, Some(Sort::asc("title")));
    }

    #[test]
    fn test_combined_sort_wins_over_legacy() {
        let state = decode(&params(&[("sort", "title-desc"), ("sortBy", "price")]));
        assert_eq!(state.sort, Some(Sort::desc("title")));
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!("price-asc".parse::<Sort>(), Ok(Sort::asc("price")));
        assert_eq!("discount-percentage-desc".parse::<Sort>(), Ok(Sort::desc("discount-percentage")));
        assert_eq!("price_asc".parse::<Sort>(), Ok(Sort::asc("price_asc")));
        assert_eq!("-desc".parse::<Sort>(), Err(ParseSortError::EmptyField));
        assert!("sideways".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_apply_resets_page() {
        let mut state = FilterState::default().with_page(4);
        state.apply(FilterChange::search("lamp"));
        assert_eq!(state.page(), 1);
        assert_eq!(state.search, "lamp");

        let mut state = FilterState::default().with_page(4);
        state.apply(FilterChange {
            category: Some("lighting".to_string()),
            page: Some(3),
            ..FilterChange::default()
        });
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_apply_page_only_keeps_filters() {
        let mut state = FilterState::default()
            .with_search("lamp")
            .with_sort(Some(Sort::asc("price")));
        state.apply(FilterChange::page(5));
        assert_eq!(state.page(), 5);
        assert_eq!(state.search, "lamp");
        assert_eq!(state.sort, Some(Sort::asc("price")));
    }

    #[test]
    fn test_apply_clears_sort() {
        let mut state = FilterState::default().with_sort(Some(Sort::asc("price")));
        state.apply(FilterChange::sort(None));
        assert!(state.sort.is_none());
    }

    #[test]
    fn test_page_never_below_one() {
        let state = FilterState::default().with_page(0);
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_deserialized_page_is_clamped() {
        let state: FilterState =
            serde_json::from_str(r#"{"search":"","category":"","sort":null,"page":0}"#).unwrap();
        assert_eq!(state.page(), 1);

        let state: FilterState =
            serde_json::from_str(r#"{"search":"lamp","category":"","sort":null}"#).unwrap();
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_sort_field_is_trimmed_and_required() {
        assert_eq!(Sort::asc(" price "), Sort::asc("price"));

        let state = FilterState::default().with_sort(Some(Sort::asc(" price")));
        assert_eq!(decode(&encode(&state)), state);

        let state = FilterState::default().with_sort(Some(Sort::asc("")));
        assert!(state.sort.is_none());
        assert_eq!(decode(&encode(&state)), state);

        assert_eq!(FilterChange::sort(Some(Sort::desc("  "))), FilterChange::sort(None));
        assert!(decode(&params(&[("sortBy", " "), ("order", "desc")])).sort.is_none());
    }

    #[test]
    fn test_query_string_round_trip() {
        let original = params(&[("search", "red & blue"), ("category", "mens-shirts"), ("page", "2")]);
        let rendered = to_query_string(&original);
        assert!(rendered.contains("search=red%20%26%20blue"));
        assert_eq!(parse_query_string(&rendered), original);
    }

    #[test]
    fn test_parse_query_string_variants() {
        let parsed = parse_query_string("?search=running+shoe&page=2&flag&=orphan");
        assert_eq!(parsed.get("search").map(String::as_str), Some("running shoe"));
        assert_eq!(parsed.get("page").map(String::as_str), Some("2"));
        assert_eq!(parsed.get("flag").map(String::as_str), Some(""));
        assert_eq!(parsed.len(), 3);
    }
}
