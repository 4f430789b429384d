// src/ui/router.rs - Route table for the storefront pages

use std::fmt;

use dioxus::prelude::*;

use crate::catalog::query::{self, QueryParams};
use crate::ui::app::Shell;
use crate::ui::pages::{Home, NotFound, Product};

/// The listing's URL query as a route segment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery(pub QueryParams);

impl From<&str> for ListingQuery {
    fn from(query: &str) -> Self {
        Self(query::parse_query_string(query))
    }
}

impl fmt::Display for ListingQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&query::to_query_string(&self.0))
    }
}

#[derive(Clone, Routable, Debug, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Shell)]
        #[route("/?:..query")]
        Home { query: ListingQuery },
        #[route("/products/:id")]
        Product { id: String },
    #[end_layout]
    #[route("/:..segments")]
    NotFound { segments: Vec<String> },
}

impl Route {
    pub fn listing(params: QueryParams) -> Self {
        Self::Home {
            query: ListingQuery(params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_query_round_trip() {
        let query = ListingQuery::from("search=red%20shoe&page=2&sort=price-desc");
        assert_eq!(query.0.get("search").map(String::as_str), Some("red shoe"));
        assert_eq!(query.to_string(), "page=2&search=red%20shoe&sort=price-desc");
        assert_eq!(ListingQuery::from(query.to_string().as_str()), query);
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(ListingQuery::from(""), ListingQuery::default());
        assert_eq!(ListingQuery::default().to_string(), "");
    }
}
