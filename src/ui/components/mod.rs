// src/ui/components/mod.rs - Reusable storefront components

use dioxus::prelude::*;

use crate::catalog::query::{Sort, SORT_OPTIONS};
use crate::catalog::{star_fill, Availability, ProductSummary};
use crate::ui::router::Route;

/// Free-text product search; submits on Enter or the button
#[component]
pub fn SearchBar(value: String, on_search: Callback<String>) -> Element {
    let mut draft = use_signal(|| value.clone());

    rsx! {
        form {
            class: "flex w-full max-w-xl",
            onsubmit: move |evt| {
                evt.prevent_default();
                on_search.call(draft().trim().to_string());
            },
            input {
                r#type: "search",
                name: "search",
                placeholder: "Search products...",
                value: "{draft}",
                class: "block w-full border-gray-300 rounded-l-md shadow-sm focus:ring-blue-500 focus:border-blue-500 sm:text-sm px-3 py-2 border",
                oninput: move |evt| draft.set(evt.value()),
            }
            button {
                r#type: "submit",
                class: "px-4 py-2 text-sm font-medium rounded-r-md text-white bg-blue-600 hover:bg-blue-700",
                "Search"
            }
        }
    }
}

/// Category and sort selectors
#[component]
pub fn FilterSort(
    categories: Vec<String>,
    category: String,
    #[props(!optional)] sort: Option<Sort>,
    on_category: Callback<String>,
    on_sort: Callback<Option<Sort>>,
    on_reset: Callback<()>,
) -> Element {
    let current_sort = sort.map(|s| s.to_string()).unwrap_or_default();
    let select_class = "border-gray-300 rounded-md shadow-sm text-sm px-3 py-2 border bg-white";

    rsx! {
        div {
            class: "flex flex-wrap items-center gap-3",
            select {
                class: select_class,
                value: "{category}",
                onchange: move |evt| on_category.call(evt.value()),
                option { value: "", "All categories" }
                for name in categories.iter() {
                    option {
                        key: "{name}",
                        value: "{name}",
                        selected: *name == category,
                        "{name}"
                    }
                }
            }
            select {
                class: select_class,
                value: "{current_sort}",
                onchange: move |evt| {
                    let value = evt.value();
                    on_sort.call(if value.is_empty() { None } else { value.parse().ok() });
                },
                option { value: "", "Featured" }
                for (value, label) in SORT_OPTIONS.iter() {
                    option {
                        key: "{value}",
                        value: "{value}",
                        selected: *value == current_sort,
                        "{label}"
                    }
                }
            }
            button {
                r#type: "button",
                class: "text-sm text-gray-600 hover:text-gray-900 underline",
                onclick: move |_| on_reset.call(()),
                "Clear filters"
            }
        }
    }
}

/// Page numbers to show around `current`, at most `width` of them
pub fn page_window(current: u32, max_page: u32, width: u32) -> Vec<u32> {
    let max_page = max_page.max(1);
    let width = width.clamp(1, max_page);
    let current = current.clamp(1, max_page);

    let half = width / 2;
    let start = current.saturating_sub(half).max(1).min(max_page - width + 1);
    (start..start + width).collect()
}

#[component]
pub fn Pagination(page: u32, max_page: u32, on_page: Callback<u32>) -> Element {
    if max_page <= 1 {
        return rsx! {};
    }

    let button_class = "px-3 py-1 text-sm rounded-md border border-gray-300 bg-white hover:bg-gray-50 disabled:opacity-50 disabled:cursor-not-allowed";

    rsx! {
        nav {
            class: "flex items-center justify-center gap-2 mt-8",
            button {
                class: button_class,
                disabled: page <= 1,
                onclick: move |_| on_page.call(page.saturating_sub(1)),
                "Previous"
            }
            for n in page_window(page, max_page, 5) {
                button {
                    key: "{n}",
                    class: if n == page {
                        "px-3 py-1 text-sm rounded-md border border-blue-600 bg-blue-600 text-white"
                    } else {
                        button_class
                    },
                    onclick: move |_| on_page.call(n),
                    "{n}"
                }
            }
            button {
                class: button_class,
                disabled: page >= max_page,
                onclick: move |_| on_page.call(page + 1),
                "Next"
            }
        }
    }
}

#[component]
pub fn StarRating(rating: f64) -> Element {
    let stars = star_fill(rating);

    rsx! {
        span {
            class: "inline-flex text-yellow-400",
            title: "{rating:.1} out of 5",
            for (i, filled) in stars.into_iter().enumerate() {
                span {
                    key: "{i}",
                    class: if filled { "text-yellow-400" } else { "text-gray-300" },
                    "★"
                }
            }
        }
    }
}

#[component]
pub fn ProductCard(product: ProductSummary) -> Element {
    let image = product.cover_image().map(str::to_string);
    let stock = match product.availability() {
        Availability::InStock(n) => format!("{} in stock", n),
        Availability::OutOfStock => "Out of stock".to_string(),
    };

    rsx! {
        Link {
            to: Route::Product { id: product.id.clone() },
            class: "group block bg-white rounded-lg shadow hover:shadow-md transition-shadow overflow-hidden",
            div {
                class: "aspect-square bg-gray-100",
                if let Some(src) = image {
                    img { src: "{src}", alt: "{product.title}", class: "w-full h-full object-cover" }
                }
            }
            div {
                class: "p-4 space-y-1",
                h3 { class: "text-sm font-medium text-gray-900 group-hover:text-blue-600", "{product.title}" }
                p { class: "text-xs text-gray-500 capitalize", "{product.category}" }
                div {
                    class: "flex items-center justify-between",
                    span { class: "text-lg font-semibold text-gray-900", "${product.price:.2}" }
                    StarRating { rating: product.rating }
                }
                p {
                    class: if product.can_add_to_cart() { "text-xs text-green-600" } else { "text-xs text-red-600" },
                    "{stock}"
                }
            }
        }
    }
}

#[component]
pub fn ProductGrid(items: Vec<ProductSummary>) -> Element {
    if items.is_empty() {
        return rsx! {
            p { class: "text-center text-gray-500 py-16", "No products match your filters." }
        };
    }

    rsx! {
        div {
            class: "grid grid-cols-1 gap-6 sm:grid-cols-2 lg:grid-cols-4",
            for product in items {
                ProductCard { key: "{product.id}", product: product.clone() }
            }
        }
    }
}

#[component]
pub fn ErrorBanner(message: String) -> Element {
    rsx! {
        div {
            class: "rounded-md bg-red-50 border border-red-200 p-4 text-sm text-red-700",
            role: "alert",
            "{message}"
        }
    }
}

#[component]
pub fn LoadingIndicator() -> Element {
    rsx! {
        div {
            class: "flex justify-center py-4 text-sm text-gray-500",
            "Loading..."
        }
    }
}
