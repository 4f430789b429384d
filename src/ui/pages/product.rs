// src/ui/pages/product.rs - Product detail page with gallery and reviews

use std::sync::Arc;

use dioxus::prelude::*;

use crate::catalog::detail::{NOT_FOUND_DESCRIPTION, NOT_FOUND_TITLE};
use crate::catalog::{sort_reviews, Availability, DetailSnapshot, ProductDetail, Review, ReviewSort};
use crate::ui::components::{ErrorBanner, LoadingIndicator, StarRating};
use crate::ui::router::Route;
use crate::ui::state::use_storefront;

#[component]
pub fn Product(id: String) -> Element {
    let context = use_storefront();
    let controller = use_signal({
        let core = context.core.clone();
        move || core.map(|core| Arc::new(core.detail()))
    });
    let mut snapshot = use_signal(|| None::<DetailSnapshot>);
    let review_sort = use_signal(ReviewSort::default);

    use_effect(use_reactive((&id,), move |(id,)| {
        let Some(detail) = controller.peek().as_ref().cloned() else {
            return;
        };
        snapshot.set(Some(DetailSnapshot {
            loading: true,
            ..detail.snapshot()
        }));
        spawn(async move {
            let outcome = detail.load(&id).await;
            tracing::debug!(id = %id, ?outcome, "product load settled");
            snapshot.set(Some(detail.snapshot()));
        });
    }));

    let Some(detail) = controller() else {
        return rsx! {};
    };
    let metadata = detail.metadata();
    let view = snapshot();

    let body = match view {
        None => rsx! { LoadingIndicator {} },
        Some(DetailSnapshot { loading: true, .. }) => rsx! { LoadingIndicator {} },
        Some(DetailSnapshot { not_found: true, .. }) => rsx! { ProductNotFound {} },
        Some(DetailSnapshot {
            detail: Some(product),
            image_index,
            ..
        }) => rsx! {
            ProductView {
                product,
                image_index,
                placeholder: context.ui.placeholder_image.clone(),
                review_sort,
                on_image: move |step: GalleryStep| {
                    if let Some(detail) = controller.peek().as_ref() {
                        match step {
                            GalleryStep::Next => { detail.next_image(); }
                            GalleryStep::Prev => { detail.prev_image(); }
                            GalleryStep::Select(index) => { detail.select_image(index); }
                        }
                        snapshot.set(Some(detail.snapshot()));
                    }
                },
            }
        },
        Some(DetailSnapshot { error, .. }) => rsx! {
            ErrorBanner {
                message: error.unwrap_or_else(|| "Failed to load product".to_string()),
            }
            BackLink {}
        },
    };

    rsx! {
        document::Title { "{metadata.title}" }
        document::Meta { name: "description", content: metadata.description.clone() }
        {body}
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GalleryStep {
    Next,
    Prev,
    Select(usize),
}

#[component]
fn ProductView(
    product: ProductDetail,
    image_index: usize,
    placeholder: String,
    review_sort: Signal<ReviewSort>,
    on_image: Callback<GalleryStep>,
) -> Element {
    let summary = &product.summary;
    let image = summary
        .images
        .get(image_index)
        .cloned()
        .unwrap_or_else(|| placeholder.clone());
    let stock = match summary.availability() {
        Availability::InStock(n) => format!("{} in stock", n),
        Availability::OutOfStock => "Out of stock".to_string(),
    };
    let reviews = sort_reviews(&product.reviews, review_sort());
    let multiple = summary.images.len() > 1;

    rsx! {
        BackLink {}
        div {
            class: "mt-4 grid grid-cols-1 gap-8 lg:grid-cols-2",
            div {
                class: "space-y-4",
                div {
                    class: "relative aspect-square bg-gray-100 rounded-lg overflow-hidden",
                    img { src: "{image}", alt: "{summary.title}", class: "w-full h-full object-contain" }
                    if multiple {
                        button {
                            class: "absolute left-2 top-1/2 -translate-y-1/2 rounded-full bg-white/80 px-3 py-1 shadow",
                            onclick: move |_| on_image.call(GalleryStep::Prev),
                            "‹"
                        }
                        button {
                            class: "absolute right-2 top-1/2 -translate-y-1/2 rounded-full bg-white/80 px-3 py-1 shadow",
                            onclick: move |_| on_image.call(GalleryStep::Next),
                            "›"
                        }
                    }
                }
                if multiple {
                    div {
                        class: "flex gap-2 overflow-x-auto",
                        for (index, src) in summary.images.iter().enumerate() {
                            button {
                                key: "{index}",
                                class: if index == image_index { "w-16 h-16 rounded border-2 border-blue-600" } else { "w-16 h-16 rounded border border-gray-200" },
                                onclick: move |_| on_image.call(GalleryStep::Select(index)),
                                img { src: "{src}", class: "w-full h-full object-cover" }
                            }
                        }
                    }
                }
            }
            div {
                class: "space-y-4",
                h1 { class: "text-3xl font-bold text-gray-900", "{summary.title}" }
                div {
                    class: "flex items-center gap-2 text-sm text-gray-600",
                    StarRating { rating: summary.rating }
                    span { "{summary.rating:.1}" }
                }
                p { class: "text-2xl font-semibold text-gray-900", "${summary.price:.2}" }
                p { class: "text-sm text-gray-500 capitalize", "{summary.category}" }
                if let Some(brand) = product.brand.clone() {
                    p { class: "text-sm text-gray-500", "Brand: {brand}" }
                }
                p { class: "text-gray-700", "{product.description}" }
                if !product.tags.is_empty() {
                    div {
                        class: "flex flex-wrap gap-2",
                        for tag in product.tags.iter() {
                            span { key: "{tag}", class: "rounded-full bg-gray-100 px-2 py-0.5 text-xs text-gray-600", "{tag}" }
                        }
                    }
                }
                p {
                    class: if summary.can_add_to_cart() { "text-sm text-green-600" } else { "text-sm text-red-600" },
                    "{stock}"
                }
                button {
                    class: "w-full rounded-md bg-blue-600 px-4 py-3 text-white font-medium hover:bg-blue-700 disabled:bg-gray-300 disabled:cursor-not-allowed",
                    disabled: !summary.can_add_to_cart(),
                    "Add to cart"
                }
            }
        }
        ReviewList { reviews, review_sort }
    }
}

#[component]
fn ReviewList(reviews: Vec<Review>, review_sort: Signal<ReviewSort>) -> Element {
    let mut review_sort = review_sort;
    let selected = review_sort().as_str();
    let count = reviews.len();

    rsx! {
        section {
            class: "mt-12 space-y-4",
            div {
                class: "flex items-center justify-between",
                h2 { class: "text-xl font-semibold text-gray-900", "Reviews ({count})" }
                select {
                    class: "border-gray-300 rounded-md text-sm px-3 py-2 border bg-white",
                    value: selected,
                    onchange: move |evt| {
                        if let Ok(sort) = evt.value().parse::<ReviewSort>() {
                            review_sort.set(sort);
                        }
                    },
                    for (index, sort) in ReviewSort::ALL.into_iter().enumerate() {
                        option {
                            key: "{index}",
                            value: sort.as_str(),
                            selected: sort.as_str() == selected,
                            {sort.label()}
                        }
                    }
                }
            }
            if reviews.is_empty() {
                p { class: "text-sm text-gray-500", "No reviews yet." }
            }
            for review in reviews.iter() {
                article {
                    key: "{review.id}",
                    class: "rounded-lg bg-white p-4 shadow-sm",
                    div {
                        class: "flex items-center justify-between",
                        span { class: "font-medium text-gray-900", "{review.author}" }
                        span { class: "text-xs text-gray-500", {review.date.format("%Y-%m-%d").to_string()} }
                    }
                    StarRating { rating: review.rating }
                    if !review.text.is_empty() {
                        p { class: "mt-2 text-sm text-gray-700", "{review.text}" }
                    }
                }
            }
        }
    }
}

#[component]
fn BackLink() -> Element {
    rsx! {
        Link {
            to: Route::listing(Default::default()),
            class: "text-sm text-blue-600 hover:text-blue-800",
            "‹ Back to products"
        }
    }
}

#[component]
fn ProductNotFound() -> Element {
    rsx! {
        div {
            class: "text-center py-16 space-y-4",
            h1 { class: "text-2xl font-bold text-gray-900", {NOT_FOUND_TITLE} }
            p { class: "text-gray-500", {NOT_FOUND_DESCRIPTION} }
            BackLink {}
        }
    }
}
