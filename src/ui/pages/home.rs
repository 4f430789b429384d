// src/ui/pages/home.rs - Product listing with search, filters, sort and pagination

use std::sync::Arc;

use dioxus::prelude::*;

use crate::app::ApplicationCore;
use crate::catalog::query::{decode, QueryParams};
use crate::catalog::{FilterChange, ListingController, ListingSnapshot, Sort};
use crate::ui::components::{
    ErrorBanner, FilterSort, LoadingIndicator, Pagination, ProductGrid, SearchBar,
};
use crate::ui::router::{ListingQuery, Route};
use crate::ui::state::{use_storefront, RouterQuerySync};

/// User intents the listing page forwards to its controller
#[derive(Debug, Clone)]
enum ListingAction {
    Change(FilterChange),
    Page(u32),
    Reset,
}

fn build_controller(
    core: &ApplicationCore,
    params: &QueryParams,
    pending: SyncSignal<Option<QueryParams>>,
) -> Arc<ListingController> {
    Arc::new(core.listing_with_sync(params, Arc::new(RouterQuerySync::new(pending))))
}

/// Runs `action` and publishes the controller's state once it settles.
fn dispatch(
    controller: Signal<Option<Arc<ListingController>>>,
    mut snapshot: Signal<Option<ListingSnapshot>>,
    action: ListingAction,
) {
    let Some(listing) = controller.peek().as_ref().cloned() else {
        return;
    };

    spawn(async move {
        if let Some(current) = &mut *snapshot.write() {
            current.loading = true;
        }
        let outcome = match action {
            ListingAction::Change(change) => listing.apply_filter_change(change).await,
            ListingAction::Page(page) => listing.change_page(page).await,
            ListingAction::Reset => listing.reset().await,
        };
        tracing::debug!(?outcome, "listing action settled");
        publish(controller, snapshot, &listing);
    });
}

/// Publishes `listing` unless a newer controller has replaced it
fn publish(
    controller: Signal<Option<Arc<ListingController>>>,
    mut snapshot: Signal<Option<ListingSnapshot>>,
    listing: &Arc<ListingController>,
) {
    let current = controller
        .peek()
        .as_ref()
        .is_some_and(|active| Arc::ptr_eq(active, listing));
    if current {
        snapshot.set(Some(listing.snapshot()));
    }
}

#[component]
pub fn Home(query: ListingQuery) -> Element {
    let context = use_storefront();
    let navigator = use_navigator();
    let pending = use_signal_sync(|| None::<QueryParams>);

    let controller = use_signal({
        let core = context.core.clone();
        let params = query.0.clone();
        move || core.map(|core| build_controller(&core, &params, pending))
    });
    let snapshot = use_signal(|| {
        controller
            .peek()
            .as_ref()
            .map(|listing| listing.snapshot())
    });
    let mut started = use_signal(|| false);

    // Filter changes made here are pushed into the router history
    use_effect(move || {
        if let Some(params) = pending() {
            navigator.push(Route::listing(params));
        }
    });

    // First load, and reloads when the URL changes underneath us (back/forward)
    let core = context.core.clone();
    use_effect(use_reactive((&query,), move |(query,)| {
        let (Some(core), Some(active)) = (core.clone(), controller.peek().as_ref().cloned()) else {
            return;
        };
        let first = !*started.peek();
        if !first && active.filters() == decode(&query.0) {
            return;
        }
        started.set(true);

        let listing = if first {
            active
        } else {
            tracing::debug!(query = %query, "url changed, rebuilding listing");
            let fresh = build_controller(&core, &query.0, pending);
            let mut controller = controller;
            controller.set(Some(fresh.clone()));
            fresh
        };

        let mut snapshot = snapshot;
        spawn(async move {
            if let Some(current) = &mut *snapshot.write() {
                current.loading = true;
            }
            let _ = futures::join!(listing.load(), listing.load_categories());
            publish(controller, snapshot, &listing);
        });
    }));

    let Some(view) = snapshot() else {
        return rsx! {};
    };

    let page = view.filters.page();
    let category = view.filters.category.clone();
    let sort = view.filters.sort.clone();

    rsx! {
        div {
            class: "space-y-6",
            div {
                class: "flex flex-col gap-4 md:flex-row md:items-center md:justify-between",
                SearchBar {
                    key: "{view.filters.search}",
                    value: view.filters.search.clone(),
                    on_search: move |search: String| {
                        dispatch(controller, snapshot, ListingAction::Change(FilterChange::search(search)))
                    },
                }
                FilterSort {
                    categories: view.categories.clone(),
                    category,
                    sort,
                    on_category: move |category: String| {
                        dispatch(controller, snapshot, ListingAction::Change(FilterChange::category(category)))
                    },
                    on_sort: move |sort: Option<Sort>| {
                        dispatch(controller, snapshot, ListingAction::Change(FilterChange::sort(sort)))
                    },
                    on_reset: move |_| dispatch(controller, snapshot, ListingAction::Reset),
                }
            }

            if let Some(message) = view.error.clone() {
                ErrorBanner { message }
            }

            p {
                class: "text-sm text-gray-500",
                "{view.total_count} products"
            }

            if view.loading {
                LoadingIndicator {}
            }

            ProductGrid { items: view.items.clone() }

            Pagination {
                page,
                max_page: view.max_page,
                on_page: move |page: u32| dispatch(controller, snapshot, ListingAction::Page(page)),
            }
        }
    }
}
