// src/ui/app.rs - Root component and page shell

use dioxus::prelude::*;

use crate::ui::components::ErrorBanner;
use crate::ui::router::Route;
use crate::ui::state::{use_storefront, StorefrontProvider};

/// Main application component that sets up routing and the storefront context
#[component]
pub fn App() -> Element {
    rsx! {
        StorefrontProvider {
            Router::<Route> {}
        }
    }
}

/// Layout shared by the listing and detail pages
#[component]
pub fn Shell() -> Element {
    let context = use_storefront();

    rsx! {
        div {
            class: "min-h-screen bg-gray-50",
            header {
                class: "bg-white shadow-sm",
                div {
                    class: "max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 h-16 flex items-center",
                    Link {
                        to: Route::listing(Default::default()),
                        class: "text-xl font-bold text-gray-900 hover:text-blue-600",
                        "{context.ui.title}"
                    }
                }
            }
            main {
                class: "max-w-7xl mx-auto px-4 py-8 sm:px-6 lg:px-8",
                if let Some(message) = context.startup_error.clone() {
                    ErrorBanner { message }
                }
                Outlet::<Route> {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::components::StarRating;

    #[component]
    fn Harness() -> Element {
        rsx! {
            ErrorBanner { message: "unreachable catalog" }
            StarRating { rating: 3.5 }
        }
    }

    #[test]
    fn test_components_render_without_router() {
        let mut vdom = VirtualDom::new(Harness);
        vdom.rebuild_in_place();
    }
}
