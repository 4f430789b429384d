// src/ui/pages/not_found.rs - 404 page for unknown routes

use dioxus::prelude::*;

use crate::ui::router::Route;

#[component]
pub fn NotFound(segments: Vec<String>) -> Element {
    let path = segments.join("/");

    rsx! {
        document::Title { "Page Not Found" }
        div {
            class: "min-h-screen bg-white px-4 py-16 sm:px-6 sm:py-24 md:grid md:place-items-center lg:px-8",
            div {
                class: "max-w-max mx-auto sm:flex",
                p {
                    class: "text-4xl font-extrabold text-blue-600 sm:text-5xl",
                    "404"
                }
                div {
                    class: "sm:ml-6 sm:border-l sm:border-gray-200 sm:pl-6",
                    h1 {
                        class: "text-4xl font-extrabold text-gray-900 tracking-tight sm:text-5xl",
                        "Page not found"
                    }
                    p {
                        class: "mt-1 text-base text-gray-500",
                        "Sorry, we couldn't find the page you're looking for."
                    }
                    if !path.is_empty() {
                        p {
                            class: "mt-2 text-sm text-gray-400 font-mono bg-gray-100 px-2 py-1 rounded",
                            "Path: /{path}"
                        }
                    }
                    Link {
                        to: Route::listing(Default::default()),
                        class: "mt-10 inline-flex items-center px-4 py-2 text-sm font-medium rounded-md shadow-sm text-white bg-blue-600 hover:bg-blue-700",
                        "Browse products"
                    }
                }
            }
        }
    }
}
