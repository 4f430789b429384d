// src/ui/mod.rs - Dioxus view layer for the storefront

pub mod app;
pub mod components;
pub mod pages;
pub mod router;
pub mod state;

pub use app::App;
pub use router::Route;
pub use state::{use_storefront, StorefrontContext, StorefrontProvider};
