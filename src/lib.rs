// src/lib.rs

//! Storefront - browse, filter, sort and page through a remote product catalog

#![deny(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::result_large_err)]
#![allow(clippy::large_enum_variant)]

#[cfg(all(target_arch = "wasm32", feature = "web"))]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    if let Err(e) = logging::init(&config::LoggingConfig::default()) {
        web_sys::console::error_1(&format!("Failed to set up tracing: {}", e).into());
    }

    dioxus::launch(ui::App);
}

pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod platform;
pub mod types;
pub mod utils;

#[cfg(feature = "ui")]
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;

pub use app::ApplicationCore;
pub use error::{Error, ErrorKind, Result, ResultExt};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    /// Binaries that pull in native-only crates must not build for wasm
    #[test]
    fn test_native_binaries_are_feature_gated() {
        let manifest: toml::Value = toml::from_str(include_str!("../Cargo.toml")).unwrap();
        let bins = manifest["bin"].as_array().unwrap();

        for (name, feature) in [("storefront", "cli"), ("storefront_desktop", "desktop")] {
            let bin = bins.iter().find(|b| b["name"].as_str() == Some(name)).unwrap();
            let required: Vec<&str> = bin["required-features"]
                .as_array()
                .unwrap()
                .iter()
                .filter_map(toml::Value::as_str)
                .collect();
            assert!(required.contains(&feature), "{} must require `{}`", name, feature);
        }
    }
}
