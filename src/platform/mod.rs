// src/platform/mod.rs - Platform abstraction for outbound HTTP

#[cfg(not(target_arch = "wasm32"))]
pub mod native;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub mod network;

pub use network::{NetworkArc, NetworkBounds, NetworkProvider, NetworkRequest, NetworkResponse};

/// Creates the network provider for the current target
pub fn create_network() -> crate::error::Result<NetworkArc> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        Ok(std::sync::Arc::new(native::NativeNetwork::new()?))
    }

    #[cfg(target_arch = "wasm32")]
    {
        Ok(std::sync::Arc::new(web::FetchNetwork::new()))
    }
}

/// Name of the platform the crate was built for
pub fn platform_name() -> &'static str {
    if cfg!(target_arch = "wasm32") {
        "web"
    } else {
        "native"
    }
}
