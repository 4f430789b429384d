// src/platform/web.rs - Browser Fetch API network implementation

use std::collections::HashMap;

use async_trait::async_trait;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

use crate::error::{Error, Result};
use crate::platform::network::{NetworkBounds, NetworkProvider, NetworkRequest, NetworkResponse};

/// Fetch API network implementation
///
/// The browser applies its own timeouts; `timeout_ms` is not enforced here.
#[derive(Debug, Default)]
pub struct FetchNetwork;

impl FetchNetwork {
    pub fn new() -> Self {
        Self
    }
}

impl NetworkBounds for FetchNetwork {}

#[async_trait(?Send)]
impl NetworkProvider for FetchNetwork {
    async fn request(&self, request: NetworkRequest) -> Result<NetworkResponse> {
        let window = web_sys::window()
            .ok_or_else(|| Error::platform("web", "network", "No window object available"))?;

        let opts = RequestInit::new();
        opts.set_method(&request.method);

        if let Some(body) = &request.body {
            let uint8_array = js_sys::Uint8Array::from(&body[..]);
            opts.set_body(&uint8_array);
        }

        let req = Request::new_with_str_and_init(&request.url, &opts).map_err(|e| {
            Error::platform("web", "network", format!("Failed to create request: {:?}", e))
        })?;

        for (key, value) in &request.headers {
            req.headers().set(key, value).map_err(|e| {
                Error::platform("web", "network", format!("Failed to set header: {:?}", e))
            })?;
        }

        let response_value = JsFuture::from(window.fetch_with_request(&req))
            .await
            .map_err(|e| Error::unreachable(request.url.clone(), format!("Fetch failed: {:?}", e)))?;

        let response: Response = response_value.dyn_into().map_err(|_| {
            Error::platform("web", "network", "Fetch resolved to a non-Response value")
        })?;
        let status_code = response.status();

        let buffer_promise = response.array_buffer().map_err(|e| {
            Error::unreachable(request.url.clone(), format!("Failed to read response body: {:?}", e))
        })?;
        let body = JsFuture::from(buffer_promise).await.map_err(|e| {
            Error::unreachable(request.url.clone(), format!("Failed to read response body: {:?}", e))
        })?;

        Ok(NetworkResponse {
            status_code,
            headers: HashMap::new(),
            body: js_sys::Uint8Array::new(&body).to_vec(),
        })
    }
}
