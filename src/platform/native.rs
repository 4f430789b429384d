// src/platform/native.rs - Native network implementation on reqwest

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::platform::network::{NetworkBounds, NetworkProvider, NetworkRequest, NetworkResponse};

/// Native network implementation
#[derive(Debug, Clone)]
pub struct NativeNetwork {
    client: reqwest::Client,
}

impl NativeNetwork {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("storefront/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                Error::platform("native", "network", format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    /// Wraps an existing client (shared connection pool)
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl NetworkBounds for NativeNetwork {}

#[async_trait]
impl NetworkProvider for NativeNetwork {
    async fn request(&self, request: NetworkRequest) -> Result<NetworkResponse> {
        let mut req = match request.method.as_str() {
            "GET" => self.client.get(&request.url),
            "POST" => self.client.post(&request.url),
            "PUT" => self.client.put(&request.url),
            "DELETE" => self.client.delete(&request.url),
            _ => {
                return Err(Error::platform(
                    "native",
                    "network",
                    format!("Unsupported HTTP method: {}", request.method),
                ))
            }
        };

        for (key, value) in &request.headers {
            req = req.header(key, value);
        }

        if let Some(body) = request.body {
            req = req.body(body);
        }

        if let Some(timeout_ms) = request.timeout_ms {
            req = req.timeout(std::time::Duration::from_millis(timeout_ms));
        }

        let response = req.send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                format!("Request to {} timed out", request.url)
            } else {
                format!("HTTP request to {} failed: {}", request.url, e)
            };
            Error::unreachable(request.url.clone(), reason).caused_by(e)
        })?;

        let status_code = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| {
                Error::unreachable(
                    request.url.clone(),
                    format!("Failed to read response body: {}", e),
                )
            })?
            .to_vec();

        Ok(NetworkResponse {
            status_code,
            headers,
            body,
        })
    }
}
