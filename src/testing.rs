// src/testing.rs - In-memory network stub and fake catalog for unit tests

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::catalog::query::parse_query_string;
use crate::error::Result;
use crate::platform::network::{NetworkBounds, NetworkProvider, NetworkRequest, NetworkResponse};

type Responder = dyn Fn(&NetworkRequest) -> Result<NetworkResponse> + Send + Sync;

/// Network provider answering from a closure and recording every request.
///
/// Requests whose URL matches a registered hold are parked until the
/// matching sender fires, which lets tests complete requests out of order.
pub struct StubNetwork {
    responder: Box<Responder>,
    requests: Mutex<Vec<NetworkRequest>>,
    holds: Mutex<Vec<(String, oneshot::Receiver<()>)>>,
}

impl StubNetwork {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&NetworkRequest) -> Result<NetworkResponse> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
            holds: Mutex::new(Vec::new()),
        }
    }

    /// Serves `/products`, `/products/{id}` and `/categories` from `products`
    pub fn catalog(products: Vec<Value>) -> Self {
        let products = Arc::new(products);
        Self::new(move |request| Ok(serve_catalog(&products, &request.url)))
    }

    pub fn json(status_code: u16, body: Value) -> Result<NetworkResponse> {
        Ok(NetworkResponse {
            status_code,
            headers: Default::default(),
            body: body.to_string().into_bytes(),
        })
    }

    pub fn raw(status_code: u16, body: &[u8]) -> Result<NetworkResponse> {
        Ok(NetworkResponse {
            status_code,
            headers: Default::default(),
            body: body.to_vec(),
        })
    }

    /// Parks the next request whose URL contains `pattern` until the
    /// returned sender fires (or is dropped).
    pub fn hold(&self, pattern: impl Into<String>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.holds.lock().push((pattern.into(), rx));
        tx
    }

    pub fn requests(&self) -> Vec<NetworkRequest> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<NetworkRequest> {
        self.requests.lock().last().cloned()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn take_hold(&self, url: &str) -> Option<oneshot::Receiver<()>> {
        let mut holds = self.holds.lock();
        let index = holds.iter().position(|(pattern, _)| url.contains(pattern))?;
        Some(holds.remove(index).1)
    }
}

impl NetworkBounds for StubNetwork {}

#[async_trait::async_trait]
impl NetworkProvider for StubNetwork {
    async fn request(&self, request: NetworkRequest) -> Result<NetworkResponse> {
        self.requests.lock().push(request.clone());

        if let Some(release) = self.take_hold(&request.url) {
            let _ = release.await;
        }

        (self.responder)(&request)
    }
}

/// `count` products with ids `1..=count`
pub fn fake_products(count: usize) -> Vec<Value> {
    const CATEGORIES: [&str; 3] = ["beauty", "laptops", "groceries"];

    (1..=count)
        .map(|i| {
            json!({
                "id": i,
                "title": format!("Product {}", i),
                "price": 5.0 + i as f64,
                "category": CATEGORIES[i % CATEGORIES.len()],
                "rating": (i % 5) as f64 + 0.5,
                "stock": i % 4,
                "images": [format!("https://img.test/{}/1.jpg", i), format!("https://img.test/{}/2.jpg", i)],
                "thumbnail": format!("https://img.test/{}/thumb.jpg", i),
            })
        })
        .collect()
}

fn serve_catalog(products: &[Value], url: &str) -> NetworkResponse {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));

    let response = if path.ends_with("/categories") {
        StubNetwork::json(200, json!(["beauty", "laptops", "groceries"]))
    } else if let Some(id) = path.split("/products/").nth(1) {
        match products.iter().find(|p| p["id"].to_string() == id) {
            Some(product) => StubNetwork::json(200, detail_for(product)),
            None => StubNetwork::json(404, json!({ "message": "not found" })),
        }
    } else if path.ends_with("/products") {
        let params = parse_query_string(query);
        let number = |key: &str, default: usize| {
            params
                .get(key)
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(default)
        };
        let skip = number("skip", 0).min(products.len());
        let limit = number("limit", 20);
        let end = (skip + limit).min(products.len());

        StubNetwork::json(
            200,
            json!({ "products": &products[skip..end], "total": products.len() }),
        )
    } else {
        StubNetwork::json(404, json!({}))
    };

    response.unwrap_or_else(|e| NetworkResponse {
        status_code: 500,
        headers: Default::default(),
        body: e.to_string().into_bytes(),
    })
}

fn detail_for(product: &Value) -> Value {
    let mut detail = product.clone();
    detail["description"] = json!("A fake product for tests");
    detail["tags"] = json!(["fake", "test"]);
    detail["reviews"] = json!([
        { "rating": 2, "comment": "Meh", "date": "2024-05-20T08:00:00Z", "reviewerName": "Ann" },
        { "rating": 5, "comment": "Great", "date": "2024-05-22T08:00:00Z", "reviewerName": "Ben" },
        { "rating": 4, "comment": "Good", "date": "2024-05-21T08:00:00Z", "reviewerName": "Cy" },
    ]);
    detail
}
