//! Test doubles: an in-process axum catalog and a scripted `CatalogSource`.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use furnish_core::domain::product::{Product, ProductId};
use furnish_core::errors::FetchError;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use crate::http::CatalogSource;

pub fn product_json(id: &str, name: &str, price: &str, sale: Option<u8>) -> Value {
    let price: Value = serde_json::from_str(price).expect("price fixture should be a json number");
    let mut record = json!({
        "_id": id,
        "id": id,
        "name": name,
        "description": format!("{name} description"),
        "price": price,
        "rating": 4,
        "inStock": true,
        "image": format!("/images/{id}.png"),
    });
    if let Some(sale) = sale {
        record["sale"] = json!(sale);
    }
    record
}

pub fn product(id: &str, name: &str, cents: i64, sale_pct: Option<u8>) -> Product {
    Product {
        id: ProductId(id.to_owned()),
        external_id: None,
        name: name.to_owned(),
        description: String::new(),
        price: Decimal::new(cents, 2),
        rating: 3,
        in_stock: true,
        image: String::new(),
        sale_pct,
    }
}

pub fn showroom() -> Vec<Product> {
    vec![
        product("sofa", "Linen Sofa", 89_900, None),
        product("chair", "Oak Dining Chair", 10_000, Some(20)),
        product("lamp", "Brass Floor Lamp", 12_550, None),
        product("abc", "Oak Bookshelf", 45_000, Some(10)),
    ]
}

#[derive(Default)]
struct StubState {
    products: Mutex<Vec<Value>>,
    failure: Mutex<Option<StatusCode>>,
    collection_hits: AtomicUsize,
}

pub struct StubCatalog {
    address: SocketAddr,
    state: Arc<StubState>,
    server: JoinHandle<()>,
}

impl StubCatalog {
    pub async fn serve(products: Vec<Value>) -> Self {
        let state = Arc::new(StubState { products: Mutex::new(products), ..StubState::default() });
        let listener =
            tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("stub should bind");
        let address = listener.local_addr().expect("stub should expose its address");

        let router = Router::new()
            .route("/api/furniture", get(list))
            .route("/api/furniture/{id}", get(item))
            .with_state(Arc::clone(&state));
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self { address, state, server }
    }

    pub async fn unreachable_base_url() -> String {
        let listener =
            tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("probe should bind");
        let address = listener.local_addr().expect("probe should expose its address");
        drop(listener);
        format!("http://{address}/api")
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.address)
    }

    pub fn fail_with(&self, status: StatusCode) {
        *self.state.failure.lock().expect("stub lock") = Some(status);
    }

    pub fn recover(&self) {
        *self.state.failure.lock().expect("stub lock") = None;
    }

    pub fn collection_hits(&self) -> usize {
        self.state.collection_hits.load(Ordering::SeqCst)
    }
}

impl Drop for StubCatalog {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn list(State(state): State<Arc<StubState>>) -> Response {
    state.collection_hits.fetch_add(1, Ordering::SeqCst);
    if let Some(status) = *state.failure.lock().expect("stub lock") {
        return (status, "catalog unavailable").into_response();
    }
    let products = state.products.lock().expect("stub lock").clone();
    Json(Value::Array(products)).into_response()
}

async fn item(State(state): State<Arc<StubState>>, Path(id): Path<String>) -> Response {
    if let Some(status) = *state.failure.lock().expect("stub lock") {
        return (status, "catalog unavailable").into_response();
    }
    let products = state.products.lock().expect("stub lock");
    match products.iter().find(|product| product["_id"] == id) {
        Some(product) => Json(product.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// In-memory source with scripted failures, call counting and latency.
pub struct ScriptedSource {
    products: Vec<Product>,
    failures: Mutex<VecDeque<FetchError>>,
    latency: Duration,
    collection_calls: AtomicUsize,
    item_calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            failures: Mutex::new(VecDeque::new()),
            latency: Duration::ZERO,
            collection_calls: AtomicUsize::new(0),
            item_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn fail_next(&self, error: FetchError) {
        self.failures.lock().expect("script lock").push_back(error);
    }

    pub fn collection_calls(&self) -> usize {
        self.collection_calls.load(Ordering::SeqCst)
    }

    pub fn item_calls(&self) -> usize {
        self.item_calls.load(Ordering::SeqCst)
    }

    async fn respond(&self) -> Result<(), FetchError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        match self.failures.lock().expect("script lock").pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CatalogSource for ScriptedSource {
    async fn fetch_all(&self) -> Result<Vec<Product>, FetchError> {
        self.collection_calls.fetch_add(1, Ordering::SeqCst);
        self.respond().await?;
        Ok(self.products.clone())
    }

    async fn fetch_one(&self, id: &ProductId) -> Result<Product, FetchError> {
        self.item_calls.fetch_add(1, Ordering::SeqCst);
        self.respond().await?;
        self.products
            .iter()
            .find(|product| &product.id == id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound { id: id.clone() })
    }
}
