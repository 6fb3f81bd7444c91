use std::time::Duration;

use async_trait::async_trait;
use furnish_core::config::CatalogConfig;
use furnish_core::domain::product::{decode_catalog, decode_product, Product, ProductId};
use furnish_core::errors::FetchError;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, info, warn};

const COLLECTION_PATH: &str = "furniture";

/// Read access to the remote catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Product>, FetchError>;
    async fn fetch_one(&self, id: &ProductId) -> Result<Product, FetchError>;
}

#[derive(Clone, Debug)]
pub struct HttpCatalog {
    client: Client,
    collection_url: Url,
}

impl HttpCatalog {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let collection_url = collection_url(base_url)?;
        let client = Client::builder().timeout(timeout).build().map_err(|error| {
            FetchError::Transport { message: format!("failed to build http client: {error}") }
        })?;

        Ok(Self { client, collection_url })
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self, FetchError> {
        Self::new(&config.base_url, config.timeout())
    }

    pub fn collection_url(&self) -> &Url {
        &self.collection_url
    }

    pub fn item_url(&self, id: &ProductId) -> Result<Url, FetchError> {
        let mut url = self.collection_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::Transport {
                message: format!("catalog url `{}` cannot carry a path", self.collection_url),
            })?
            .push(id.as_str());
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<(StatusCode, Vec<u8>), FetchError> {
        debug!(event_name = "catalog.http.request", url = %url, "issuing catalog request");

        let response = self.client.get(url.clone()).send().await.map_err(|error| {
            warn!(
                event_name = "catalog.http.transport_failed",
                url = %url,
                error = %error,
                "catalog request failed before a response arrived"
            );
            FetchError::Transport { message: error.to_string() }
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| FetchError::Transport { message: error.to_string() })?;

        Ok((status, body.to_vec()))
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn fetch_all(&self) -> Result<Vec<Product>, FetchError> {
        let (status, body) = self.get(self.collection_url.clone()).await?;
        if !status.is_success() {
            warn!(
                event_name = "catalog.http.status_failed",
                status = status.as_u16(),
                "catalog collection request returned non-success status"
            );
            return Err(FetchError::Status { status: status.as_u16() });
        }

        let products = decode_catalog(&body).map_err(|error| {
            warn!(event_name = "catalog.http.decode_failed", error = %error, "catalog body rejected");
            FetchError::from(error)
        })?;

        info!(
            event_name = "catalog.http.collection_loaded",
            product_count = products.len(),
            "catalog collection loaded"
        );
        Ok(products)
    }

    async fn fetch_one(&self, id: &ProductId) -> Result<Product, FetchError> {
        let (status, body) = self.get(self.item_url(id)?).await?;
        if status == StatusCode::NOT_FOUND {
            info!(event_name = "catalog.http.item_missing", product_id = %id, "catalog item not found");
            return Err(FetchError::NotFound { id: id.clone() });
        }
        if !status.is_success() {
            warn!(
                event_name = "catalog.http.status_failed",
                product_id = %id,
                status = status.as_u16(),
                "catalog item request returned non-success status"
            );
            return Err(FetchError::Status { status: status.as_u16() });
        }

        let product = decode_product(&body).map_err(|error| {
            warn!(
                event_name = "catalog.http.decode_failed",
                product_id = %id,
                error = %error,
                "catalog item body rejected"
            );
            FetchError::from(error)
        })?;

        debug!(event_name = "catalog.http.item_loaded", product_id = %id, "catalog item loaded");
        Ok(product)
    }
}

fn collection_url(base_url: &str) -> Result<Url, FetchError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    Url::parse(&format!("{trimmed}/{COLLECTION_PATH}")).map_err(|error| FetchError::Transport {
        message: format!("invalid catalog base url `{base_url}`: {error}"),
    })
}
