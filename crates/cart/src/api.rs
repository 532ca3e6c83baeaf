//! HTTP client for the store's stock and catalog API.
//!
//! The API exposes one resource per product under two collections:
//!
//! - `GET {base}/stock/{id}` → `{ "id": 1, "amount": 3 }`
//! - `GET {base}/products/{id}` → `{ "id": 1, "title": "...", "price": 179.9, "image": "..." }`
//!
//! Catalog records are cached with `moka` for the configured TTL. Stock is
//! never cached: every quantity change must see the live amount.

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use rocket_shoes_core::{Product, ProductId, Stock};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ApiConfig;
use crate::error::LookupError;
use crate::ports::{ProductCatalog, StockService};

/// Errors that can occur when building an [`ApiClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP client failed to build.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Token contains characters not allowed in a header.
    #[error("Invalid API token: {0}")]
    InvalidToken(String),

    /// Base URL can't have path segments appended.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Client for the stock and catalog API.
///
/// Cheap to clone; clones share the connection pool and the catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    products: Option<Cache<ProductId, Product>>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value, the base URL
    /// cannot carry a path, or the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        if config.base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(config.base_url.to_string()));
        }

        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| ClientError::InvalidToken(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let products = (!config.catalog_cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(1000)
                .time_to_live(config.catalog_cache_ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                products,
            }),
        })
    }

    /// URL of a product's record in `collection`.
    fn endpoint(&self, collection: &str, id: ProductId) -> Url {
        let mut url = self.inner.base_url.clone();
        // Checked in `new`: the base URL can always carry a path.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(collection)
                .push(&id.to_string());
        }
        url
    }

    /// Fetch and decode one JSON record.
    async fn get_json<T: DeserializeOwned>(&self, url: Url, id: ProductId) -> Result<T, LookupError> {
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(id));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "API returned non-success status"
            );
            return Err(LookupError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse API response"
            );
            LookupError::Parse(e)
        })
    }
}

#[async_trait]
impl StockService for ApiClient {
    #[instrument(skip(self), fields(product_id = %id))]
    async fn stock(&self, id: ProductId) -> Result<Stock, LookupError> {
        let stock: Stock = self.get_json(self.endpoint("stock", id), id).await?;
        debug!(amount = stock.amount, "Fetched stock");
        Ok(stock)
    }
}

#[async_trait]
impl ProductCatalog for ApiClient {
    #[instrument(skip(self), fields(product_id = %id))]
    async fn product(&self, id: ProductId) -> Result<Product, LookupError> {
        if let Some(cache) = &self.inner.products
            && let Some(product) = cache.get(&id).await
        {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product: Product = self.get_json(self.endpoint("products", id), id).await?;

        if let Some(cache) = &self.inner.products {
            cache.insert(id, product.clone()).await;
        }

        Ok(product)
    }
}
