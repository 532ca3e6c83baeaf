//! Collaborator traits for [`CartStore`](crate::CartStore).
//!
//! The store holds no I/O of its own. Stock, catalog and durable storage
//! are reached through these traits so the cart logic can run against the
//! HTTP and file adapters in production and in-memory fakes in tests.

use async_trait::async_trait;
use rocket_shoes_core::{Product, ProductId, Stock};

use crate::error::{CartError, LookupError, StoreError};

/// Reports how many units of a product are available.
#[async_trait]
pub trait StockService: Send + Sync {
    /// Current stock for a product.
    async fn stock(&self, id: ProductId) -> Result<Stock, LookupError>;
}

/// Provides display data for a product.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Catalog record for a product.
    async fn product(&self, id: ProductId) -> Result<Product, LookupError>;
}

/// Durable key-value storage holding the serialized cart.
///
/// Values are opaque strings; every write replaces the whole value.
#[async_trait]
pub trait PersistentStore: Send + Sync {
    /// Read the value under `key`, or `None` if nothing was ever written.
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrite the value under `key`.
    async fn write(&self, key: &str, value: String) -> Result<(), StoreError>;
}

/// Receives every classified failure before it is returned to the caller.
pub trait CartObserver: Send + Sync {
    fn notify(&self, error: &CartError);
}
