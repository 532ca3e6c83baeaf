//! Rocket Shoes cart library.
//!
//! [`CartStore`] owns the shopper's cart. It validates every quantity change
//! against live stock, and mirrors each committed snapshot to a
//! [`PersistentStore`] so the cart survives restarts.
//!
//! # Architecture
//!
//! - [`ports`] - Collaborator traits: stock lookup, catalog lookup, durable
//!   storage and the failure observer
//! - [`store`] - The cart state container and its commit protocol
//! - [`api`] - `reqwest` adapter for the stock and catalog HTTP endpoints
//! - [`persist`] - File-backed and in-memory key-value stores
//! - [`observer`] - Notification sinks for classified failures
//! - [`config`] - Environment-driven configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rocket_shoes_cart::{ApiClient, CartConfig, CartStore, Collaborators, FileStore, TracingObserver};
//!
//! let config = CartConfig::from_env()?;
//! let api = Arc::new(ApiClient::new(&config.api)?);
//! let store = CartStore::load(
//!     Collaborators {
//!         stock: api.clone(),
//!         catalog: api,
//!         store: Arc::new(FileStore::new(&config.storage_dir)),
//!         observer: Arc::new(TracingObserver),
//!     },
//!     config.store_options(),
//! )
//! .await;
//!
//! store.add_product(ProductId::new(1)).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod observer;
pub mod persist;
pub mod ports;
pub mod store;

pub use api::{ApiClient, ClientError};
pub use config::{ApiConfig, CartConfig, ConfigError};
pub use error::{CartError, CartErrorKind, LookupError, StoreError};
pub use observer::{NoopObserver, RecordingObserver, TracingObserver};
pub use persist::{FileStore, MemoryStore};
pub use ports::{CartObserver, PersistentStore, ProductCatalog, StockService};
pub use store::{CartStore, CartStoreOptions, Collaborators, STORAGE_KEY};
