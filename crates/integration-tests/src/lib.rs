//! Integration tests for Rocket Shoes.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocket-shoes-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_operations` - Add/remove/update behaviour and failure kinds
//! - `cart_persistence` - Mirror round-trips through memory and file stores
//! - `cart_concurrency` - Serialized mutations and snapshot reads
//!
//! This library holds the shared fakes: [`FakeInventory`] stands in for the
//! stock and catalog API, [`FailingStore`] for a broken disk, and
//! [`TestContext`] wires them into a [`CartStore`].

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rocket_shoes_cart::{
    CartStore, CartStoreOptions, Collaborators, LookupError, MemoryStore, PersistentStore,
    ProductCatalog, RecordingObserver, STORAGE_KEY, StockService, StoreError,
};
use rocket_shoes_core::{Cart, Price, Product, ProductId, Stock};

/// In-memory stand-in for the stock and catalog API.
#[derive(Default)]
pub struct FakeInventory {
    stock: Mutex<HashMap<ProductId, u32>>,
    products: Mutex<HashMap<ProductId, Product>>,
    failing: Mutex<HashSet<ProductId>>,
    delay: Mutex<Option<Duration>>,
    stock_calls: AtomicUsize,
    catalog_calls: AtomicUsize,
}

impl FakeInventory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a product with a title, a whole-unit price and a stock level.
    pub fn insert(&self, id: i32, title: &str, price: i64, amount: u32) {
        let id = ProductId::new(id);
        lock(&self.products).insert(
            id,
            Product {
                id,
                title: title.to_string(),
                price: Price::from_units(price),
                image: format!("https://cdn.example.com/shoes/{id}.jpg"),
            },
        );
        lock(&self.stock).insert(id, amount);
    }

    /// Change a product's stock level.
    pub fn set_stock(&self, id: i32, amount: u32) {
        lock(&self.stock).insert(ProductId::new(id), amount);
    }

    /// Make every lookup for `id` fail.
    pub fn fail(&self, id: i32) {
        lock(&self.failing).insert(ProductId::new(id));
    }

    /// Delay every lookup by `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *lock(&self.delay) = Some(delay);
    }

    #[must_use]
    pub fn stock_calls(&self) -> usize {
        self.stock_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn catalog_calls(&self) -> usize {
        self.catalog_calls.load(Ordering::SeqCst)
    }

    async fn before_lookup(&self, id: ProductId) -> Result<(), LookupError> {
        let delay = *lock(&self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if lock(&self.failing).contains(&id) {
            return Err(LookupError::Unavailable(format!("lookup for {id} failed")));
        }
        Ok(())
    }
}

#[async_trait]
impl StockService for FakeInventory {
    async fn stock(&self, id: ProductId) -> Result<Stock, LookupError> {
        self.stock_calls.fetch_add(1, Ordering::SeqCst);
        self.before_lookup(id).await?;
        let amount = lock(&self.stock)
            .get(&id)
            .copied()
            .ok_or(LookupError::NotFound(id))?;
        Ok(Stock { id, amount })
    }
}

#[async_trait]
impl ProductCatalog for FakeInventory {
    async fn product(&self, id: ProductId) -> Result<Product, LookupError> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        self.before_lookup(id).await?;
        lock(&self.products)
            .get(&id)
            .cloned()
            .ok_or(LookupError::NotFound(id))
    }
}

/// A store whose reads and writes always fail.
#[derive(Debug, Default)]
pub struct FailingStore;

#[async_trait]
impl PersistentStore for FailingStore {
    async fn read(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }

    async fn write(&self, _key: &str, _value: String) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }
}

/// A cart wired to fakes, with handles to inspect each collaborator.
pub struct TestContext {
    pub cart: CartStore,
    pub inventory: Arc<FakeInventory>,
    pub store: Arc<MemoryStore>,
    pub observer: Arc<RecordingObserver>,
}

impl TestContext {
    /// Empty cart over the given inventory.
    pub async fn new(inventory: FakeInventory) -> Self {
        Self::with_store(inventory, MemoryStore::new(), CartStoreOptions::default()).await
    }

    /// Cart over the given inventory, restored from `store`.
    pub async fn with_store(
        inventory: FakeInventory,
        store: MemoryStore,
        options: CartStoreOptions,
    ) -> Self {
        let inventory = Arc::new(inventory);
        let store = Arc::new(store);
        let observer = Arc::new(RecordingObserver::new());
        let cart = CartStore::load(
            Collaborators {
                stock: inventory.clone(),
                catalog: inventory.clone(),
                store: store.clone(),
                observer: observer.clone(),
            },
            options,
        )
        .await;

        Self {
            cart,
            inventory,
            store,
            observer,
        }
    }

    /// Raw persisted mirror.
    #[must_use]
    pub fn persisted_raw(&self) -> Option<String> {
        self.store.get(STORAGE_KEY)
    }

    /// Persisted mirror, deserialized.
    #[must_use]
    pub fn persisted(&self) -> Option<Cart> {
        self.persisted_raw()
            .and_then(|raw| serde_json::from_str(&raw).ok())
    }

    /// `(id, amount)` pairs of the current cart, in order.
    #[must_use]
    pub fn lines(&self) -> Vec<(i32, u32)> {
        self.cart
            .cart()
            .iter()
            .map(|item| (item.id.as_i32(), item.amount))
            .collect()
    }
}

/// Inventory with three products, five units each.
#[must_use]
pub fn stocked_inventory() -> FakeInventory {
    let inventory = FakeInventory::new();
    inventory.insert(1, "Tênis de Caminhada Leve Confortável", 180, 5);
    inventory.insert(2, "Tênis VR Caminhada Confortável Detalhes Couro Masculino", 140, 5);
    inventory.insert(3, "Tênis Adidas Duramo Lite 2.0", 220, 5);
    inventory
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
