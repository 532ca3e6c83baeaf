//! The cart state container.
//!
//! [`CartStore`] exposes four entry points: [`cart`](CartStore::cart),
//! [`add_product`](CartStore::add_product),
//! [`remove_product`](CartStore::remove_product) and
//! [`update_product_amount`](CartStore::update_product_amount).
//!
//! # Commit protocol
//!
//! A successful mutation builds a new [`Cart`], swaps it in as the current
//! snapshot in one atomic store, then writes the full serialized cart to the
//! [`PersistentStore`] under [`STORAGE_KEY`]. Readers see either the old
//! snapshot or the new one, never a mix. A failed write is logged and does
//! not undo the swap: the in-memory cart is the source of truth for the
//! session.
//!
//! The write runs on its own task, which owns the mutation lock until the
//! write finishes. Dropping a mutation future after the swap therefore still
//! persists the new snapshot, and the next mutation waits for that write.
//!
//! # Concurrency
//!
//! Mutations are serialized by an async mutex held from the first lookup to
//! the end of the commit, so at most one mutation is in flight per store.
//! [`CartStore::cart`] never waits on it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use rocket_shoes_core::{Cart, CartItem, Product, ProductId, Stock};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{Instrument, debug, info, instrument, warn};

use crate::error::{CartError, LookupError};
use crate::ports::{CartObserver, PersistentStore, ProductCatalog, StockService};

/// Key under which the serialized cart is persisted.
pub const STORAGE_KEY: &str = "@RocketShoes:cart";

/// Tunables for a [`CartStore`].
#[derive(Debug, Clone)]
pub struct CartStoreOptions {
    /// Key of the persisted cart record
    pub storage_key: String,
    /// Upper bound on each stock/catalog lookup
    pub lookup_timeout: Duration,
}

impl Default for CartStoreOptions {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_string(),
            lookup_timeout: Duration::from_secs(10),
        }
    }
}

/// External collaborators of a [`CartStore`].
#[derive(Clone)]
pub struct Collaborators {
    pub stock: Arc<dyn StockService>,
    pub catalog: Arc<dyn ProductCatalog>,
    pub store: Arc<dyn PersistentStore>,
    pub observer: Arc<dyn CartObserver>,
}

/// Holds the shopper's cart and keeps its persisted mirror in sync.
pub struct CartStore {
    cart: ArcSwap<Cart>,
    mutation: Arc<Mutex<()>>,
    collaborators: Collaborators,
    options: CartStoreOptions,
}

impl CartStore {
    /// Create a store, restoring the cart from the persistent store.
    ///
    /// Starts empty if nothing was persisted, or if the persisted value
    /// cannot be read or parsed.
    #[instrument(skip_all, fields(key = %options.storage_key))]
    pub async fn load(collaborators: Collaborators, options: CartStoreOptions) -> Self {
        let cart = match collaborators.store.read(&options.storage_key).await {
            Ok(Some(raw)) => serde_json::from_str::<Cart>(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding unreadable persisted cart");
                Cart::new()
            }),
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read persisted cart, starting empty");
                Cart::new()
            }
        };

        info!(items = cart.len(), "Cart restored");

        Self {
            cart: ArcSwap::from_pointee(cart),
            mutation: Arc::new(Mutex::new(())),
            collaborators,
            options,
        }
    }

    /// Current cart snapshot.
    #[must_use]
    pub fn cart(&self) -> Arc<Cart> {
        self.cart.load_full()
    }

    /// Add one unit of a product.
    ///
    /// A product already in the cart goes through the update path with its
    /// amount plus one, so the new total is checked against stock.
    ///
    /// # Errors
    ///
    /// - `OutOfStock` if the product has no stock (or, for an existing item,
    ///   not enough for one more)
    /// - `AddFailed` if the stock or catalog lookup fails for a new item
    /// - `UpdateFailed` if the stock lookup fails for an existing item
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let guard = self.lock_mutation().await;
        let result = self.add_locked(guard, product_id).await;
        self.report(result)
    }

    /// Remove a product from the cart.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if the product is not in the cart.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let guard = self.lock_mutation().await;

        let current = self.cart.load_full();
        let result = match current.without(product_id) {
            Some(next) => {
                self.commit(guard, next).await;
                Ok(())
            }
            None => Err(CartError::ItemNotFound(product_id)),
        };
        self.report(result)
    }

    /// Set a product's amount.
    ///
    /// An amount below one is ignored once the stock check has passed; it is
    /// not an error.
    ///
    /// # Errors
    ///
    /// - `ItemNotFound` if the product is not in the cart
    /// - `UpdateFailed` if the stock lookup fails
    /// - `OutOfStock` if `amount` exceeds available stock
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_product_amount(
        &self,
        product_id: ProductId,
        amount: i64,
    ) -> Result<(), CartError> {
        let guard = self.lock_mutation().await;
        let result = self.update_locked(guard, product_id, amount).await;
        self.report(result)
    }

    async fn lock_mutation(&self) -> OwnedMutexGuard<()> {
        Arc::clone(&self.mutation).lock_owned().await
    }

    async fn add_locked(
        &self,
        guard: OwnedMutexGuard<()>,
        product_id: ProductId,
    ) -> Result<(), CartError> {
        let current = self.cart.load_full();

        if let Some(existing) = current.find(product_id) {
            let target = i64::from(existing.amount) + 1;
            debug!(target, "Product already in cart, incrementing");
            return self.update_locked(guard, product_id, target).await;
        }

        let add_failed = |source| CartError::AddFailed { product_id, source };

        let stock = self.lookup_stock(product_id).await.map_err(add_failed)?;
        if stock.amount < 1 {
            return Err(CartError::OutOfStock {
                product_id,
                requested: 1,
                available: stock.amount,
            });
        }

        let product = self.lookup_product(product_id).await.map_err(add_failed)?;
        self.commit(guard, current.with_appended(CartItem::new(product))).await;
        Ok(())
    }

    async fn update_locked(
        &self,
        guard: OwnedMutexGuard<()>,
        product_id: ProductId,
        amount: i64,
    ) -> Result<(), CartError> {
        let current = self.cart.load_full();

        if !current.contains(product_id) {
            return Err(CartError::ItemNotFound(product_id));
        }

        let stock = self
            .lookup_stock(product_id)
            .await
            .map_err(|source| CartError::UpdateFailed { product_id, source })?;

        if !stock.covers(amount) {
            return Err(CartError::OutOfStock {
                product_id,
                requested: amount,
                available: stock.amount,
            });
        }

        // Amount is now at most `stock.amount`, so it fits in a u32 once positive.
        let Some(amount) = u32::try_from(amount).ok().filter(|&amount| amount >= 1) else {
            debug!(amount, "Ignoring non-positive amount");
            return Ok(());
        };

        let next = current
            .with_amount(product_id, amount)
            .ok_or(CartError::ItemNotFound(product_id))?;
        self.commit(guard, next).await;
        Ok(())
    }

    /// Swap in the new snapshot, then persist it.
    ///
    /// The write task takes over `guard` and releases it once the write is
    /// done, whether or not this future is still being polled.
    async fn commit(&self, guard: OwnedMutexGuard<()>, next: Cart) {
        let items = next.len();
        let serialized = serde_json::to_string(&next);
        self.cart.store(Arc::new(next));

        let serialized = match serialized {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize cart");
                return;
            }
        };

        let store = Arc::clone(&self.collaborators.store);
        let key = self.options.storage_key.clone();
        let write = tokio::spawn(
            async move {
                let result = store.write(&key, serialized).await;
                drop(guard);
                match result {
                    Ok(()) => debug!(items, "Cart committed"),
                    Err(e) => tracing::error!(error = %e, "Failed to persist cart"),
                }
            }
            .in_current_span(),
        );

        if let Err(e) = write.await {
            tracing::error!(error = %e, "Cart write task failed");
        }
    }

    async fn lookup_stock(&self, product_id: ProductId) -> Result<Stock, LookupError> {
        self.with_timeout(self.collaborators.stock.stock(product_id))
            .await
    }

    async fn lookup_product(&self, product_id: ProductId) -> Result<Product, LookupError> {
        self.with_timeout(self.collaborators.catalog.product(product_id))
            .await
    }

    async fn with_timeout<T>(
        &self,
        lookup: impl Future<Output = Result<T, LookupError>>,
    ) -> Result<T, LookupError> {
        let limit = self.options.lookup_timeout;
        tokio::time::timeout(limit, lookup)
            .await
            .map_err(|_| LookupError::Timeout(limit))?
    }

    fn report(&self, result: Result<(), CartError>) -> Result<(), CartError> {
        if let Err(e) = &result {
            self.collaborators.observer.notify(e);
        }
        result
    }
}
