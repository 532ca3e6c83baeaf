//! Error taxonomy for cart operations.
//!
//! [`CartError`] is what callers see: exactly four classified failures.
//! [`LookupError`] and [`StoreError`] are what the collaborators report;
//! lookup failures are wrapped into `AddFailed` / `UpdateFailed`, store
//! failures are logged and never reach the caller.

use std::time::Duration;

use rocket_shoes_core::ProductId;
use thiserror::Error;

/// Classified failure of a cart operation.
///
/// The cart is left exactly as it was before the operation whenever one of
/// these is returned.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested amount exceeds available stock.
    #[error("product {product_id}: requested {requested}, only {available} in stock")]
    OutOfStock {
        product_id: ProductId,
        requested: i64,
        available: u32,
    },

    /// Remove or update target is not in the cart.
    #[error("product {0} is not in the cart")]
    ItemNotFound(ProductId),

    /// Stock or catalog lookup failed while adding.
    #[error("failed to add product {product_id}: {source}")]
    AddFailed {
        product_id: ProductId,
        #[source]
        source: LookupError,
    },

    /// Stock lookup failed while updating.
    #[error("failed to update product {product_id}: {source}")]
    UpdateFailed {
        product_id: ProductId,
        #[source]
        source: LookupError,
    },
}

/// Fieldless discriminant of [`CartError`], for matching and recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartErrorKind {
    OutOfStock,
    ItemNotFound,
    AddFailed,
    UpdateFailed,
}

impl CartError {
    #[must_use]
    pub const fn kind(&self) -> CartErrorKind {
        match self {
            Self::OutOfStock { .. } => CartErrorKind::OutOfStock,
            Self::ItemNotFound(_) => CartErrorKind::ItemNotFound,
            Self::AddFailed { .. } => CartErrorKind::AddFailed,
            Self::UpdateFailed { .. } => CartErrorKind::UpdateFailed,
        }
    }

    /// The product the failed operation targeted.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        match self {
            Self::OutOfStock { product_id, .. }
            | Self::AddFailed { product_id, .. }
            | Self::UpdateFailed { product_id, .. }
            | Self::ItemNotFound(product_id) => *product_id,
        }
    }

    /// Shopper-facing text for this failure.
    ///
    /// Internal details (HTTP status, timeouts) stay in the `Display` output
    /// and the logs.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        self.kind().user_message()
    }
}

impl CartErrorKind {
    #[must_use]
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::OutOfStock => "Requested quantity is out of stock",
            Self::ItemNotFound => "Product is not in the cart",
            Self::AddFailed => "Error adding product",
            Self::UpdateFailed => "Error updating product quantity",
        }
    }
}

/// Failure of a stock or catalog lookup.
#[derive(Debug, Error)]
pub enum LookupError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// API has no record for the product.
    #[error("Not found: product {0}")]
    NotFound(ProductId),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Lookup did not complete in time.
    #[error("Lookup timed out after {0:?}")]
    Timeout(Duration),

    /// Collaborator could not serve the request.
    #[error("Unavailable: {0}")]
    Unavailable(String),
}

/// Failure of the durable key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unavailable: {0}")]
    Unavailable(String),
}
