//! Notification sinks for classified cart failures.

use std::sync::{Mutex, PoisonError};

use crate::error::{CartError, CartErrorKind};
use crate::ports::CartObserver;

/// Logs each failure at `info` with its shopper-facing message.
///
/// These are routine shopper outcomes, so they stay below the level that
/// error reporting turns into events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl CartObserver for TracingObserver {
    fn notify(&self, error: &CartError) {
        tracing::info!(
            kind = ?error.kind(),
            product_id = %error.product_id(),
            error = %error,
            "{}",
            error.user_message()
        );
    }
}

/// Discards notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CartObserver for NoopObserver {
    fn notify(&self, _error: &CartError) {}
}

/// Keeps the kind of every failure it is notified of, in order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    kinds: Mutex<Vec<CartErrorKind>>,
}

impl RecordingObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Kinds notified so far.
    #[must_use]
    pub fn kinds(&self) -> Vec<CartErrorKind> {
        self.kinds
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent kind, if any.
    #[must_use]
    pub fn last(&self) -> Option<CartErrorKind> {
        self.kinds
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .copied()
    }
}

impl CartObserver for RecordingObserver {
    fn notify(&self, error: &CartError) {
        self.kinds
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(error.kind());
    }
}
