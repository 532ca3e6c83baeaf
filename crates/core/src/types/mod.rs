//! Core types for Rocket Shoes.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;

pub use cart::{Cart, CartInvariantError, CartItem};
pub use id::*;
pub use price::{Price, PriceError};
pub use product::{Product, Stock};
