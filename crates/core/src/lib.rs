//! Rocket Shoes Core - Shared types library.
//!
//! This crate provides the domain types used across all Rocket Shoes components:
//! - `cart` - Cart state container and its collaborators
//! - `cli` - Command-line front end for the cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. Cart transitions here are pure: they build a new
//! [`Cart`] and leave the old one untouched.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, prices, catalog records and the cart itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
