//! Durable key-value stores for the cart mirror.
//!
//! - [`FileStore`] - One file per key inside a directory, for the CLI
//! - [`MemoryStore`] - Process-local map, for tests and ephemeral sessions

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;
