//! SQLite backend for the Pantheon knowledge base.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The [`query`] and [`mutation`] modules
//! hold the operations themselves as plain functions over an explicit
//! session (`&Connection` or `&Transaction`); [`SqliteStore`] is the async
//! boundary that opens those sessions and resolves every error into the
//! caller-facing outcome.

mod encode;
mod schema;
mod store;

pub mod config;
pub mod error;
pub mod mutation;
pub mod query;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
