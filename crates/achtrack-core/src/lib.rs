//! Core types and merge logic for the achtrack achievement tracker.
//!
//! This crate is deliberately free of HTTP dependencies. The Steam
//! collaborators live in `achtrack-steam` behind the [`CatalogSource`] and
//! [`StatSource`] traits defined here; the CLI depends on both.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod catalog;
pub mod csv;
pub mod error;
pub mod history;
pub mod stats;
pub mod tracker;

#[cfg(test)]
mod tests;

pub use catalog::{Catalog, CatalogEntry, CatalogSource, Resolution};
pub use error::{Error, Result};
pub use history::HistoryTable;
pub use stats::{StatRecord, StatSource};
pub use tracker::Tracker;
