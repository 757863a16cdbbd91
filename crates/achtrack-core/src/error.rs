//! Error types shared across the achtrack crates.
//!
//! Identifier resolution outcomes (`NotFound` / `Ambiguous`) are *not* here:
//! they are data, modelled by [`crate::catalog::Resolution`], so interactive
//! callers can re-prompt instead of unwinding.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The app catalog endpoint could not be reached or returned a payload
  /// missing required fields.
  #[error("app catalog unavailable: {0}")]
  CatalogUnavailable(String),

  /// The settings file is absent or has no `[steam_api] api_key` entry.
  #[error("missing API credentials: {0}")]
  MissingCredentials(String),

  /// The schema and percentage endpoints disagree on how many achievements
  /// the game has. Hard integrity failure, checked before any merge.
  #[error("schema/percentage mismatch: {schema} schema entries, {percentages} percentage entries")]
  SchemaMismatch { schema: usize, percentages: usize },

  /// An expected structural node was absent while scraping.
  #[error("scrape parse error: {0}")]
  Parse(String),

  /// A persisted CSV file could not be interpreted.
  #[error("corrupt data file: {0}")]
  FileCorrupt(String),

  /// A merge would have changed the number of history rows.
  #[error("merge changed row count: expected {expected}, found {found}")]
  RowCountMismatch { expected: usize, found: usize },

  /// A snapshot column with this label already exists (two updates within
  /// the same second).
  #[error("snapshot column {0:?} already recorded")]
  DuplicateColumn(String),

  /// An in-flight request exceeded the client timeout.
  #[error("request timed out")]
  FetchTimeout,

  /// Any other transport-level failure.
  #[error("transport error: {0}")]
  Transport(String),

  #[error(transparent)]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
