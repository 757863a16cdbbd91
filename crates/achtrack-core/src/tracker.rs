//! Orchestrates one fetch-merge-persist cycle against a [`StatSource`].

use std::path::Path;

use chrono::Local;
use tokio::sync::Mutex;

use crate::{
  error::Result,
  history::{self, HistoryTable},
  stats::{StatRecord, StatSource},
};

/// Drives history updates for any stat source.
///
/// The read-merge-write sequence runs under an in-process mutex: update
/// cycles are non-reentrant, and a second invocation waits rather than
/// interleaving with a write to the same file.
pub struct Tracker<S> {
  source: S,
  gate:   Mutex<()>,
}

impl<S: StatSource> Tracker<S> {
  pub fn new(source: S) -> Self {
    Self { source, gate: Mutex::new(()) }
  }

  pub fn source(&self) -> &S {
    &self.source
  }

  /// Create the history file for `appid` at `path` if it does not exist.
  ///
  /// The initial table has one row per current achievement and zero data
  /// columns. Returns `true` when a new file was created.
  pub async fn ensure_initialized(&self, appid: u32, path: &Path) -> Result<bool> {
    if path.exists() {
      return Ok(false);
    }
    let stats = self.source.fetch_stats(appid).await?;
    let table = HistoryTable::seed(&stats);
    table.save(path)?;
    tracing::info!(appid, path = %path.display(), rows = table.row_count(), "created history file");
    Ok(true)
  }

  /// Run one update cycle: load the table, fetch current stats, append a
  /// timestamped percentage column, persist.
  ///
  /// The file is only overwritten after the merge passes its integrity
  /// checks; on error the on-disk table is untouched.
  pub async fn update(&self, appid: u32, path: &Path) -> Result<HistoryTable> {
    let _guard = self.gate.lock().await;

    self.ensure_initialized(appid, path).await?;
    let mut table = HistoryTable::load(path)?;

    let stats = self.source.fetch_stats(appid).await?;
    let snapshot: Vec<(String, f64)> = stats
      .iter()
      .map(|s: &StatRecord| (s.title.clone(), s.percentage))
      .collect();

    let label = history::column_label(Local::now());
    table.merge_snapshot(&label, &snapshot)?;
    table.save(path)?;

    tracing::info!(appid, column = %label, rows = table.row_count(), "recorded snapshot");
    Ok(table)
  }
}
