//! The per-game history table: stats as rows, snapshots as columns.
//!
//! This is an event-sourced wide table. The row set (one row per achievement
//! title) is fixed when the file is first created; every successful update
//! appends exactly one timestamped column and rewrites the file. History is
//! never rewritten, only extended.

use std::{collections::HashMap, path::Path};

use chrono::{DateTime, Local};

use crate::{
  csv,
  error::{Error, Result},
  stats::StatRecord,
};

/// Timestamp format used for column labels. Fixed-width and lexically
/// sortable; resolution is one second, so two updates within the same second
/// produce the same label (rejected by [`HistoryTable::merge_snapshot`]).
const LABEL_FORMAT: &str = "%Y-%m-%d-%H%M%S";

/// Format a snapshot column label from a wall-clock instant.
pub fn column_label(at: DateTime<Local>) -> String {
  at.format(LABEL_FORMAT).to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
  pub title:       String,
  pub description: String,
  /// One cell per snapshot column; `None` is the explicit missing marker for
  /// a title the corresponding fetch no longer returned.
  pub values:      Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryTable {
  columns: Vec<String>,
  rows:    Vec<HistoryRow>,
}

impl HistoryTable {
  /// Derive the initial table from the first fetched stat batch. Percentages
  /// are dropped; only titles and descriptions seed the row set.
  pub fn seed(stats: &[StatRecord]) -> Self {
    let rows = stats
      .iter()
      .map(|s| HistoryRow {
        title:       s.title.clone(),
        description: s.description.clone(),
        values:      Vec::new(),
      })
      .collect();
    Self { columns: Vec::new(), rows }
  }

  /// Snapshot column labels, oldest first.
  pub fn columns(&self) -> &[String] {
    &self.columns
  }

  pub fn rows(&self) -> &[HistoryRow] {
    &self.rows
  }

  pub fn row_count(&self) -> usize {
    self.rows.len()
  }

  // ── Persistence ───────────────────────────────────────────────────────────

  pub fn load(path: &Path) -> Result<Self> {
    let text = std::fs::read_to_string(path)?;
    Self::parse(&text)
      .map_err(|e| Error::FileCorrupt(format!("{}: {e}", path.display())))
  }

  /// Parse the CSV form. Errors carry a bare message; `load` prefixes the
  /// file path.
  pub fn parse(text: &str) -> Result<Self, String> {
    let mut lines = csv::parse(text).into_iter();

    let Some(header) = lines.next() else {
      return Err("empty file".into());
    };
    if header.len() < 2 || header[0] != "title" || header[1] != "description" {
      return Err(format!(
        "expected header title,description,..., found {header:?}"
      ));
    }
    let columns: Vec<String> = header[2..].to_vec();

    let mut rows = Vec::new();
    for line in lines {
      if line.len() != columns.len() + 2 {
        return Err(format!(
          "row {:?} has {} fields, expected {}",
          line.first().map(String::as_str).unwrap_or(""),
          line.len(),
          columns.len() + 2
        ));
      }
      let mut values = Vec::with_capacity(columns.len());
      for cell in &line[2..] {
        if cell.is_empty() {
          values.push(None);
        } else {
          let v = cell
            .parse::<f64>()
            .map_err(|_| format!("bad percentage cell {cell:?}"))?;
          values.push(Some(v));
        }
      }
      rows.push(HistoryRow {
        title: line[0].clone(),
        description: line[1].clone(),
        values,
      });
    }

    Ok(Self { columns, rows })
  }

  pub fn to_csv(&self) -> String {
    let mut out = String::new();

    let mut header = vec!["title".to_string(), "description".to_string()];
    header.extend(self.columns.iter().cloned());
    csv::write_row(&mut out, &header);

    for row in &self.rows {
      let mut cells = vec![row.title.clone(), row.description.clone()];
      cells.extend(
        row
          .values
          .iter()
          .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
      );
      csv::write_row(&mut out, &cells);
    }

    out
  }

  /// Overwrite `path` with the current table.
  pub fn save(&self, path: &Path) -> Result<()> {
    std::fs::write(path, self.to_csv())?;
    Ok(())
  }

  // ── Merge ─────────────────────────────────────────────────────────────────

  /// Left-merge one snapshot onto the table as a new column named `label`.
  ///
  /// Every existing row receives either its matched percentage or an explicit
  /// blank. The table is untouched on error:
  ///
  /// - a label already present is rejected (`DuplicateColumn`) instead of
  ///   silently colliding;
  /// - a snapshot that would change the row count — a duplicate incoming
  ///   title matching an existing row inflates a left join — is rejected
  ///   (`RowCountMismatch`).
  pub fn merge_snapshot(&mut self, label: &str, snapshot: &[(String, f64)]) -> Result<()> {
    if self.columns.iter().any(|c| c == label) {
      return Err(Error::DuplicateColumn(label.to_string()));
    }

    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    let mut percentages: HashMap<&str, f64> = HashMap::new();
    for (title, pct) in snapshot {
      *occurrences.entry(title.as_str()).or_insert(0) += 1;
      percentages.insert(title.as_str(), *pct);
    }

    // A left join emits one output row per match; a title appearing k > 1
    // times in the snapshot would emit k rows for the one history row.
    let joined: usize = self
      .rows
      .iter()
      .map(|row| occurrences.get(row.title.as_str()).copied().unwrap_or(1).max(1))
      .sum();
    if joined != self.rows.len() {
      return Err(Error::RowCountMismatch {
        expected: self.rows.len(),
        found:    joined,
      });
    }

    for row in &mut self.rows {
      row.values.push(percentages.get(row.title.as_str()).copied());
    }
    self.columns.push(label.to_string());
    Ok(())
  }
}
