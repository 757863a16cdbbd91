//! The name→appid catalog: prefix search and exact resolution.
//!
//! The catalog is an explicit value with an explicit load/refresh lifecycle.
//! Construct one, pass it to whoever needs name resolution; independent
//! instances are fine (tests rely on that).

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
  csv,
  error::{Error, Result},
};

/// One `(appid, name)` pair from the app catalog.
///
/// The source guarantees neither unique nor non-empty names; `appid` is the
/// stable key. Empty-name entries are filtered out on refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
  pub appid: u32,
  pub name:  String,
}

/// External collaborator that downloads the full app catalog.
pub trait CatalogSource {
  async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>>;
}

/// Outcome of an exact-name lookup.
///
/// The three-way split is the point: zero matches and many matches are
/// ordinary data the caller can act on (re-prompt, list candidates), not
/// failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
  NotFound,
  Unique(u32),
  Ambiguous(Vec<CatalogEntry>),
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// In-memory catalog indexed by lowercased name.
#[derive(Debug, Default)]
pub struct Catalog {
  index: BTreeMap<String, Vec<CatalogEntry>>,
}

impl Catalog {
  /// Build the case-insensitive index from a list of entries.
  pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
    let mut index: BTreeMap<String, Vec<CatalogEntry>> = BTreeMap::new();
    for entry in entries {
      index.entry(entry.name.to_lowercase()).or_default().push(entry);
    }
    Self { index }
  }

  /// Load the catalog from `path`, refreshing from `source` first when the
  /// file is missing or `force_refresh` is set.
  ///
  /// A refresh filters out empty-name entries and persists the result before
  /// the index is built, so the on-disk file and the in-memory index always
  /// agree.
  pub async fn load<S: CatalogSource>(
    source: &S,
    path: &Path,
    force_refresh: bool,
  ) -> Result<Self> {
    if force_refresh || !path.exists() {
      let mut entries = source.fetch_catalog().await?;
      entries.retain(|e| !e.name.is_empty());
      tracing::info!(entries = entries.len(), path = %path.display(), "refreshed app catalog");
      save_entries(&entries, path)?;
    }
    Self::load_file(path)
  }

  /// Load a previously persisted catalog file.
  pub fn load_file(path: &Path) -> Result<Self> {
    let text = std::fs::read_to_string(path)?;
    let mut rows = csv::parse(&text).into_iter();

    match rows.next() {
      Some(header) if header == ["appid", "name"] => {}
      other => {
        return Err(Error::FileCorrupt(format!(
          "{}: expected header appid,name, found {other:?}",
          path.display()
        )));
      }
    }

    let mut entries = Vec::new();
    for row in rows {
      let [appid, name] = row.as_slice() else {
        return Err(Error::FileCorrupt(format!(
          "{}: expected 2 fields, found {}",
          path.display(),
          row.len()
        )));
      };
      let appid = appid.parse::<u32>().map_err(|_| {
        Error::FileCorrupt(format!("{}: bad appid {appid:?}", path.display()))
      })?;
      entries.push(CatalogEntry { appid, name: name.clone() });
    }

    Ok(Self::from_entries(entries))
  }

  /// Case-insensitive prefix search, sorted lexicographically by name.
  ///
  /// An empty result is a valid answer, not an error; messaging "no results"
  /// is the caller's job.
  pub fn search(&self, prefix: &str) -> Vec<CatalogEntry> {
    let prefix = prefix.to_lowercase();
    let mut hits: Vec<CatalogEntry> = self
      .index
      .range(prefix.clone()..)
      .take_while(|(key, _)| key.starts_with(&prefix))
      .flat_map(|(_, entries)| entries.iter().cloned())
      .collect();
    hits.sort_by(|a, b| a.name.cmp(&b.name).then(a.appid.cmp(&b.appid)));
    hits
  }

  /// Case-insensitive exact lookup with the none/one/many contract.
  pub fn resolve(&self, name: &str) -> Resolution {
    match self.index.get(&name.to_lowercase()).map(Vec::as_slice) {
      None | Some([]) => Resolution::NotFound,
      Some([entry]) => Resolution::Unique(entry.appid),
      Some(entries) => Resolution::Ambiguous(entries.to_vec()),
    }
  }

  /// Total number of entries in the catalog.
  pub fn len(&self) -> usize {
    self.index.values().map(Vec::len).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.index.is_empty()
  }
}

fn save_entries(entries: &[CatalogEntry], path: &Path) -> Result<()> {
  let mut out = String::new();
  csv::write_row(&mut out, &["appid".into(), "name".into()]);
  for entry in entries {
    csv::write_row(&mut out, &[entry.appid.to_string(), entry.name.clone()]);
  }
  std::fs::write(path, out)?;
  Ok(())
}
