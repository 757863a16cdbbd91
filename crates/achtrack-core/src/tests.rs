//! Tests for the catalog index, history merge, and tracker orchestration.
//!
//! Network collaborators are replaced with in-memory fakes; on-disk behavior
//! runs against temporary directories.

use crate::{
  Catalog, CatalogEntry, CatalogSource, Error, HistoryTable, Resolution,
  StatRecord, StatSource, Tracker, csv,
  error::Result,
  history,
};

fn entry(appid: u32, name: &str) -> CatalogEntry {
  CatalogEntry { appid, name: name.into() }
}

fn stat(title: &str, percentage: f64) -> StatRecord {
  StatRecord {
    title:       title.into(),
    description: format!("description of {title}"),
    hidden:      false,
    percentage,
  }
}

// ─── CSV codec ───────────────────────────────────────────────────────────────

#[test]
fn csv_quoting_round_trip() {
  let row = vec![
    "plain".to_string(),
    "with, comma".to_string(),
    "with \"quotes\"".to_string(),
  ];
  let mut text = String::new();
  csv::write_row(&mut text, &row);

  let parsed = csv::parse(&text);
  assert_eq!(parsed, vec![row]);
}

#[test]
fn csv_skips_blank_lines_and_tolerates_crlf() {
  let parsed = csv::parse("a,b\r\n\r\nc,d\n");
  assert_eq!(parsed, vec![
    vec!["a".to_string(), "b".to_string()],
    vec!["c".to_string(), "d".to_string()],
  ]);
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

fn sample_catalog() -> Catalog {
  Catalog::from_entries([
    entry(289070, "Sid Meier's Civilization VI"),
    entry(8930, "Sid Meier's Civilization V"),
    entry(892970, "Valheim"),
    entry(38400, "Fallout"),
    entry(1001, "Duplicate Game"),
    entry(1002, "Duplicate Game"),
  ])
}

#[test]
fn search_is_case_insensitive_prefix_match() {
  let catalog = sample_catalog();

  let hits = catalog.search("sid meier's civ");
  assert_eq!(hits.len(), 2);
  // Sorted lexicographically by name.
  assert_eq!(hits[0].name, "Sid Meier's Civilization V");
  assert_eq!(hits[1].name, "Sid Meier's Civilization VI");

  assert_eq!(catalog.search("VALHEIM").len(), 1);
}

#[test]
fn search_miss_is_empty_not_an_error() {
  assert!(sample_catalog().search("zzrandomzz").is_empty());
}

#[test]
fn resolve_is_three_way() {
  let catalog = sample_catalog();

  assert_eq!(catalog.resolve("valheim"), Resolution::Unique(892970));
  assert_eq!(catalog.resolve("no such game"), Resolution::NotFound);

  match catalog.resolve("duplicate game") {
    Resolution::Ambiguous(candidates) => assert_eq!(candidates.len(), 2),
    other => panic!("expected Ambiguous, got {other:?}"),
  }
}

struct FakeCatalogSource(Vec<CatalogEntry>);

impl CatalogSource for FakeCatalogSource {
  async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>> {
    Ok(self.0.clone())
  }
}

#[tokio::test]
async fn load_refreshes_filters_and_round_trips() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("catalog.csv");

  let source = FakeCatalogSource(vec![
    entry(10, "Counter-Strike"),
    entry(0, ""), // filtered
    entry(70, "Half-Life"),
    entry(440, "Team Fortress 2, Free"), // exercises quoting
  ]);

  let catalog = Catalog::load(&source, &path, false).await.unwrap();
  assert_eq!(catalog.len(), 3);
  assert_eq!(catalog.resolve("half-life"), Resolution::Unique(70));

  // Reloading from disk without the source yields the same mapping.
  let reloaded = Catalog::load_file(&path).unwrap();
  assert_eq!(reloaded.len(), 3);
  assert_eq!(reloaded.resolve("counter-strike"), Resolution::Unique(10));
  assert_eq!(
    reloaded.resolve("team fortress 2, free"),
    Resolution::Unique(440)
  );
}

#[tokio::test]
async fn load_without_refresh_does_not_touch_the_source() {
  struct PanickingSource;
  impl CatalogSource for PanickingSource {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>> {
      panic!("catalog fetch should not run when the file exists");
    }
  }

  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("catalog.csv");
  Catalog::load(&FakeCatalogSource(vec![entry(10, "Counter-Strike")]), &path, false)
    .await
    .unwrap();

  let catalog = Catalog::load(&PanickingSource, &path, false).await.unwrap();
  assert_eq!(catalog.len(), 1);
}

#[test]
fn load_file_rejects_bad_header() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("catalog.csv");
  std::fs::write(&path, "id,title\n1,Foo\n").unwrap();

  match Catalog::load_file(&path) {
    Err(Error::FileCorrupt(_)) => {}
    other => panic!("expected FileCorrupt, got {other:?}"),
  }
}

// ─── History table ───────────────────────────────────────────────────────────

#[test]
fn seed_drops_percentages_and_has_zero_columns() {
  let table = HistoryTable::seed(&[stat("A", 0.5), stat("B", 0.2)]);
  assert_eq!(table.row_count(), 2);
  assert!(table.columns().is_empty());
  assert_eq!(table.to_csv().lines().next(), Some("title,description"));
}

#[test]
fn merge_appends_one_column_in_row_order() {
  let mut table = HistoryTable::seed(&[stat("A", 0.5), stat("B", 0.2), stat("C", 0.9)]);

  table
    .merge_snapshot("2026-08-23-120000", &[
      ("A".into(), 0.6),
      ("B".into(), 0.25),
      ("C".into(), 0.91),
    ])
    .unwrap();

  assert_eq!(table.row_count(), 3);
  assert_eq!(table.columns(), ["2026-08-23-120000"]);
  let values: Vec<_> = table.rows().iter().map(|r| r.values[0]).collect();
  assert_eq!(values, [Some(0.6), Some(0.25), Some(0.91)]);
}

#[test]
fn merge_marks_missing_titles_with_blank_cells() {
  let mut table = HistoryTable::seed(&[stat("A", 0.5), stat("B", 0.2), stat("C", 0.9)]);

  // "B" disappeared upstream; an extra title "D" must not add a row.
  table
    .merge_snapshot("2026-08-23-120000", &[("A".into(), 0.7), ("D".into(), 0.1)])
    .unwrap();

  assert_eq!(table.row_count(), 3);
  let values: Vec<_> = table.rows().iter().map(|r| r.values[0]).collect();
  assert_eq!(values, [Some(0.7), None, None]);
}

#[test]
fn merge_rejects_duplicate_incoming_titles() {
  let mut table = HistoryTable::seed(&[stat("A", 0.5), stat("B", 0.2)]);
  let before = table.clone();

  let err = table
    .merge_snapshot("2026-08-23-120000", &[
      ("A".into(), 0.6),
      ("A".into(), 0.7),
      ("B".into(), 0.3),
    ])
    .unwrap_err();

  match err {
    Error::RowCountMismatch { expected: 2, found: 3 } => {}
    other => panic!("expected RowCountMismatch, got {other:?}"),
  }
  // Aborted merge leaves the table untouched.
  assert_eq!(table, before);
}

#[test]
fn merge_rejects_duplicate_column_label() {
  let mut table = HistoryTable::seed(&[stat("A", 0.5)]);
  table
    .merge_snapshot("2026-08-23-120000", &[("A".into(), 0.6)])
    .unwrap();

  let err = table
    .merge_snapshot("2026-08-23-120000", &[("A".into(), 0.7)])
    .unwrap_err();
  match err {
    Error::DuplicateColumn(label) => assert_eq!(label, "2026-08-23-120000"),
    other => panic!("expected DuplicateColumn, got {other:?}"),
  }
  assert_eq!(table.columns().len(), 1);
}

#[test]
fn empty_stat_list_yields_a_zero_row_table_that_still_updates() {
  let mut table = HistoryTable::seed(&[]);
  assert_eq!(table.row_count(), 0);

  table.merge_snapshot("2026-08-23-120000", &[]).unwrap();
  assert_eq!(table.row_count(), 0);
  assert_eq!(table.columns().len(), 1);

  let reparsed = HistoryTable::parse(&table.to_csv()).unwrap();
  assert_eq!(reparsed, table);
}

#[test]
fn table_round_trips_through_csv_with_blanks() {
  let mut table = HistoryTable::seed(&[stat("A", 0.5), stat("B, the sequel", 0.2)]);
  table
    .merge_snapshot("2026-08-23-120000", &[("A".into(), 0.6)])
    .unwrap();

  let reparsed = HistoryTable::parse(&table.to_csv()).unwrap();
  assert_eq!(reparsed, table);
  assert_eq!(reparsed.rows()[1].values[0], None);
}

#[test]
fn parse_rejects_malformed_headers_and_cells() {
  assert!(HistoryTable::parse("").is_err());
  assert!(HistoryTable::parse("name,blurb\n").is_err());
  assert!(HistoryTable::parse("title,description,t1\nA,desc,not-a-number\n").is_err());
  assert!(HistoryTable::parse("title,description,t1\nA,desc\n").is_err());
}

#[test]
fn column_label_is_fixed_width_and_sortable() {
  use chrono::TimeZone as _;
  let label = history::column_label(
    chrono::Local.with_ymd_and_hms(2026, 8, 23, 9, 5, 7).unwrap(),
  );
  assert_eq!(label, "2026-08-23-090507");
}

// ─── Tracker ─────────────────────────────────────────────────────────────────

struct FakeStatSource(Vec<StatRecord>);

impl StatSource for FakeStatSource {
  async fn fetch_stats(&self, _appid: u32) -> Result<Vec<StatRecord>> {
    Ok(self.0.clone())
  }
}

#[tokio::test]
async fn tracker_initializes_then_records_a_snapshot() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("history.csv");

  let tracker = Tracker::new(FakeStatSource(vec![
    stat("A", 0.5),
    stat("B", 0.2),
    stat("C", 0.9),
  ]));

  let created = tracker.ensure_initialized(1328670, &path).await.unwrap();
  assert!(created);
  assert!(!tracker.ensure_initialized(1328670, &path).await.unwrap());

  let table = tracker.update(1328670, &path).await.unwrap();
  assert_eq!(table.row_count(), 3);
  assert_eq!(table.columns().len(), 1);

  // The persisted file matches what update returned.
  assert_eq!(HistoryTable::load(&path).unwrap(), table);
}

#[tokio::test]
async fn tracker_update_creates_the_file_on_first_run() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("history.csv");

  let tracker = Tracker::new(FakeStatSource(vec![stat("A", 0.5)]));
  let table = tracker.update(42, &path).await.unwrap();

  assert_eq!(table.row_count(), 1);
  assert_eq!(table.columns().len(), 1);
  assert_eq!(table.rows()[0].values[0], Some(0.5));
}

#[tokio::test]
async fn tracker_with_no_achievements_keeps_a_zero_row_table() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("history.csv");

  let tracker = Tracker::new(FakeStatSource(Vec::new()));
  let table = tracker.update(892970, &path).await.unwrap();

  assert_eq!(table.row_count(), 0);
  assert_eq!(table.columns().len(), 1);
}
