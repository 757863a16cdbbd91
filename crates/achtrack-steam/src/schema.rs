//! Web API strategy: game schema joined with global percentages.
//!
//! Two calls — `GetSchemaForGame/v2` (titles, descriptions, hidden flags)
//! and `GetGlobalAchievementPercentagesForApp/v2` (name → percent achieved,
//! 0–100) — joined on the internal achievement `name`. The two result sets
//! must have the same cardinality; a disagreement is a hard integrity
//! failure, not a warning.

use std::collections::HashMap;

use achtrack_core::{Error, Result, StatRecord};
use serde::Deserialize;

use crate::client::{API_BASE, SteamClient, transport};

/// Description shown for achievements the schema keeps hidden.
const HIDDEN_DESCRIPTION: &str = "HIDDEN";

// ─── Wire shapes ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SchemaResponse {
  #[serde(default)]
  game: GameSchema,
}

#[derive(Debug, Default, Deserialize)]
struct GameSchema {
  #[serde(rename = "gameName")]
  game_name: Option<String>,
  #[serde(rename = "availableGameStats", default)]
  available_game_stats: AvailableGameStats,
}

#[derive(Debug, Default, Deserialize)]
struct AvailableGameStats {
  #[serde(default)]
  achievements: Vec<SchemaAchievement>,
}

/// One schema entry. The endpoint also carries an icon URL; we ignore it.
#[derive(Debug, Deserialize)]
struct SchemaAchievement {
  name: String,
  #[serde(rename = "displayName")]
  display_name: String,
  description: Option<String>,
  /// The API encodes the hidden flag as 0/1.
  #[serde(default)]
  hidden: u8,
}

#[derive(Debug, Deserialize)]
struct PercentagesResponse {
  #[serde(default)]
  achievementpercentages: Percentages,
}

#[derive(Debug, Default, Deserialize)]
struct Percentages {
  #[serde(default)]
  achievements: Vec<RawPercentage>,
}

#[derive(Debug, Deserialize)]
struct RawPercentage {
  name:    String,
  percent: f64,
}

// ─── Fetch ───────────────────────────────────────────────────────────────────

pub async fn fetch_stats(client: &SteamClient, appid: u32) -> Result<Vec<StatRecord>> {
  let schema = fetch_schema(client, appid).await?;
  let percentages = fetch_percentages(client, appid).await?;
  join(schema, percentages)
}

async fn fetch_schema(client: &SteamClient, appid: u32) -> Result<Vec<SchemaAchievement>> {
  let key = client.api_key()?.to_string();
  let url = format!("{API_BASE}/ISteamUserStats/GetSchemaForGame/v2/");

  let payload: SchemaResponse = client
    .http()
    .get(&url)
    .query(&[("key", key), ("appid", appid.to_string())])
    .send()
    .await
    .and_then(reqwest::Response::error_for_status)
    .map_err(transport)?
    .json()
    .await
    .map_err(transport)?;

  if payload.game.game_name.is_none()
    && payload.game.available_game_stats.achievements.is_empty()
  {
    tracing::warn!(appid, "no schema defined for this game");
  }

  Ok(payload.game.available_game_stats.achievements)
}

async fn fetch_percentages(client: &SteamClient, appid: u32) -> Result<Vec<RawPercentage>> {
  let url =
    format!("{API_BASE}/ISteamUserStats/GetGlobalAchievementPercentagesForApp/v2/");

  let payload: PercentagesResponse = client
    .http()
    .get(&url)
    .query(&[("gameid", appid.to_string()), ("format", "json".into())])
    .send()
    .await
    .and_then(reqwest::Response::error_for_status)
    .map_err(transport)?
    .json()
    .await
    .map_err(transport)?;

  Ok(payload.achievementpercentages.achievements)
}

// ─── Join ────────────────────────────────────────────────────────────────────

/// Join schema entries with their percentages on the internal name key,
/// normalising percentages to `[0, 1]`.
///
/// Fails closed with `SchemaMismatch` when the two sets disagree — either in
/// count or in the names themselves — before anything is merged downstream.
fn join(
  schema: Vec<SchemaAchievement>,
  percentages: Vec<RawPercentage>,
) -> Result<Vec<StatRecord>> {
  if schema.len() != percentages.len() {
    return Err(Error::SchemaMismatch {
      schema:      schema.len(),
      percentages: percentages.len(),
    });
  }

  let by_name: HashMap<&str, f64> = percentages
    .iter()
    .map(|p| (p.name.as_str(), p.percent))
    .collect();

  let schema_len = schema.len();
  schema
    .into_iter()
    .map(|entry| {
      let percent = by_name.get(entry.name.as_str()).copied().ok_or(
        Error::SchemaMismatch { schema: schema_len, percentages: by_name.len() },
      )?;
      Ok(StatRecord {
        title:       entry.display_name,
        description: entry
          .description
          .unwrap_or_else(|| HIDDEN_DESCRIPTION.to_string()),
        hidden:      entry.hidden != 0,
        percentage:  percent / 100.0,
      })
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn schema_entry(name: &str, title: &str) -> SchemaAchievement {
    SchemaAchievement {
      name:         name.into(),
      display_name: title.into(),
      description:  Some(format!("{title} description")),
      hidden:       0,
    }
  }

  fn percentage(name: &str, percent: f64) -> RawPercentage {
    RawPercentage { name: name.into(), percent }
  }

  #[test]
  fn joins_on_the_internal_name_key() {
    let records = join(
      vec![schema_entry("ACH_A", "First Steps"), schema_entry("ACH_B", "Veteran")],
      vec![percentage("ACH_B", 12.5), percentage("ACH_A", 80.0)],
    )
    .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].title, "First Steps");
    assert_eq!(records[0].percentage, 0.8);
    assert_eq!(records[1].title, "Veteran");
    assert_eq!(records[1].percentage, 0.125);
  }

  #[test]
  fn hidden_achievements_get_the_placeholder_description() {
    let mut entry = schema_entry("ACH_H", "???");
    entry.description = None;
    entry.hidden = 1;

    let records = join(vec![entry], vec![percentage("ACH_H", 1.0)]).unwrap();
    assert_eq!(records[0].description, "HIDDEN");
    assert!(records[0].hidden);
  }

  #[test]
  fn cardinality_mismatch_fails_closed() {
    let err = join(
      vec![schema_entry("ACH_A", "First Steps")],
      vec![percentage("ACH_A", 80.0), percentage("ACH_B", 12.5)],
    )
    .unwrap_err();

    assert!(matches!(
      err,
      Error::SchemaMismatch { schema: 1, percentages: 2 }
    ));
  }

  #[test]
  fn name_mismatch_fails_closed_even_with_equal_counts() {
    let err = join(
      vec![schema_entry("ACH_A", "First Steps")],
      vec![percentage("ACH_OTHER", 80.0)],
    )
    .unwrap_err();
    assert!(matches!(err, Error::SchemaMismatch { .. }));
  }

  #[test]
  fn no_achievements_is_success_not_an_error() {
    assert!(join(Vec::new(), Vec::new()).unwrap().is_empty());
  }

  #[test]
  fn deserialises_the_documented_schema_shape() {
    let payload: SchemaResponse = serde_json::from_str(
      r#"{"game":{"gameName":"Mass Effect","availableGameStats":{"achievements":[
        {"name":"ACH_A","displayName":"First Steps","description":"Begin.","hidden":0,
         "icon":"https://example.invalid/a.jpg"}
      ]}}}"#,
    )
    .unwrap();

    let achievements = payload.game.available_game_stats.achievements;
    assert_eq!(achievements.len(), 1);
    assert_eq!(achievements[0].display_name, "First Steps");
  }

  #[test]
  fn empty_schema_object_deserialises_to_no_achievements() {
    let payload: SchemaResponse = serde_json::from_str(r#"{"game":{}}"#).unwrap();
    assert!(payload.game.available_game_stats.achievements.is_empty());
  }

  #[test]
  fn deserialises_the_documented_percentages_shape() {
    let payload: PercentagesResponse = serde_json::from_str(
      r#"{"achievementpercentages":{"achievements":[{"name":"ACH_A","percent":51.3}]}}"#,
    )
    .unwrap();
    assert_eq!(payload.achievementpercentages.achievements[0].percent, 51.3);
  }

  #[test]
  fn missing_percentages_section_means_no_achievements() {
    let payload: PercentagesResponse = serde_json::from_str("{}").unwrap();
    assert!(payload.achievementpercentages.achievements.is_empty());
  }
}
