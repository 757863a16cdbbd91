//! Stat records and the fetch-strategy seam.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One named achievement with its global completion percentage.
///
/// `title` is the stable join key across snapshots of the same game.
/// `percentage` is normalised to `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRecord {
  pub title:       String,
  pub description: String,
  pub hidden:      bool,
  pub percentage:  f64,
}

/// External collaborator that retrieves current stats for one game.
///
/// Implemented twice in `achtrack-steam` (web API and community-page scrape);
/// the tracker and its tests only see this trait. A game with no achievement
/// system yields an empty list — that is success, not an error.
pub trait StatSource {
  async fn fetch_stats(&self, appid: u32) -> Result<Vec<StatRecord>>;
}
