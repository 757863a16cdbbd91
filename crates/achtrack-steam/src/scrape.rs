//! Fallback strategy: scrape the community global-statistics page.
//!
//! Used for games where no API key is available. Achievement rows are
//! identified by the `achieveRow` class; within a row the title is the inner
//! `h3`, the description the inner `h5`, and the percentage the trailing
//! `NN.N%` text node. There is no cardinality cross-check here — the page is
//! the only source.

use achtrack_core::{Error, Result, StatRecord};
use scraper::{ElementRef, Html, Selector};

use crate::client::{COMMUNITY_BASE, SteamClient, transport};

pub async fn fetch_stats(client: &SteamClient, appid: u32) -> Result<Vec<StatRecord>> {
  let url = format!("{COMMUNITY_BASE}/stats/{appid}/achievements/");

  let body = client
    .http()
    .get(&url)
    .send()
    .await
    .and_then(reqwest::Response::error_for_status)
    .map_err(transport)?
    .text()
    .await
    .map_err(transport)?;

  parse_stats_page(&body)
}

fn selector(css: &str) -> Result<Selector> {
  Selector::parse(css).map_err(|e| Error::Parse(format!("bad selector {css:?}: {e}")))
}

/// Extract achievement rows from the rendered statistics page.
///
/// A page with no achievement rows parses to an empty list (success); a row
/// missing one of its expected structural nodes is a `ParseError`.
pub(crate) fn parse_stats_page(html: &str) -> Result<Vec<StatRecord>> {
  let document = Html::parse_document(html);
  let rows = selector("div.achieveRow")?;
  let titles = selector("h3")?;
  let descriptions = selector("h5")?;

  let mut records = Vec::new();
  for row in document.select(&rows) {
    let title = text_of(
      row
        .select(&titles)
        .next()
        .ok_or_else(|| Error::Parse("achievement row without a title node".into()))?,
    );
    let description = text_of(
      row.select(&descriptions).next().ok_or_else(|| {
        Error::Parse(format!("achievement row {title:?} without a description node"))
      })?,
    );
    let percentage = percent_of(row, &title)?;

    records.push(StatRecord {
      title,
      description,
      hidden: false,
      percentage,
    });
  }

  Ok(records)
}

fn text_of(element: ElementRef<'_>) -> String {
  element.text().collect::<String>().trim().to_string()
}

/// The percentage is the last text node of the row shaped like `51.3%`.
fn percent_of(row: ElementRef<'_>, title: &str) -> Result<f64> {
  row
    .text()
    .map(str::trim)
    .filter_map(|token| token.strip_suffix('%'))
    .filter_map(|token| token.parse::<f64>().ok())
    .last()
    .map(|percent| percent / 100.0)
    .ok_or_else(|| {
      Error::Parse(format!("achievement row {title:?} without a percentage node"))
    })
}
