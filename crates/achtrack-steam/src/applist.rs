//! App catalog download: `ISteamApps/GetAppList/v2`.

use achtrack_core::{CatalogEntry, CatalogSource, Error, Result};
use serde::Deserialize;

use crate::client::{CATALOG_BASE, SteamClient};

#[derive(Debug, Deserialize)]
struct AppListResponse {
  applist: AppList,
}

#[derive(Debug, Deserialize)]
struct AppList {
  apps: Vec<RawApp>,
}

#[derive(Debug, Deserialize)]
struct RawApp {
  appid: u32,
  name:  String,
}

impl CatalogSource for SteamClient {
  /// Download the full name↔appid directory. Any transport or shape problem
  /// collapses into `CatalogUnavailable`; callers cannot do anything more
  /// granular with a broken catalog.
  async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>> {
    let url = format!("{CATALOG_BASE}/ISteamApps/GetAppList/v2/?format=json");

    let response = self
      .http()
      .get(&url)
      .send()
      .await
      .and_then(reqwest::Response::error_for_status)
      .map_err(|e| Error::CatalogUnavailable(e.to_string()))?;

    let payload: AppListResponse = response
      .json()
      .await
      .map_err(|e| Error::CatalogUnavailable(format!("malformed app list: {e}")))?;

    Ok(
      payload
        .applist
        .apps
        .into_iter()
        .map(|app| CatalogEntry { appid: app.appid, name: app.name })
        .collect(),
    )
  }
}
