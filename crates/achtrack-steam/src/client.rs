//! HTTP client wrapper shared by all Steam collaborators.

use std::time::Duration;

use achtrack_core::{Error, Result, StatRecord, StatSource};
use reqwest::Client;

pub(crate) const API_BASE: &str = "https://api.steampowered.com";
pub(crate) const CATALOG_BASE: &str = "http://api.steampowered.com";
pub(crate) const COMMUNITY_BASE: &str = "https://steamcommunity.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How [`SteamClient`] retrieves achievement stats.
///
/// One capability, two concrete strategies; callers pick one through
/// configuration rather than calling different functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStrategy {
  /// `GetSchemaForGame` joined with `GetGlobalAchievementPercentagesForApp`.
  /// Needs an API key; cross-checks the two result sets.
  #[default]
  WebApi,
  /// Scrape the rendered community statistics page. No key, no cross-check.
  CommunityHtml,
}

/// Client for the Steam web API and community site.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct SteamClient {
  http:     Client,
  api_key:  Option<String>,
  strategy: FetchStrategy,
}

impl SteamClient {
  /// Build a client with an explicit request timeout. `api_key` is only
  /// required by the [`FetchStrategy::WebApi`] strategy.
  pub fn new(strategy: FetchStrategy, api_key: Option<String>) -> Result<Self> {
    let http = Client::builder()
      .timeout(REQUEST_TIMEOUT)
      .user_agent(concat!("achtrack/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| Error::Transport(e.to_string()))?;
    Ok(Self { http, api_key, strategy })
  }

  pub fn strategy(&self) -> FetchStrategy {
    self.strategy
  }

  pub(crate) fn http(&self) -> &Client {
    &self.http
  }

  pub(crate) fn api_key(&self) -> Result<&str> {
    self
      .api_key
      .as_deref()
      .ok_or_else(|| Error::MissingCredentials("no API key configured".into()))
  }
}

/// Map a transport failure, keeping timeouts distinguishable.
pub(crate) fn transport(err: reqwest::Error) -> Error {
  if err.is_timeout() {
    Error::FetchTimeout
  } else {
    Error::Transport(err.to_string())
  }
}

impl StatSource for SteamClient {
  async fn fetch_stats(&self, appid: u32) -> Result<Vec<StatRecord>> {
    match self.strategy {
      FetchStrategy::WebApi => crate::schema::fetch_stats(self, appid).await,
      FetchStrategy::CommunityHtml => crate::scrape::fetch_stats(self, appid).await,
    }
  }
}
