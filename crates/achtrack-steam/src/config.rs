//! API-key settings file.
//!
//! The web API strategy needs a personal Steam key, read from a TOML file:
//!
//! ```toml
//! [steam_api]
//! api_key = "XXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX"
//! ```

use std::path::Path;

use achtrack_core::{Error, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  pub steam_api: SteamApiSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SteamApiSettings {
  pub api_key: String,
}

impl Settings {
  /// Read and parse the settings file. An absent file, unparseable TOML, or
  /// an empty key all surface as `MissingCredentials`.
  pub fn load(path: &Path) -> Result<Self> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
      Error::MissingCredentials(format!("{}: {e}", path.display()))
    })?;
    let settings: Settings = toml::from_str(&raw).map_err(|e| {
      Error::MissingCredentials(format!("{}: {e}", path.display()))
    })?;
    if settings.steam_api.api_key.is_empty() {
      return Err(Error::MissingCredentials(format!(
        "{}: empty api_key",
        path.display()
      )));
    }
    Ok(settings)
  }
}
