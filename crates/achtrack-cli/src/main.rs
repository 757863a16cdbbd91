//! `achtrack` — record global Steam achievement percentages over time.
//!
//! # Usage
//!
//! ```
//! achtrack search "sid meier"
//! achtrack resolve Valheim
//! achtrack track 1328670 --every 3600
//! achtrack track "Mass Effect Legendary Edition" --file mass_effect.csv
//! ```

use std::{path::PathBuf, time::Duration};

use achtrack_core::{Catalog, CatalogEntry, Resolution, Tracker};
use achtrack_steam::{FetchStrategy, Settings, SteamClient};
use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};
use tokio::time::MissedTickBehavior;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI surface ──────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
  name = "achtrack",
  about = "Track global Steam achievement percentages over time"
)]
struct Cli {
  /// TOML settings file holding the Steam API key.
  #[arg(long, value_name = "FILE", default_value = "api_settings.toml")]
  settings: PathBuf,

  /// Persisted app catalog file.
  #[arg(long, value_name = "FILE", default_value = "catalog.csv")]
  catalog: PathBuf,

  /// Scrape the community statistics page instead of the web API.
  /// Needs no API key, but reports no hidden flags.
  #[arg(long)]
  scrape: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Prefix-search the app catalog by game name.
  Search {
    query: String,
    /// Re-download the catalog before searching.
    #[arg(long)]
    refresh: bool,
  },

  /// Resolve an exact game name to its appid.
  Resolve { name: String },

  /// Re-download the app catalog.
  Refresh,

  /// Record percentage snapshots for one game.
  Track {
    /// Game name or numeric appid.
    game: String,

    /// History file to create/extend (default: `<appid>.csv`).
    #[arg(long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Keep running, recording a snapshot every SECONDS.
    #[arg(long, value_name = "SECONDS")]
    every: Option<u64>,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  match cli.command {
    Command::Search { ref query, refresh } => {
      let catalog = load_catalog(&cli, refresh).await?;
      let hits = catalog.search(query);
      if hits.is_empty() {
        println!("No games matching {query:?}.");
      } else {
        print_entries(&hits);
      }
    }

    Command::Resolve { ref name } => {
      let catalog = load_catalog(&cli, false).await?;
      match catalog.resolve(name) {
        Resolution::Unique(appid) => println!("{appid}"),
        Resolution::NotFound => bail!("no game named {name:?} in the catalog"),
        Resolution::Ambiguous(candidates) => {
          print_entries(&candidates);
          bail!("{name:?} matches {} games", candidates.len());
        }
      }
    }

    Command::Refresh => {
      let catalog = load_catalog(&cli, true).await?;
      println!("Catalog refreshed: {} games.", catalog.len());
    }

    Command::Track { ref game, ref file, every } => {
      let appid = resolve_game(&cli, game).await?;
      let path = file
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{appid}.csv")));
      let tracker = Tracker::new(stat_client(&cli)?);

      match every {
        None => {
          tracker.update(appid, &path).await?;
        }
        Some(seconds) => {
          tracing::info!(appid, seconds, "starting periodic updates");
          let mut ticker = tokio::time::interval(Duration::from_secs(seconds));
          ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
          loop {
            ticker.tick().await;
            // One bad cycle must not take the process down.
            if let Err(error) = tracker.update(appid, &path).await {
              tracing::error!(appid, %error, "update cycle failed");
            }
          }
        }
      }
    }
  }

  Ok(())
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Catalog fetches need no API key, so this client carries none.
async fn load_catalog(cli: &Cli, force_refresh: bool) -> anyhow::Result<Catalog> {
  let client = SteamClient::new(FetchStrategy::CommunityHtml, None)?;
  Catalog::load(&client, &cli.catalog, force_refresh)
    .await
    .with_context(|| format!("loading catalog {}", cli.catalog.display()))
}

/// Build the stat-fetching client for the configured strategy. Only the web
/// API strategy reads the settings file.
fn stat_client(cli: &Cli) -> anyhow::Result<SteamClient> {
  let client = if cli.scrape {
    SteamClient::new(FetchStrategy::CommunityHtml, None)?
  } else {
    let settings = Settings::load(&cli.settings)?;
    SteamClient::new(FetchStrategy::WebApi, Some(settings.steam_api.api_key))?
  };
  Ok(client)
}

/// Accept a numeric appid directly, otherwise resolve through the catalog.
async fn resolve_game(cli: &Cli, game: &str) -> anyhow::Result<u32> {
  if let Ok(appid) = game.parse::<u32>() {
    return Ok(appid);
  }

  let catalog = load_catalog(cli, false).await?;
  match catalog.resolve(game) {
    Resolution::Unique(appid) => Ok(appid),
    Resolution::NotFound => {
      bail!("no game named {game:?} in the catalog; try `achtrack search`")
    }
    Resolution::Ambiguous(candidates) => {
      print_entries(&candidates);
      bail!("{game:?} matches {} games; pass an appid instead", candidates.len())
    }
  }
}

fn print_entries(entries: &[CatalogEntry]) {
  println!("{:>8}  name", "appid");
  for entry in entries {
    println!("{:>8}  {}", entry.appid, entry.name);
  }
}
