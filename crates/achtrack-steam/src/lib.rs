//! Steam collaborators for achtrack.
//!
//! Implements the `achtrack-core` source traits against the public Steam
//! endpoints: the app catalog (`GetAppList`), the structured web API pair
//! (`GetSchemaForGame` + `GetGlobalAchievementPercentagesForApp`), and the
//! scraped community statistics page as a fallback strategy.

pub mod applist;
pub mod client;
pub mod config;
pub mod schema;
pub mod scrape;

pub use client::{FetchStrategy, SteamClient};
pub use config::Settings;
