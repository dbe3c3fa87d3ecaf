//! External data provider interfaces
//!
//! The engine never fetches anything itself. Collaborators (scrapers, API
//! clients, manual feeds) implement these traits; any miss or transport
//! failure collapses to `None`/empty at this boundary and the engine
//! degrades instead of raising. Signal caching and TTL policy belong to
//! the implementations, never to the engine.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{DfsLine, Match};

pub mod sample;

/// Recent-form signal for one player, with the number of recent matches
/// that backed it
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlayerForm {
    pub multiplier: f64,
    pub sample_size: u32,
}

/// Strength signal for one team, with the number of recent matches that
/// backed it
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TeamRating {
    pub rating: f64,
    pub sample_size: u32,
}

/// Supplies per-player form and per-team strength signals
#[async_trait]
pub trait StatsProvider: Send + Sync {
    async fn player_form(&self, player_name: &str) -> Option<PlayerForm>;

    async fn team_rating(&self, team_name: &str) -> Option<TeamRating>;

    /// Active roster for a team. Backs the aggregator's per-side player
    /// iteration; `None` means the side is skipped for the cycle.
    async fn team_roster(&self, team_name: &str) -> Option<Vec<String>>;
}

/// Supplies current betting lines per player/stat across platforms
#[async_trait]
pub trait LineSource: Send + Sync {
    async fn current_lines(&self, player_name: &str, stat_type: &str) -> Vec<DfsLine>;
}

/// Supplies the upcoming match schedule
#[async_trait]
pub trait MatchSource: Send + Sync {
    async fn upcoming_matches(&self) -> Vec<Match>;
}
