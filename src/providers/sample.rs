//! In-memory sample data providers
//!
//! Seeded with a realistic tier-1 CS2 slate so the binary and tests can
//! drive full refresh cycles without any upstream connector. These perform
//! no I/O; real deployments swap in scraper-backed implementations of the
//! same traits.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use super::{LineSource, MatchSource, PlayerForm, StatsProvider, TeamRating};
use crate::models::{round1, DfsLine, Match, Platform, StatKey};

/// Team strength ratings, 1.0 = average field strength
const TEAM_RATINGS: &[(&str, f64, u32)] = &[
    ("navi", 1.15, 14),
    ("natus vincere", 1.15, 14),
    ("faze", 1.12, 12),
    ("vitality", 1.14, 15),
    ("g2", 1.10, 11),
    ("mouz", 1.08, 9),
    ("liquid", 1.05, 12),
    ("heroic", 1.03, 8),
    ("astralis", 1.02, 6),
    ("ence", 1.00, 11),
];

const ROSTERS: &[(&str, &[&str])] = &[
    ("navi", &["s1mple", "electronic", "b1t", "Aleksib", "iM"]),
    ("faze", &["rain", "karrigan", "ropz", "frozen", "broky"]),
    ("g2", &["NiKo", "huNter", "m0NESY", "HooXi", "jks"]),
    ("vitality", &["ZywOo", "apEX", "Magisk", "Spinx", "flameZ"]),
    ("liquid", &["EliGE", "NAF", "Twistzz", "nitr0", "oSee"]),
    ("mouz", &["frozen", "ropz", "JDC", "torzsi", "xertioN"]),
    ("heroic", &["cadiaN", "stavn", "TeSeS", "sjuush", "jabbi"]),
    ("astralis", &["BlameF", "k0nfig", "device", "Xyp9x", "br0"]),
];

/// Recent-form multipliers with the recent-match count behind each
const PLAYER_FORMS: &[(&str, f64, u32)] = &[
    ("s1mple", 1.12, 8),
    ("zywoo", 1.15, 10),
    ("niko", 1.10, 7),
    ("ropz", 1.08, 6),
    ("elige", 1.05, 5),
    ("b1t", 1.06, 5),
    ("rain", 0.95, 6),
    ("broky", 1.04, 3),
    ("twistzz", 1.07, 9),
    ("device", 1.02, 4),
];

/// PrizePicks Map1+Map2 kills lines; headshots and Underdog lines are
/// derived with fixed sample skews
const KILLS_LINES: &[(&str, f64)] = &[
    ("s1mple", 45.5),
    ("electronic", 38.5),
    ("b1t", 36.5),
    ("Aleksib", 28.5),
    ("iM", 34.5),
    ("rain", 35.5),
    ("karrigan", 26.5),
    ("ropz", 39.5),
    ("frozen", 38.5),
    ("broky", 37.5),
    ("ZywOo", 47.5),
    ("apEX", 29.5),
    ("Magisk", 35.5),
    ("Spinx", 36.5),
    ("flameZ", 34.5),
    ("EliGE", 42.5),
    ("NAF", 38.5),
    ("Twistzz", 39.5),
    ("nitr0", 30.5),
    ("oSee", 35.5),
];

/// Case-insensitive lookup with partial matching, so "FaZe Clan" and
/// "NATUS VINCERE" resolve to their seeded entries
fn lookup<'a, T>(map: &'a HashMap<String, T>, name: &str) -> Option<&'a T> {
    let needle = name.trim().to_lowercase();
    if let Some(value) = map.get(&needle) {
        return Some(value);
    }
    map.iter()
        .find(|(key, _)| needle.contains(key.as_str()) || key.contains(&needle))
        .map(|(_, value)| value)
}

pub struct SampleStatsProvider {
    team_ratings: HashMap<String, TeamRating>,
    rosters: HashMap<String, Vec<String>>,
    player_forms: HashMap<String, PlayerForm>,
}

impl SampleStatsProvider {
    pub fn new() -> Self {
        let team_ratings = TEAM_RATINGS
            .iter()
            .map(|(team, rating, sample_size)| {
                (
                    team.to_string(),
                    TeamRating {
                        rating: *rating,
                        sample_size: *sample_size,
                    },
                )
            })
            .collect();

        let rosters = ROSTERS
            .iter()
            .map(|(team, players)| {
                (
                    team.to_string(),
                    players.iter().map(|p| p.to_string()).collect(),
                )
            })
            .collect();

        let player_forms = PLAYER_FORMS
            .iter()
            .map(|(player, multiplier, sample_size)| {
                (
                    player.to_string(),
                    PlayerForm {
                        multiplier: *multiplier,
                        sample_size: *sample_size,
                    },
                )
            })
            .collect();

        Self {
            team_ratings,
            rosters,
            player_forms,
        }
    }
}

impl Default for SampleStatsProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatsProvider for SampleStatsProvider {
    async fn player_form(&self, player_name: &str) -> Option<PlayerForm> {
        lookup(&self.player_forms, player_name).copied()
    }

    async fn team_rating(&self, team_name: &str) -> Option<TeamRating> {
        lookup(&self.team_ratings, team_name).copied()
    }

    async fn team_roster(&self, team_name: &str) -> Option<Vec<String>> {
        lookup(&self.rosters, team_name).cloned()
    }
}

pub struct SampleLineSource {
    lines: RwLock<HashMap<StatKey, f64>>,
}

impl SampleLineSource {
    pub fn new() -> Self {
        let mut lines = HashMap::new();

        for (player, kills) in KILLS_LINES {
            let headshots = round1(kills * 0.45);
            lines.insert(StatKey::new(player, "kills", Platform::PrizePicks), *kills);
            lines.insert(
                StatKey::new(player, "kills", Platform::Underdog),
                kills + 1.0,
            );
            lines.insert(
                StatKey::new(player, "headshots", Platform::PrizePicks),
                headshots,
            );
            lines.insert(
                StatKey::new(player, "headshots", Platform::Underdog),
                round1(headshots - 0.5),
            );
        }

        Self {
            lines: RwLock::new(lines),
        }
    }

    /// Move a posted line, simulating the platform adjusting its board
    pub fn set_line(&self, player_name: &str, stat_type: &str, platform: Platform, line: f64) {
        let key = StatKey::new(player_name, stat_type, platform);
        self.lines.write().insert(key, line);
    }
}

impl Default for SampleLineSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LineSource for SampleLineSource {
    async fn current_lines(&self, player_name: &str, stat_type: &str) -> Vec<DfsLine> {
        let observed_at = Utc::now();
        let lines = self.lines.read();

        Platform::all()
            .into_iter()
            .filter_map(|platform| {
                let key = StatKey::new(player_name, stat_type, platform);
                lines.get(&key).map(|line| DfsLine {
                    platform,
                    stat_type: key.stat_type.clone(),
                    line: *line,
                    observed_at,
                })
            })
            .collect()
    }
}

pub struct SampleMatchSource {
    matches: Vec<Match>,
}

impl SampleMatchSource {
    pub fn new() -> Self {
        let matches = vec![
            Match {
                id: Uuid::new_v4().to_string(),
                team1: "Navi".to_string(),
                team2: "FaZe Clan".to_string(),
                tournament: "IEM Katowice 2025".to_string(),
                start_time: Utc::now() + Duration::hours(3),
                maps: vec!["Mirage".to_string(), "Inferno".to_string()],
            },
            Match {
                id: Uuid::new_v4().to_string(),
                team1: "Vitality".to_string(),
                team2: "Liquid".to_string(),
                tournament: "BLAST Premier".to_string(),
                start_time: Utc::now() + Duration::hours(6),
                maps: vec!["Nuke".to_string(), "Ancient".to_string()],
            },
        ];

        Self { matches }
    }
}

impl Default for SampleMatchSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MatchSource for SampleMatchSource {
    async fn upcoming_matches(&self) -> Vec<Match> {
        self.matches.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn team_lookup_matches_partial_names() {
        let stats = SampleStatsProvider::new();

        let exact = stats.team_rating("navi").await.unwrap();
        let branded = stats.team_rating("FaZe Clan").await.unwrap();
        let full = stats.team_rating("NATUS VINCERE").await.unwrap();

        assert_eq!(exact.rating, 1.15);
        assert_eq!(branded.rating, 1.12);
        assert_eq!(full.rating, 1.15);
        assert!(stats.team_rating("Cloud9").await.is_none());
    }

    #[tokio::test]
    async fn rosters_resolve_for_match_team_names() {
        let stats = SampleStatsProvider::new();

        let navi = stats.team_roster("Navi").await.unwrap();
        assert_eq!(navi.len(), 5);
        assert!(navi.contains(&"s1mple".to_string()));
        assert!(stats.team_roster("Unknown Org").await.is_none());
    }

    #[tokio::test]
    async fn line_source_covers_both_platforms() {
        let source = SampleLineSource::new();

        let lines = source.current_lines("s1mple", "kills").await;
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().any(|l| l.platform == Platform::PrizePicks));
        assert!(lines.iter().any(|l| l.platform == Platform::Underdog));

        let none = source.current_lines("nobody", "kills").await;
        assert!(none.is_empty());
    }
}
