use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// DFS platforms we track lines from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    PrizePicks,
    Underdog,
}

impl Platform {
    pub fn as_str(&self) -> &str {
        match self {
            Platform::PrizePicks => "prizepicks",
            Platform::Underdog => "underdog",
        }
    }

    /// Parse a platform name as it appears in upstream feeds
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "prizepicks" => Some(Platform::PrizePicks),
            "underdog" => Some(Platform::Underdog),
            _ => None,
        }
    }

    pub fn all() -> Vec<Platform> {
        vec![Platform::PrizePicks, Platform::Underdog]
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a line movement between two observations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementDirection {
    Up,
    Down,
    Flat,
    New,
}

impl MovementDirection {
    pub fn as_str(&self) -> &str {
        match self {
            MovementDirection::Up => "up",
            MovementDirection::Down => "down",
            MovementDirection::Flat => "flat",
            MovementDirection::New => "new",
        }
    }
}

/// Which side of the line a value opportunity recommends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityDirection {
    Over,
    Under,
}

impl OpportunityDirection {
    pub fn as_str(&self) -> &str {
        match self {
            OpportunityDirection::Over => "over",
            OpportunityDirection::Under => "under",
        }
    }
}

/// Normalize a stat type as it appears in upstream feeds ("Kills", " kills ")
pub fn normalize_stat(stat_type: &str) -> String {
    stat_type.trim().to_lowercase()
}

/// Identifies one tracked line series: (player, stat type, platform).
/// Player name and stat type are case-normalized on construction so
/// formatting differences upstream don't split a series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatKey {
    pub player_name: String,
    pub stat_type: String,
    pub platform: Platform,
}

impl StatKey {
    pub fn new(player_name: &str, stat_type: &str, platform: Platform) -> Self {
        Self {
            player_name: player_name.trim().to_lowercase(),
            stat_type: normalize_stat(stat_type),
            platform,
        }
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}",
            self.player_name,
            self.stat_type,
            self.platform.as_str()
        )
    }
}

/// A posted line from one DFS platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DfsLine {
    pub platform: Platform,
    pub stat_type: String,
    pub line: f64,
    pub observed_at: DateTime<Utc>,
}

/// Snapshot of the inputs that produced a projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionInputs {
    pub baseline: f64,
    pub form_multiplier: f64,
    pub team_rating: f64,
    pub opponent_rating: f64,
}

/// The model's own expected value for a player stat, independent of any
/// platform's line. Created fresh each refresh cycle, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerProjection {
    pub player_name: String,
    pub team: String,
    pub stat_type: String,
    pub projected_value: f64,
    pub confidence: f64,
    pub inputs: ProjectionInputs,
}

/// One appended line observation with its movement classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineMovementRecord {
    pub key: StatKey,
    pub previous_line: Option<f64>,
    pub current_line: f64,
    pub movement: f64,
    pub direction: MovementDirection,
    pub is_significant: bool,
    pub history_count: usize,
    pub last_updated: DateTime<Utc>,
}

/// A projection that disagrees with a platform's line by more than the
/// threshold, at sufficient confidence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueOpportunity {
    pub player_name: String,
    pub stat_type: String,
    pub platform: Platform,
    pub projected_value: f64,
    pub line: f64,
    pub difference: f64,
    pub direction: OpportunityDirection,
    pub confidence: f64,
}

/// Upcoming match metadata from the schedule source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub team1: String,
    pub team2: String,
    pub tournament: String,
    pub start_time: DateTime<Utc>,
    pub maps: Vec<String>,
}

/// A projection annotated with the platform lines it was compared against
/// and any value opportunities found
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedProjection {
    pub projection: PlayerProjection,
    pub lines: Vec<DfsLine>,
    pub opportunities: Vec<ValueOpportunity>,
}

/// One match with all annotated projections from the last refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchBundle {
    #[serde(rename = "match")]
    pub match_info: Match,
    pub projections: Vec<AnnotatedProjection>,
    pub last_updated: DateTime<Utc>,
}

/// Aggregate stats across the last completed refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total_matches: usize,
    pub total_projections: usize,
    pub value_opportunities: usize,
    pub avg_confidence: f64,
    pub last_refresh: Option<DateTime<Utc>>,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub refresh_interval_secs: u64,
    pub stat_types: Vec<String>,
    pub platforms: Vec<Platform>,
    /// Baseline expected rate per stat type, on the same scale as the
    /// quoted lines (historical average over the standard two-map slate)
    pub baseline_rates: HashMap<String, f64>,
    /// Baseline used for stat types with no configured rate
    pub default_baseline: f64,
    /// Absolute line-movement significance threshold, with per-stat overrides
    pub movement_abs_threshold: f64,
    pub movement_abs_overrides: HashMap<String, f64>,
    /// Relative line-movement significance threshold
    pub movement_rel_threshold: f64,
    /// Minimum |projection - line| to flag value, with per-stat overrides
    pub opportunity_threshold: f64,
    pub opportunity_overrides: HashMap<String, f64>,
    /// Projections below this confidence never generate opportunities
    pub confidence_floor: f64,
}

impl Default for Config {
    fn default() -> Self {
        let mut baseline_rates = HashMap::new();
        baseline_rates.insert("kills".to_string(), 36.0);
        baseline_rates.insert("headshots".to_string(), 16.0);

        Self {
            refresh_interval_secs: 300,
            stat_types: vec!["kills".to_string(), "headshots".to_string()],
            platforms: Platform::all(),
            baseline_rates,
            default_baseline: 10.0,
            movement_abs_threshold: 1.0,
            movement_abs_overrides: HashMap::new(),
            movement_rel_threshold: 0.08,
            opportunity_threshold: 1.5,
            opportunity_overrides: HashMap::new(),
            confidence_floor: 60.0,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let mut config = Config::default();

        if let Ok(v) = std::env::var("REFRESH_INTERVAL_SECS") {
            config.refresh_interval_secs = v.parse().unwrap_or(config.refresh_interval_secs);
        }

        if let Ok(v) = std::env::var("STAT_TYPES") {
            let parsed: Vec<String> = v
                .split(',')
                .map(normalize_stat)
                .filter(|s| !s.is_empty())
                .collect();
            if !parsed.is_empty() {
                config.stat_types = parsed;
            }
        }

        if let Ok(v) = std::env::var("PLATFORMS") {
            let parsed: Vec<Platform> = v.split(',').filter_map(Platform::parse).collect();
            if !parsed.is_empty() {
                config.platforms = parsed;
            }
        }

        if let Ok(v) = std::env::var("BASELINE_RATES") {
            for (stat, rate) in parse_stat_map(&v) {
                config.baseline_rates.insert(stat, rate);
            }
        }

        if let Ok(v) = std::env::var("MOVEMENT_ABS_THRESHOLD") {
            config.movement_abs_threshold = v.parse().unwrap_or(config.movement_abs_threshold);
        }

        if let Ok(v) = std::env::var("MOVEMENT_ABS_OVERRIDES") {
            config.movement_abs_overrides.extend(parse_stat_map(&v));
        }

        if let Ok(v) = std::env::var("MOVEMENT_REL_THRESHOLD") {
            config.movement_rel_threshold = v.parse().unwrap_or(config.movement_rel_threshold);
        }

        if let Ok(v) = std::env::var("OPPORTUNITY_THRESHOLD") {
            config.opportunity_threshold = v.parse().unwrap_or(config.opportunity_threshold);
        }

        if let Ok(v) = std::env::var("OPPORTUNITY_OVERRIDES") {
            config.opportunity_overrides.extend(parse_stat_map(&v));
        }

        if let Ok(v) = std::env::var("CONFIDENCE_FLOOR") {
            config.confidence_floor = v.parse().unwrap_or(config.confidence_floor);
        }

        Ok(config)
    }
}

/// Parse "kills=20.0,headshots=9.0" style env values
fn parse_stat_map(raw: &str) -> Vec<(String, f64)> {
    raw.split(',')
        .filter_map(|pair| {
            let (stat, value) = pair.split_once('=')?;
            let value: f64 = value.trim().parse().ok()?;
            Some((normalize_stat(stat), value))
        })
        .collect()
}

/// Round to one decimal, the precision lines are quoted at
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_key_normalizes_case() {
        let a = StatKey::new("S1mple", "Kills", Platform::PrizePicks);
        let b = StatKey::new("s1mple", "kills", Platform::PrizePicks);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "s1mple_kills_prizepicks");
    }

    #[test]
    fn stat_key_distinct_per_platform() {
        let a = StatKey::new("ZywOo", "kills", Platform::PrizePicks);
        let b = StatKey::new("ZywOo", "kills", Platform::Underdog);
        assert_ne!(a, b);
    }

    #[test]
    fn platform_parse_is_case_insensitive() {
        assert_eq!(Platform::parse("PrizePicks"), Some(Platform::PrizePicks));
        assert_eq!(Platform::parse(" UNDERDOG "), Some(Platform::Underdog));
        assert_eq!(Platform::parse("draftkings"), None);
    }

    #[test]
    fn parse_stat_map_skips_bad_pairs() {
        let parsed = parse_stat_map("kills=20.0,bogus,headshots=abc,Utility=3.5");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0], ("kills".to_string(), 20.0));
        assert_eq!(parsed[1], ("utility".to_string(), 3.5));
    }
}
