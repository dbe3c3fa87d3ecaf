//! Line Movement Tracker
//!
//! Appends every line observation to a per-key history, classifies the
//! move against the prior observation, and serves the current-movement
//! views the dashboard reads. History is append-only and unbounded within
//! a process run; retention is the caller's concern.

pub mod line_store;

pub use line_store::LineStore;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::info;

use crate::models::{
    normalize_stat, Config, DfsLine, LineMovementRecord, MovementDirection, StatKey,
};

/// Guard for the relative significance test when the previous line is ~0
const RELATIVE_EPSILON: f64 = 1e-9;

/// Summary counts across everything the tracker has seen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerSummary {
    pub tracked_players: usize,
    pub tracked_keys: usize,
    pub total_movements: usize,
    pub total_significant: usize,
}

pub struct MovementTracker {
    store: Arc<LineStore>,
    history: RwLock<HashMap<StatKey, Vec<LineMovementRecord>>>,
    abs_threshold: f64,
    abs_overrides: HashMap<String, f64>,
    rel_threshold: f64,
}

impl MovementTracker {
    pub fn new(store: Arc<LineStore>, config: &Config) -> Self {
        Self {
            store,
            history: RwLock::new(HashMap::new()),
            abs_threshold: config.movement_abs_threshold,
            abs_overrides: config.movement_abs_overrides.clone(),
            rel_threshold: config.movement_rel_threshold,
        }
    }

    fn abs_threshold_for(&self, stat_type: &str) -> f64 {
        self.abs_overrides
            .get(&normalize_stat(stat_type))
            .copied()
            .unwrap_or(self.abs_threshold)
    }

    /// Record one line observation: diff against the stored current line,
    /// classify, append to the key's history, and advance the current
    /// pointer. Returns the appended record.
    pub fn record(
        &self,
        key: StatKey,
        new_line: f64,
        observed_at: DateTime<Utc>,
    ) -> LineMovementRecord {
        let displaced = self.store.set_current(
            key.clone(),
            DfsLine {
                platform: key.platform,
                stat_type: key.stat_type.clone(),
                line: new_line,
                observed_at,
            },
        );
        let previous_line = displaced.map(|l| l.line);

        let (movement, direction) = match previous_line {
            None => (0.0, MovementDirection::New),
            Some(previous) => {
                let delta = new_line - previous;
                let direction = if delta > 0.0 {
                    MovementDirection::Up
                } else if delta < 0.0 {
                    MovementDirection::Down
                } else {
                    MovementDirection::Flat
                };
                (delta, direction)
            }
        };

        // A 1.0-point move matters more on a line of 10 than a line of 40,
        // so both an absolute and a relative test apply
        let is_significant = match previous_line {
            None => false,
            Some(previous) => {
                movement.abs() >= self.abs_threshold_for(&key.stat_type)
                    || movement.abs() / previous.max(RELATIVE_EPSILON) >= self.rel_threshold
            }
        };

        let mut history = self.history.write();
        let entries = history.entry(key.clone()).or_default();

        let record = LineMovementRecord {
            key,
            previous_line,
            current_line: new_line,
            movement,
            direction,
            is_significant,
            history_count: entries.len() + 1,
            last_updated: observed_at,
        };
        entries.push(record.clone());
        drop(history);

        if record.is_significant {
            info!(
                "📊 Significant line move: {} {} {:+.1} → {:.1}",
                record.key,
                record.direction.as_str(),
                record.movement,
                record.current_line
            );
        }

        record
    }

    /// Latest record per tracked key
    pub fn all_current(&self) -> Vec<LineMovementRecord> {
        self.history
            .read()
            .values()
            .filter_map(|entries| entries.last().cloned())
            .collect()
    }

    /// Latest records whose last move was significant, largest move first
    pub fn significant(&self) -> Vec<LineMovementRecord> {
        let mut records: Vec<LineMovementRecord> = self
            .all_current()
            .into_iter()
            .filter(|r| r.is_significant)
            .collect();
        records.sort_by(|a, b| {
            b.movement
                .abs()
                .partial_cmp(&a.movement.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        records
    }

    /// Full ordered history for one key
    pub fn history(&self, key: &StatKey) -> Vec<LineMovementRecord> {
        self.history.read().get(key).cloned().unwrap_or_default()
    }

    pub fn summary(&self) -> TrackerSummary {
        let history = self.history.read();

        let tracked_players: HashSet<&str> = history
            .keys()
            .map(|key| key.player_name.as_str())
            .collect();
        let total_movements = history.values().map(|entries| entries.len()).sum();
        let total_significant = history
            .values()
            .flatten()
            .filter(|r| r.is_significant)
            .count();

        TrackerSummary {
            tracked_players: tracked_players.len(),
            tracked_keys: history.len(),
            total_movements,
            total_significant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Platform;

    fn tracker() -> MovementTracker {
        MovementTracker::new(Arc::new(LineStore::new()), &Config::default())
    }

    fn key(player: &str) -> StatKey {
        StatKey::new(player, "kills", Platform::PrizePicks)
    }

    #[test]
    fn first_observation_is_new_with_zero_movement() {
        let tracker = tracker();
        let record = tracker.record(key("s1mple"), 45.5, Utc::now());

        assert_eq!(record.direction, MovementDirection::New);
        assert_eq!(record.movement, 0.0);
        assert!(record.previous_line.is_none());
        assert!(!record.is_significant);
        assert_eq!(record.history_count, 1);
    }

    #[test]
    fn movement_equals_current_minus_previous() {
        let tracker = tracker();
        let k = key("s1mple");

        tracker.record(k.clone(), 42.5, Utc::now());
        let up = tracker.record(k.clone(), 45.5, Utc::now());
        assert_eq!(up.movement, 3.0);
        assert_eq!(up.direction, MovementDirection::Up);
        assert_eq!(up.previous_line, Some(42.5));

        let down = tracker.record(k.clone(), 44.0, Utc::now());
        assert_eq!(down.movement, -1.5);
        assert_eq!(down.direction, MovementDirection::Down);
    }

    #[test]
    fn repeat_observation_is_flat_not_new() {
        let tracker = tracker();
        let k = key("ropz");
        let now = Utc::now();

        tracker.record(k.clone(), 39.5, now);
        let repeat = tracker.record(k.clone(), 39.5, now);

        assert_eq!(repeat.direction, MovementDirection::Flat);
        assert_eq!(repeat.movement, 0.0);
        assert!(!repeat.is_significant);
        assert_eq!(repeat.history_count, 2);
    }

    #[test]
    fn history_count_tracks_appends() {
        let tracker = tracker();
        let k = key("ZywOo");

        for (i, line) in [47.5, 48.0, 46.5, 46.5].into_iter().enumerate() {
            let record = tracker.record(k.clone(), line, Utc::now());
            assert_eq!(record.history_count, i + 1);
        }
        assert_eq!(tracker.history(&k).len(), 4);
    }

    #[test]
    fn absolute_threshold_flags_significance() {
        let tracker = tracker();
        let k = key("s1mple");

        tracker.record(k.clone(), 42.5, Utc::now());
        // 3.0 / 42.5 = 0.071 < 0.08 relative, but 3.0 >= 1.0 absolute
        let record = tracker.record(k.clone(), 45.5, Utc::now());
        assert!(record.is_significant);
    }

    #[test]
    fn relative_threshold_flags_small_lines() {
        let tracker = tracker();
        let k = StatKey::new("Aleksib", "headshots", Platform::Underdog);

        tracker.record(k.clone(), 10.0, Utc::now());
        // 0.8 below the 1.0 absolute threshold, but 0.8 / 10.0 = 0.08
        let record = tracker.record(k.clone(), 10.8, Utc::now());
        assert!(record.is_significant);

        tracker.record(k.clone(), 10.8, Utc::now());
        // 0.5 / 10.8 = 0.046, under both tests
        let calm = tracker.record(k.clone(), 11.3, Utc::now());
        assert!(!calm.is_significant);
    }

    #[test]
    fn per_stat_override_widens_threshold() {
        let mut config = Config::default();
        config
            .movement_abs_overrides
            .insert("kills".to_string(), 3.0);
        // Relative test would trip at 8%, keep it out of the way here
        config.movement_rel_threshold = 0.5;
        let tracker = MovementTracker::new(Arc::new(LineStore::new()), &config);
        let k = key("frozen");

        tracker.record(k.clone(), 38.5, Utc::now());
        assert!(!tracker.record(k.clone(), 40.5, Utc::now()).is_significant);
        assert!(tracker.record(k.clone(), 44.0, Utc::now()).is_significant);
    }

    #[test]
    fn current_views_and_summary() {
        let tracker = tracker();

        tracker.record(key("s1mple"), 42.5, Utc::now());
        tracker.record(key("s1mple"), 45.5, Utc::now());
        tracker.record(key("ropz"), 39.5, Utc::now());
        tracker.record(
            StatKey::new("s1mple", "headshots", Platform::PrizePicks),
            19.5,
            Utc::now(),
        );

        let current = tracker.all_current();
        assert_eq!(current.len(), 3);

        let significant = tracker.significant();
        assert_eq!(significant.len(), 1);
        assert_eq!(significant[0].key.player_name, "s1mple");

        let summary = tracker.summary();
        assert_eq!(summary.tracked_players, 2);
        assert_eq!(summary.tracked_keys, 3);
        assert_eq!(summary.total_movements, 4);
        assert_eq!(summary.total_significant, 1);
    }

    #[test]
    fn significant_sorts_by_move_size() {
        let tracker = tracker();
        let a = key("s1mple");
        let b = key("ropz");

        tracker.record(a.clone(), 40.0, Utc::now());
        tracker.record(a.clone(), 41.5, Utc::now());
        tracker.record(b.clone(), 40.0, Utc::now());
        tracker.record(b.clone(), 44.0, Utc::now());

        let significant = tracker.significant();
        assert_eq!(significant.len(), 2);
        assert_eq!(significant[0].key.player_name, "ropz");
        assert_eq!(significant[0].movement, 4.0);
    }
}
