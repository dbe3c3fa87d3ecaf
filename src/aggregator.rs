//! Refresh Cycle Aggregator
//!
//! Orchestrates one refresh: for every upcoming match, projects each
//! rostered player's stats, records the platform lines into the movement
//! tracker, evaluates value opportunities, and publishes the bundle
//! snapshot the dashboard reads. One player's missing data never aborts
//! the rest of the cycle.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

use crate::manual::{parse_manual_batch, BatchReport};
use crate::models::{
    round1, AggregateStats, AnnotatedProjection, Config, DfsLine, LineMovementRecord, Match,
    MatchBundle, Platform, StatKey,
};
use crate::projection::ProjectionModel;
use crate::providers::{LineSource, MatchSource, StatsProvider};
use crate::tracker::{LineStore, MovementTracker, TrackerSummary};
use crate::value::ValueDetector;

pub struct Aggregator {
    config: Config,
    stats: Arc<dyn StatsProvider>,
    line_source: Arc<dyn LineSource>,
    match_source: Arc<dyn MatchSource>,
    model: ProjectionModel,
    detector: ValueDetector,
    line_store: Arc<LineStore>,
    tracker: Arc<MovementTracker>,
    bundles: RwLock<Vec<MatchBundle>>,
    last_refresh: RwLock<Option<DateTime<Utc>>>,
}

impl Aggregator {
    pub fn new(
        config: Config,
        stats: Arc<dyn StatsProvider>,
        line_source: Arc<dyn LineSource>,
        match_source: Arc<dyn MatchSource>,
    ) -> Self {
        let line_store = Arc::new(LineStore::new());
        let tracker = Arc::new(MovementTracker::new(line_store.clone(), &config));
        let model = ProjectionModel::new(stats.clone(), &config);
        let detector = ValueDetector::new(&config);

        Self {
            config,
            stats,
            line_source,
            match_source,
            model,
            detector,
            line_store,
            tracker,
            bundles: RwLock::new(Vec::new()),
            last_refresh: RwLock::new(None),
        }
    }

    /// Pull the upcoming schedule and run a full refresh with the
    /// configured stat types and platforms
    pub async fn run_refresh(&self) -> AggregateStats {
        let matches = self.match_source.upcoming_matches().await;
        info!("🔄 Refresh cycle starting: {} matches", matches.len());

        let stat_types = self.config.stat_types.clone();
        let platforms = self.config.platforms.clone();
        self.refresh(&matches, &stat_types, &platforms).await;

        let stats = self.aggregate_stats();
        info!(
            "✅ Refresh complete: {} projections, {} value opportunities, avg confidence {:.1}",
            stats.total_projections, stats.value_opportunities, stats.avg_confidence
        );
        stats
    }

    /// Process the given matches and publish a fresh bundle snapshot.
    /// Readers keep seeing the prior complete snapshot until the swap.
    pub async fn refresh(
        &self,
        matches: &[Match],
        stat_types: &[String],
        platforms: &[Platform],
    ) -> Vec<MatchBundle> {
        let now = Utc::now();
        let mut bundles = Vec::with_capacity(matches.len());

        for m in matches {
            let projections = self.process_match(m, stat_types, platforms).await;
            bundles.push(MatchBundle {
                match_info: m.clone(),
                projections,
                last_updated: now,
            });
        }

        *self.bundles.write() = bundles.clone();
        *self.last_refresh.write() = Some(now);

        bundles
    }

    /// Project and annotate every rostered player on both sides of a match
    async fn process_match(
        &self,
        m: &Match,
        stat_types: &[String],
        platforms: &[Platform],
    ) -> Vec<AnnotatedProjection> {
        let mut projections = Vec::new();

        let sides = [(&m.team1, &m.team2), (&m.team2, &m.team1)];
        for (team, opponent) in sides {
            let roster = match self.stats.team_roster(team).await {
                Some(roster) => roster,
                None => {
                    warn!(
                        team = %team,
                        match_id = %m.id,
                        "no roster available, skipping side"
                    );
                    continue;
                }
            };

            for player in &roster {
                for stat_type in stat_types {
                    let annotated = self
                        .process_player_stat(player, stat_type, team, opponent, platforms)
                        .await;
                    projections.push(annotated);
                }
            }
        }

        projections
    }

    async fn process_player_stat(
        &self,
        player: &str,
        stat_type: &str,
        team: &str,
        opponent: &str,
        platforms: &[Platform],
    ) -> AnnotatedProjection {
        let projection = self.model.project(player, stat_type, team, opponent).await;

        let lines: Vec<DfsLine> = self
            .line_source
            .current_lines(player, stat_type)
            .await
            .into_iter()
            .filter(|line| platforms.contains(&line.platform))
            .collect();

        for line in &lines {
            let key = StatKey::new(player, stat_type, line.platform);
            self.tracker.record(key, line.line, line.observed_at);
        }

        let opportunities = self.detector.evaluate(&projection, &lines);

        AnnotatedProjection {
            projection,
            lines,
            opportunities,
        }
    }

    /// Feed one platform's manually pasted board into the tracker as if
    /// it came from the line source. Malformed rows are reported, never
    /// fatal.
    pub fn apply_manual_lines(&self, platform: Platform, raw: &str) -> BatchReport {
        let (accepted, rejected) = parse_manual_batch(raw);
        let observed_at = Utc::now();

        for entry in &accepted {
            let key = StatKey::new(&entry.player_name, &entry.stat_type, platform);
            self.tracker.record(key, entry.line, observed_at);
        }

        let report = BatchReport {
            platform,
            accepted_count: accepted.len(),
            rejected_count: rejected.len(),
            rejected,
        };

        info!(
            "📥 Manual {} batch: {} accepted, {} rejected",
            platform, report.accepted_count, report.rejected_count
        );

        report
    }

    /// All match bundles from the last completed refresh
    pub fn bundles(&self) -> Vec<MatchBundle> {
        self.bundles.read().clone()
    }

    /// One match bundle by id
    pub fn bundle(&self, match_id: &str) -> Option<MatchBundle> {
        self.bundles
            .read()
            .iter()
            .find(|b| b.match_info.id == match_id)
            .cloned()
    }

    pub fn aggregate_stats(&self) -> AggregateStats {
        let bundles = self.bundles.read();

        let total_projections: usize = bundles.iter().map(|b| b.projections.len()).sum();
        let value_opportunities: usize = bundles
            .iter()
            .flat_map(|b| &b.projections)
            .map(|p| p.opportunities.len())
            .sum();
        let confidence_sum: f64 = bundles
            .iter()
            .flat_map(|b| &b.projections)
            .map(|p| p.projection.confidence)
            .sum();
        let avg_confidence = if total_projections > 0 {
            round1(confidence_sum / total_projections as f64)
        } else {
            0.0
        };

        AggregateStats {
            total_matches: bundles.len(),
            total_projections,
            value_opportunities,
            avg_confidence,
            last_refresh: *self.last_refresh.read(),
        }
    }

    /// Latest movement record per tracked line series
    pub fn movements(&self) -> Vec<LineMovementRecord> {
        self.tracker.all_current()
    }

    /// Only the significant ones, largest move first
    pub fn significant_movements(&self) -> Vec<LineMovementRecord> {
        self.tracker.significant()
    }

    pub fn tracker_summary(&self) -> TrackerSummary {
        self.tracker.summary()
    }

    pub fn line_store(&self) -> &Arc<LineStore> {
        &self.line_store
    }

    pub fn tracker(&self) -> &Arc<MovementTracker> {
        &self.tracker
    }
}
