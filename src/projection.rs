//! Player Projection Model
//!
//! Combines a per-stat baseline rate, player form, and relative team
//! strength into an independent projected value with a confidence score.
//! Pure apart from provider lookups; any missing signal substitutes the
//! neutral multiplier so a projection is always producible.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::models::{normalize_stat, round1, Config, PlayerProjection, ProjectionInputs};
use crate::providers::StatsProvider;

/// Clamp bounds for form, team, and effective multipliers
const MULTIPLIER_MIN: f64 = 0.85;
const MULTIPLIER_MAX: f64 = 1.15;

/// Confidence scoring tiers
const CONFIDENCE_BASE: f64 = 70.0;
const CONFIDENCE_FORM_BONUS: f64 = 15.0;
const CONFIDENCE_TEAM_BONUS: f64 = 15.0;
const CONFIDENCE_CAP: f64 = 98.0;
/// Applied when both player and team signals fell back to neutral defaults
const CONFIDENCE_FLOOR: f64 = 50.0;

/// Recent matches a form signal needs before it earns its bonus
const FORM_SAMPLE_MIN: u32 = 5;
/// Recent matches a team rating needs before it earns its bonus
const TEAM_SAMPLE_MIN: u32 = 10;

pub struct ProjectionModel {
    stats: Arc<dyn StatsProvider>,
    baseline_rates: HashMap<String, f64>,
    default_baseline: f64,
}

impl ProjectionModel {
    pub fn new(stats: Arc<dyn StatsProvider>, config: &Config) -> Self {
        Self {
            stats,
            baseline_rates: config.baseline_rates.clone(),
            default_baseline: config.default_baseline,
        }
    }

    /// Baseline expected rate for a stat type
    fn baseline_for(&self, stat_type: &str) -> f64 {
        self.baseline_rates
            .get(&normalize_stat(stat_type))
            .copied()
            .unwrap_or(self.default_baseline)
    }

    /// Project one player stat for a match against the given opponent.
    ///
    /// `projected_value = baseline × form × clamp(team / opponent)`,
    /// rounded to one decimal. Confidence reflects how much real data
    /// backed the signals and always lands in [50, 98].
    pub async fn project(
        &self,
        player_name: &str,
        stat_type: &str,
        team: &str,
        opponent_team: &str,
    ) -> PlayerProjection {
        let baseline = self.baseline_for(stat_type);

        let form = self.stats.player_form(player_name).await;
        let team_rating = self.stats.team_rating(team).await;
        let opponent_rating = self.stats.team_rating(opponent_team).await;

        let form_multiplier = match form {
            Some(f) => clamp_multiplier(f.multiplier),
            None => {
                debug!(player = %player_name, "no form signal, using neutral multiplier");
                1.0
            }
        };

        let team_value = match team_rating {
            Some(r) => clamp_multiplier(r.rating),
            None => {
                debug!(team = %team, "no team rating, using neutral multiplier");
                1.0
            }
        };

        let opponent_value = match opponent_rating {
            Some(r) => clamp_multiplier(r.rating),
            None => 1.0,
        };

        // Stronger opponent dampens, weaker opponent boosts, same clamp
        let effective_multiplier = clamp_multiplier(team_value / opponent_value);

        let projected_value = round1(baseline * form_multiplier * effective_multiplier);

        let confidence = score_confidence(
            form.map(|f| f.sample_size),
            team_rating.map(|r| r.sample_size),
        );

        PlayerProjection {
            player_name: player_name.to_string(),
            team: team.to_string(),
            stat_type: normalize_stat(stat_type),
            projected_value,
            confidence,
            inputs: ProjectionInputs {
                baseline,
                form_multiplier,
                team_rating: team_value,
                opponent_rating: opponent_value,
            },
        }
    }
}

fn clamp_multiplier(value: f64) -> f64 {
    value.clamp(MULTIPLIER_MIN, MULTIPLIER_MAX)
}

/// Confidence from signal backing: floor when both signals defaulted,
/// base plus sample-backed bonuses otherwise, capped
fn score_confidence(form_samples: Option<u32>, team_samples: Option<u32>) -> f64 {
    if form_samples.is_none() && team_samples.is_none() {
        return CONFIDENCE_FLOOR;
    }

    let mut confidence = CONFIDENCE_BASE;

    if form_samples.map_or(false, |n| n >= FORM_SAMPLE_MIN) {
        confidence += CONFIDENCE_FORM_BONUS;
    }
    if team_samples.map_or(false, |n| n >= TEAM_SAMPLE_MIN) {
        confidence += CONFIDENCE_TEAM_BONUS;
    }

    confidence.min(CONFIDENCE_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{PlayerForm, TeamRating};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct StubStats {
        forms: HashMap<String, PlayerForm>,
        ratings: HashMap<String, TeamRating>,
    }

    impl StubStats {
        fn new() -> Self {
            Self {
                forms: HashMap::new(),
                ratings: HashMap::new(),
            }
        }

        fn with_form(mut self, player: &str, multiplier: f64, sample_size: u32) -> Self {
            self.forms.insert(
                player.to_string(),
                PlayerForm {
                    multiplier,
                    sample_size,
                },
            );
            self
        }

        fn with_rating(mut self, team: &str, rating: f64, sample_size: u32) -> Self {
            self.ratings.insert(
                team.to_string(),
                TeamRating {
                    rating,
                    sample_size,
                },
            );
            self
        }
    }

    #[async_trait]
    impl StatsProvider for StubStats {
        async fn player_form(&self, player_name: &str) -> Option<PlayerForm> {
            self.forms.get(player_name).copied()
        }

        async fn team_rating(&self, team_name: &str) -> Option<TeamRating> {
            self.ratings.get(team_name).copied()
        }

        async fn team_roster(&self, _team_name: &str) -> Option<Vec<String>> {
            None
        }
    }

    /// Config with a per-map kills baseline of 20.0 so the arithmetic in
    /// the scenarios below stays easy to follow
    fn test_config() -> Config {
        let mut config = Config::default();
        config.baseline_rates.insert("kills".to_string(), 20.0);
        config
    }

    fn model(stats: StubStats) -> ProjectionModel {
        ProjectionModel::new(Arc::new(stats), &test_config())
    }

    #[tokio::test]
    async fn projects_baseline_times_form_times_effective() {
        let stats = StubStats::new()
            .with_form("s1mple", 1.10, 8)
            .with_rating("Navi", 1.15, 14)
            .with_rating("ENCE", 1.0, 11);

        let projection = model(stats)
            .project("s1mple", "kills", "Navi", "ENCE")
            .await;

        // 20.0 × 1.10 × clamp(1.15 / 1.0) = 25.3
        assert_eq!(projection.projected_value, 25.3);
        assert_eq!(projection.inputs.baseline, 20.0);
        assert_eq!(projection.inputs.form_multiplier, 1.10);
        assert_eq!(projection.confidence, 98.0);
    }

    #[tokio::test]
    async fn effective_multiplier_is_clamped() {
        let stats = StubStats::new()
            .with_rating("Navi", 1.15, 14)
            .with_rating("Minnow", 0.85, 12);

        let projection = model(stats)
            .project("s1mple", "kills", "Navi", "Minnow")
            .await;

        // 1.15 / 0.85 = 1.35 clamps back to 1.15
        assert_eq!(projection.projected_value, 23.0);
    }

    #[tokio::test]
    async fn missing_signals_fall_back_to_neutral() {
        let projection = model(StubStats::new())
            .project("unknown", "kills", "TeamA", "TeamB")
            .await;

        assert_eq!(projection.projected_value, 20.0);
        assert_eq!(projection.inputs.form_multiplier, 1.0);
        assert_eq!(projection.inputs.team_rating, 1.0);
        assert_eq!(projection.confidence, 50.0);
    }

    #[tokio::test]
    async fn thin_samples_earn_no_bonus() {
        let stats = StubStats::new()
            .with_form("broky", 1.04, 3)
            .with_rating("FaZe", 1.12, 9);

        let projection = model(stats).project("broky", "kills", "FaZe", "G2").await;

        // Signals exist but neither is sample-backed enough for a bonus
        assert_eq!(projection.confidence, 70.0);
    }

    #[tokio::test]
    async fn confidence_stays_within_bounds() {
        let rich = StubStats::new()
            .with_form("a", 1.15, 50)
            .with_rating("T", 1.15, 50);
        let projection = model(rich).project("a", "kills", "T", "U").await;
        assert!(projection.confidence >= 50.0 && projection.confidence <= 98.0);
        assert_eq!(projection.confidence, 98.0);

        let poor = StubStats::new();
        let projection = model(poor).project("a", "kills", "T", "U").await;
        assert_eq!(projection.confidence, 50.0);
    }

    #[tokio::test]
    async fn unknown_stat_type_uses_default_baseline() {
        let projection = model(StubStats::new())
            .project("a", "utility damage", "T", "U")
            .await;

        assert_eq!(projection.inputs.baseline, 10.0);
        assert_eq!(projection.projected_value, 10.0);
    }
}
