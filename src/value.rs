//! Value Opportunity Detector
//!
//! Compares a projection against each platform's posted line for the same
//! player/stat and flags actionable disagreements. Low-confidence
//! projections never generate opportunities, however wide the gap.

use std::collections::HashMap;
use tracing::{debug, info};

use crate::models::{
    normalize_stat, round1, Config, DfsLine, OpportunityDirection, PlayerProjection,
    ValueOpportunity,
};

pub struct ValueDetector {
    default_threshold: f64,
    overrides: HashMap<String, f64>,
    confidence_floor: f64,
}

impl ValueDetector {
    pub fn new(config: &Config) -> Self {
        Self {
            default_threshold: config.opportunity_threshold,
            overrides: config.opportunity_overrides.clone(),
            confidence_floor: config.confidence_floor,
        }
    }

    fn threshold_for(&self, stat_type: &str) -> f64 {
        self.overrides
            .get(&normalize_stat(stat_type))
            .copied()
            .unwrap_or(self.default_threshold)
    }

    /// Evaluate a projection against the platform lines for the same
    /// player and stat type
    pub fn evaluate(
        &self,
        projection: &PlayerProjection,
        lines: &[DfsLine],
    ) -> Vec<ValueOpportunity> {
        if projection.confidence < self.confidence_floor {
            debug!(
                player = %projection.player_name,
                stat = %projection.stat_type,
                confidence = projection.confidence,
                "confidence below floor, suppressing value detection"
            );
            return Vec::new();
        }

        let threshold = self.threshold_for(&projection.stat_type);
        let mut opportunities = Vec::new();

        for line in lines {
            if normalize_stat(&line.stat_type) != projection.stat_type {
                continue;
            }

            let difference = projection.projected_value - line.line;
            if difference.abs() < threshold {
                continue;
            }

            let direction = if difference > 0.0 {
                OpportunityDirection::Over
            } else {
                OpportunityDirection::Under
            };

            info!(
                "💰 Value: {} {} {} {:.1} vs {:.1} ({:+.1}, {:.0}% confidence)",
                projection.player_name,
                projection.stat_type,
                direction.as_str(),
                projection.projected_value,
                line.line,
                difference,
                projection.confidence
            );

            opportunities.push(ValueOpportunity {
                player_name: projection.player_name.clone(),
                stat_type: projection.stat_type.clone(),
                platform: line.platform,
                projected_value: projection.projected_value,
                line: line.line,
                difference: round1(difference),
                direction,
                confidence: projection.confidence,
            });
        }

        opportunities
    }
}
