//! Weighted ensemble of the four sub-models plus derived rainfall risk.

use chrono::Utc;
use climarisk_risk_models::{
    Coordinate, Covariates, PropertyContext, RiskBreakdown, RiskLevel, ScoreResult, round2,
};
use climarisk_submodels::{DroughtModel, FloodModel, GroundwaterModel, HeatModel, RiskModel};

use crate::LocationScorer;

/// Normalizer for the variance of five scores in `[0, 100]`.
const MAX_VARIANCE: f64 = 2500.0;

/// Lowest confidence the scorer reports, however much the components
/// disagree.
pub const MIN_CONFIDENCE: f64 = 0.5;

/// Combines the flood, heat, drought, and groundwater sub-models into a
/// single composite score.
///
/// The scorer is stateless: one shared instance or a fresh instance per
/// call behave identically.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnsembleScorer {
    flood: FloodModel,
    heat: HeatModel,
    drought: DroughtModel,
    groundwater: GroundwaterModel,
}

impl EnsembleScorer {
    /// Creates a scorer over the rule-based sub-models.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            flood: FloodModel,
            heat: HeatModel,
            drought: DroughtModel,
            groundwater: GroundwaterModel,
        }
    }

    /// Runs every sub-model and derives rainfall risk. Components are not
    /// rounded.
    #[must_use]
    pub fn breakdown(&self, point: Coordinate, covariates: &Covariates) -> RiskBreakdown {
        let drought = self.drought.assess(point, covariates);
        RiskBreakdown {
            flood: self.flood.assess(point, covariates),
            heat: self.heat.assess(point, covariates),
            drought,
            groundwater: self.groundwater.assess(point, covariates),
            rainfall: rainfall_risk(drought, point.latitude),
        }
    }

    /// Scores `point`, stamping the result with the current UTC time.
    ///
    /// The composite and confidence are computed from the unrounded
    /// components; the reported breakdown is rounded to two decimals.
    #[must_use]
    pub fn score(&self, point: Coordinate, context: &PropertyContext) -> ScoreResult {
        let breakdown = self.breakdown(point, &context.covariates);
        let composite_score = round2(breakdown.weighted_sum());
        let risk_level = RiskLevel::from_score(composite_score);
        let confidence = round2(confidence(&breakdown.values()));

        log::debug!(
            "Scored ({}, {}) as {} {risk_level} (confidence {confidence})",
            point.latitude,
            point.longitude,
            composite_score,
        );

        ScoreResult {
            composite_score,
            breakdown: breakdown.rounded(),
            risk_level,
            confidence,
            calculated_at: Utc::now(),
        }
    }
}

impl LocationScorer for EnsembleScorer {
    fn score(&self, point: Coordinate, context: &PropertyContext) -> ScoreResult {
        Self::score(self, point, context)
    }
}

/// Rainfall risk: 60% drought deficit plus 40% excess-rain exposure, where
/// the monsoon band `[20, 30]` latitude carries more excess-rain risk.
#[must_use]
#[allow(clippy::suboptimal_flops)]
pub fn rainfall_risk(drought_score: f64, latitude: f64) -> f64 {
    let excess_rainfall_risk = if (20.0..=30.0).contains(&latitude) {
        40.0
    } else {
        20.0
    };
    (drought_score * 0.6 + excess_rainfall_risk * 0.4).clamp(0.0, 100.0)
}

/// Agreement between component scores: `1 - variance / 2500`, clamped to
/// `[0.5, 1.0]`. Uses the population variance.
#[must_use]
pub fn confidence(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let n = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / n;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    let normalized_variance = (variance / MAX_VARIANCE).min(1.0);

    (1.0 - normalized_variance).clamp(MIN_CONFIDENCE, 1.0)
}
