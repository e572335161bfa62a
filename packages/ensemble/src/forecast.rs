//! Linear trend projection of a current score.

use chrono::Utc;
use climarisk_risk_models::{
    Coordinate, ForecastResult, PropertyContext, RiskBreakdown, RiskLevel, ScoreResult,
    YearForecast, round2,
};

use crate::LocationScorer;

/// Yearly growth of the trend factor.
pub const ANNUAL_TREND: f64 = 0.01;

/// Extra multiplier applied to heat on top of the trend factor.
pub const HEAT_ACCELERATION: f64 = 1.05;

/// Extra multiplier applied to groundwater on top of the trend factor.
pub const GROUNDWATER_ACCELERATION: f64 = 1.03;

/// Half-width of the confidence band as a fraction of the predicted score.
pub const CONFIDENCE_BAND: f64 = 0.1;

/// Multiplier applied to every score `year_offset` years out.
#[must_use]
pub fn trend_factor(year_offset: u32) -> f64 {
    1.0 + f64::from(year_offset) * ANNUAL_TREND
}

/// Scores `point` once and projects the result for each year in `years`.
///
/// Years are sorted ascending and duplicates dropped. The same covariates
/// apply to every projected year.
#[must_use]
pub fn forecast<S: LocationScorer + ?Sized>(
    scorer: &S,
    point: Coordinate,
    years: &[u32],
    context: &PropertyContext,
) -> ForecastResult {
    let current = scorer.score(point, context);

    let mut years = years.to_vec();
    years.sort_unstable();
    years.dedup();

    log::debug!(
        "Forecasting ({}, {}) from {} for {} year(s)",
        point.latitude,
        point.longitude,
        current.composite_score,
        years.len()
    );

    let forecasts = years
        .into_iter()
        .map(|year| project_year(&current, year))
        .collect();

    ForecastResult {
        forecasts,
        current_score: current.composite_score,
        forecasted_at: Utc::now(),
    }
}

/// Projects `current` forward by `year_offset` years.
///
/// Scores are capped at 100 but never floored. The confidence band is
/// `±10%` of the predicted score and is not clamped, so the upper edge may
/// exceed 100.
#[must_use]
pub fn project_year(current: &ScoreResult, year_offset: u32) -> YearForecast {
    let factor = trend_factor(year_offset);
    let predicted = (current.composite_score * factor).min(100.0);
    let interval = predicted * CONFIDENCE_BAND;

    YearForecast {
        year_offset,
        predicted_score: round2(predicted),
        predicted_level: RiskLevel::from_score(predicted),
        breakdown: project_breakdown(&current.breakdown, factor),
        confidence_interval_lower: round2(predicted - interval),
        confidence_interval_upper: round2(predicted + interval),
    }
}

fn project_breakdown(breakdown: &RiskBreakdown, factor: f64) -> RiskBreakdown {
    let project = |value: f64, acceleration: f64| round2((value * factor * acceleration).min(100.0));

    RiskBreakdown {
        flood: project(breakdown.flood, 1.0),
        heat: project(breakdown.heat, HEAT_ACCELERATION),
        drought: project(breakdown.drought, 1.0),
        groundwater: project(breakdown.groundwater, GROUNDWATER_ACCELERATION),
        rainfall: project(breakdown.rainfall, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use climarisk_risk_models::PropertyType;

    use super::*;
    use crate::EnsembleScorer;

    const DELHI: Coordinate = Coordinate::new(28.6139, 77.2090);

    fn fixed_score(composite_score: f64, component: f64) -> ScoreResult {
        ScoreResult {
            composite_score,
            breakdown: RiskBreakdown {
                flood: component,
                heat: component,
                drought: component,
                groundwater: component,
                rainfall: component,
            },
            risk_level: RiskLevel::from_score(composite_score),
            confidence: 1.0,
            calculated_at: Utc::now(),
        }
    }

    #[test]
    fn trend_factor_grows_one_percent_per_year() {
        assert!((trend_factor(0) - 1.0).abs() < f64::EPSILON);
        assert!((trend_factor(5) - 1.05).abs() < 1e-12);
        assert!((trend_factor(50) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn years_are_deduplicated_and_sorted() {
        let result = forecast(
            &EnsembleScorer::new(),
            DELHI,
            &[15, 5, 10, 10],
            &PropertyContext::default(),
        );
        let years: Vec<u32> = result.forecasts.iter().map(|f| f.year_offset).collect();
        assert_eq!(years, vec![5, 10, 15]);
    }

    #[test]
    fn forecast_is_deterministic_apart_from_timestamp() {
        let scorer = EnsembleScorer::new();
        let context = PropertyContext::of_type(PropertyType::Residential);
        let years = [5, 10, 20, 30];
        let a = forecast(&scorer, DELHI, &years, &context);
        let b = forecast(&scorer, DELHI, &years, &context);
        assert_eq!(a.forecasts, b.forecasts);
        assert!((a.current_score - b.current_score).abs() < f64::EPSILON);
    }

    #[test]
    fn later_years_never_predict_less() {
        let result = forecast(
            &EnsembleScorer::new(),
            DELHI,
            &[5, 10, 20, 50],
            &PropertyContext::default(),
        );
        assert!(result.current_score < 90.0);
        for pair in result.forecasts.windows(2) {
            assert!(pair[1].predicted_score >= pair[0].predicted_score);
        }
    }

    #[test]
    fn delhi_year_five() {
        let result = forecast(
            &EnsembleScorer::new(),
            DELHI,
            &[5],
            &PropertyContext::default(),
        );
        let year = &result.forecasts[0];
        // Heat 35.1 grows by the trend and the heat acceleration.
        assert!((year.breakdown.heat - 38.70).abs() < 1e-9, "got {}", year.breakdown.heat);
        // Flood 26.0 grows by the trend alone.
        assert!((year.breakdown.flood - 27.3).abs() < 1e-9, "got {}", year.breakdown.flood);
        let expected = round2(result.current_score * 1.05);
        assert!((year.predicted_score - expected).abs() < 1e-9);
    }

    #[test]
    fn heat_and_groundwater_outpace_the_trend() {
        let year = project_year(&fixed_score(40.0, 40.0), 10);
        // 40 * 1.1 = 44; heat 44 * 1.05 = 46.2; groundwater 44 * 1.03 = 45.32
        assert!((year.breakdown.flood - 44.0).abs() < 1e-9);
        assert!((year.breakdown.heat - 46.2).abs() < 1e-9);
        assert!((year.breakdown.groundwater - 45.32).abs() < 1e-9);
        assert!((year.breakdown.rainfall - 44.0).abs() < 1e-9);
    }

    #[test]
    fn saturates_at_one_hundred_with_unclamped_band() {
        let year = project_year(&fixed_score(95.0, 99.0), 30);
        assert!((year.predicted_score - 100.0).abs() < f64::EPSILON);
        assert_eq!(year.predicted_level, RiskLevel::Extreme);
        assert!((year.confidence_interval_lower - 90.0).abs() < 1e-9);
        assert!((year.confidence_interval_upper - 110.0).abs() < 1e-9);
        for value in year.breakdown.values() {
            assert!((value - 100.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn level_is_recomputed_from_projection() {
        // 48 * 1.05 = 50.4 crosses into high.
        let year = project_year(&fixed_score(48.0, 48.0), 5);
        assert_eq!(year.predicted_level, RiskLevel::High);
        assert!((year.confidence_interval_lower - 45.36).abs() < 1e-9);
        assert!((year.confidence_interval_upper - 55.44).abs() < 1e-9);
    }

    #[test]
    fn empty_year_list_yields_no_projections() {
        let result = forecast(&EnsembleScorer::new(), DELHI, &[], &PropertyContext::default());
        assert!(result.forecasts.is_empty());
    }
}
