//! Drought risk from precipitation, aridity, and monsoon dependency.

use std::sync::LazyLock;

use climarisk_risk_models::{Coordinate, Covariates, RiskKind};
use serde::Deserialize;

use crate::regions::{self, RuleTable};
use crate::{RiskModel, clamp_score};

/// Region tables for the drought model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DroughtRegions {
    /// Precipitation risk estimated by region when no measurement exists.
    pub precipitation: RuleTable,
    /// Aridity tiers.
    pub aridity: RuleTable,
    /// Monsoon dependency tiers.
    pub monsoon_dependency: RuleTable,
}

static DROUGHT_REGIONS: LazyLock<DroughtRegions> =
    LazyLock::new(|| regions::parse_embedded(regions::DROUGHT_TOML));

/// Returns the embedded drought region tables.
#[must_use]
pub fn drought_regions() -> &'static DroughtRegions {
    &DROUGHT_REGIONS
}

/// Rule-based drought risk model.
#[derive(Debug, Clone, Copy, Default)]
pub struct DroughtModel;

impl DroughtModel {
    /// Predicts drought risk in `[0, 100]`.
    ///
    /// An `annual_precipitation` of `0` is treated the same as `None` and
    /// falls back to the regional estimate.
    #[must_use]
    #[allow(clippy::suboptimal_flops)]
    pub fn predict(self, point: Coordinate, annual_precipitation: Option<f64>) -> f64 {
        let tables = drought_regions();
        let prec_risk = match annual_precipitation.filter(|mm| *mm != 0.0) {
            Some(mm) => precipitation_risk(mm),
            None => tables.precipitation.evaluate(point),
        };
        let aridity_risk = tables.aridity.evaluate(point);
        let monsoon_dependency = tables.monsoon_dependency.evaluate(point);

        let score =
            clamp_score(prec_risk * 0.5 + aridity_risk * 0.3 + monsoon_dependency * 0.2);
        log::debug!(
            "Drought risk at ({}, {}): precipitation={prec_risk} aridity={aridity_risk} \
             monsoon={monsoon_dependency} -> {score}",
            point.latitude,
            point.longitude,
        );
        score
    }
}

impl RiskModel for DroughtModel {
    fn kind(&self) -> RiskKind {
        RiskKind::Drought
    }

    fn assess(&self, point: Coordinate, covariates: &Covariates) -> f64 {
        self.predict(point, covariates.annual_precipitation)
    }
}

/// Buckets measured annual precipitation in millimeters.
#[must_use]
pub fn precipitation_risk(annual_precipitation: f64) -> f64 {
    if annual_precipitation < 400.0 {
        85.0
    } else if annual_precipitation < 600.0 {
        70.0
    } else if annual_precipitation < 800.0 {
        55.0
    } else if annual_precipitation < 1200.0 {
        40.0
    } else {
        25.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELHI: Coordinate = Coordinate::new(28.6139, 77.2090);

    #[test]
    fn loads_all_tables() {
        let tables = drought_regions();
        assert_eq!(tables.precipitation.rules.len(), 4);
        assert_eq!(tables.aridity.rules.len(), 2);
        assert_eq!(tables.monsoon_dependency.rules.len(), 2);
    }

    #[test]
    fn precipitation_buckets() {
        assert!((precipitation_risk(399.0) - 85.0).abs() < f64::EPSILON);
        assert!((precipitation_risk(400.0) - 70.0).abs() < f64::EPSILON);
        assert!((precipitation_risk(600.0) - 55.0).abs() < f64::EPSILON);
        assert!((precipitation_risk(800.0) - 40.0).abs() < f64::EPSILON);
        assert!((precipitation_risk(1200.0) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn regional_precipitation_estimates() {
        let table = &drought_regions().precipitation;
        assert!((table.evaluate(Coordinate::new(27.0, 71.0)) - 75.0).abs() < f64::EPSILON);
        assert!((table.evaluate(Coordinate::new(22.0, 80.0)) - 50.0).abs() < f64::EPSILON);
        assert!((table.evaluate(Coordinate::new(26.0, 92.0)) - 25.0).abs() < f64::EPSILON);
        assert!((table.evaluate(Coordinate::new(12.0, 77.0)) - 40.0).abs() < f64::EPSILON);
        assert!((table.evaluate(DELHI) - 45.0).abs() < f64::EPSILON);
    }

    #[test]
    fn delhi_without_covariates() {
        // 0.5*45 + 0.3*30 + 0.2*50
        let score = DroughtModel.predict(DELHI, None);
        assert!((score - 41.5).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn measured_precipitation_overrides_region() {
        let score = DroughtModel.predict(DELHI, Some(300.0));
        assert!((score - 61.5).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn zero_precipitation_uses_regional_estimate() {
        let zero = DroughtModel.predict(DELHI, Some(0.0));
        let absent = DroughtModel.predict(DELHI, None);
        assert!((zero - absent).abs() < f64::EPSILON);
    }

    #[test]
    fn thar_desert_is_highest_tier() {
        // Western arid precipitation (75), arid aridity (80), moderate
        // monsoon dependency (50): 37.5 + 24 + 10.
        let score = DroughtModel.predict(Coordinate::new(27.0, 71.0), None);
        assert!((score - 71.5).abs() < 1e-9, "got {score}");
    }
}
