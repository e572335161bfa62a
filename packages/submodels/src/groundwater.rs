//! Groundwater depletion risk from known critical zones, agricultural
//! extraction, and recharge potential.

use std::sync::LazyLock;

use climarisk_risk_models::{Coordinate, Covariates, RiskKind};
use serde::Deserialize;

use crate::regions::{self, Landmark, RuleTable};
use crate::{RiskModel, clamp_score};

/// Radius in degrees within which a point counts as part of a major city.
pub const URBAN_RADIUS_DEGREES: f64 = 0.5;

/// Agricultural intensity of urban points outside every farming region.
pub const URBAN_AGRICULTURAL_INTENSITY: f64 = 30.0;

/// Region tables for the groundwater model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GroundwaterRegions {
    /// Known critical extraction zones.
    pub regional: RuleTable,
    /// Farming regions and their extraction intensity.
    pub agricultural_intensity: RuleTable,
    /// Recharge potential (higher recharges better).
    pub recharge_potential: RuleTable,
    /// Cities treated as low-agriculture.
    pub major_cities: Vec<Landmark>,
}

static GROUNDWATER_REGIONS: LazyLock<GroundwaterRegions> =
    LazyLock::new(|| regions::parse_embedded(regions::GROUNDWATER_TOML));

/// Returns the embedded groundwater region tables.
#[must_use]
pub fn groundwater_regions() -> &'static GroundwaterRegions {
    &GROUNDWATER_REGIONS
}

/// Rule-based groundwater risk model.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroundwaterModel;

impl GroundwaterModel {
    /// Predicts groundwater risk in `[0, 100]`.
    ///
    /// `_current_water_level` is accepted for interface stability but does
    /// not contribute to the score.
    #[must_use]
    #[allow(clippy::suboptimal_flops)]
    pub fn predict(self, point: Coordinate, _current_water_level: Option<f64>) -> f64 {
        let tables = groundwater_regions();
        let regional = tables.regional.evaluate(point);
        let agricultural = agricultural_intensity(point);
        let recharge = tables.recharge_potential.evaluate(point);

        let score = clamp_score(regional * 0.5 + agricultural * 0.3 + (100.0 - recharge) * 0.2);
        log::debug!(
            "Groundwater risk at ({}, {}): regional={regional} agricultural={agricultural} \
             recharge={recharge} -> {score}",
            point.latitude,
            point.longitude,
        );
        score
    }
}

impl RiskModel for GroundwaterModel {
    fn kind(&self) -> RiskKind {
        RiskKind::Groundwater
    }

    fn assess(&self, point: Coordinate, covariates: &Covariates) -> f64 {
        self.predict(point, covariates.current_water_level)
    }
}

/// Extraction intensity: farming regions first, then urban, then fallback.
#[must_use]
pub fn agricultural_intensity(point: Coordinate) -> f64 {
    let tables = groundwater_regions();
    tables
        .agricultural_intensity
        .lookup(point)
        .unwrap_or_else(|| {
            if is_likely_urban(point) {
                URBAN_AGRICULTURAL_INTENSITY
            } else {
                tables.agricultural_intensity.fallback
            }
        })
}

/// Whether `point` lies within [`URBAN_RADIUS_DEGREES`] of a major city.
#[must_use]
pub fn is_likely_urban(point: Coordinate) -> bool {
    regions::within_radius(&groundwater_regions().major_cities, point, URBAN_RADIUS_DEGREES)
}
