//! Heat risk from latitude, urban heat islands, and population density.

use std::sync::LazyLock;

use climarisk_risk_models::{Coordinate, Covariates, RiskKind};
use serde::Deserialize;

use crate::regions::{self, Landmark};
use crate::{RiskModel, clamp_score};

/// Radius in degrees within which a point counts as part of a major city.
pub const URBAN_RADIUS_DEGREES: f64 = 0.5;

/// Density adjustment used when the caller supplies no density.
pub const DEFAULT_DENSITY_ADJUSTMENT: f64 = 8.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct HeatRegions {
    major_cities: Vec<Landmark>,
}

static HEAT_REGIONS: LazyLock<HeatRegions> =
    LazyLock::new(|| regions::parse_embedded(regions::HEAT_TOML));

/// Major cities used to infer urban status.
#[must_use]
pub fn major_cities() -> &'static [Landmark] {
    &HEAT_REGIONS.major_cities
}

/// Rule-based heat risk model.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeatModel;

impl HeatModel {
    /// Predicts heat risk in `[0, 100]`.
    ///
    /// When `is_urban` is `None` it is inferred from proximity to a major
    /// city. A `population_density` of `0` is treated the same as `None`.
    #[must_use]
    #[allow(clippy::suboptimal_flops)]
    pub fn predict(
        self,
        point: Coordinate,
        is_urban: Option<bool>,
        population_density: Option<f64>,
    ) -> f64 {
        let lat_risk = latitude_risk(point.latitude);
        let urban = is_urban.unwrap_or_else(|| is_likely_urban(point));
        let urban_adjustment = if urban { 25.0 } else { 10.0 };
        let density_adjustment = density_adjustment(population_density);
        let climate_adjustment = climate_zone_risk(point.latitude);

        let score = clamp_score(
            lat_risk * 0.3
                + urban_adjustment * 0.3
                + density_adjustment * 0.2
                + climate_adjustment * 0.2,
        );
        log::debug!(
            "Heat risk at ({}, {}): latitude={lat_risk} urban={urban} \
             density={density_adjustment} climate={climate_adjustment} -> {score}",
            point.latitude,
            point.longitude,
        );
        score
    }
}

impl RiskModel for HeatModel {
    fn kind(&self) -> RiskKind {
        RiskKind::Heat
    }

    fn assess(&self, point: Coordinate, covariates: &Covariates) -> f64 {
        self.predict(point, covariates.is_urban, covariates.population_density)
    }
}

/// Baseline by latitude: closer to the equator runs hotter.
#[must_use]
pub fn latitude_risk(latitude: f64) -> f64 {
    if latitude < 15.0 {
        70.0
    } else if latitude < 25.0 {
        60.0
    } else if latitude < 30.0 {
        50.0
    } else {
        40.0
    }
}

/// Whether `point` lies within [`URBAN_RADIUS_DEGREES`] of a major city.
#[must_use]
pub fn is_likely_urban(point: Coordinate) -> bool {
    regions::within_radius(major_cities(), point, URBAN_RADIUS_DEGREES)
}

/// Adjustment for people per square kilometer.
#[must_use]
pub fn density_adjustment(population_density: Option<f64>) -> f64 {
    match population_density.filter(|density| *density != 0.0) {
        None => DEFAULT_DENSITY_ADJUSTMENT,
        Some(density) if density > 10_000.0 => 15.0,
        Some(density) if density > 5_000.0 => 10.0,
        Some(_) => 5.0,
    }
}

/// Adjustment by climate zone: tropical, subtropical, temperate.
#[must_use]
pub fn climate_zone_risk(latitude: f64) -> f64 {
    if latitude < 23.5 {
        65.0
    } else if latitude < 30.0 {
        55.0
    } else {
        40.0
    }
}
