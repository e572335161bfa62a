//! Flood risk from elevation, coastal exposure, and river proximity.

use std::sync::LazyLock;

use climarisk_risk_models::{Coordinate, Covariates, RiskKind};
use serde::Deserialize;

use crate::regions::{self, Landmark, LatitudeBand, LongitudeBand};
use crate::{RiskModel, clamp_score};

/// Elevation risk used when the caller supplies no elevation.
pub const DEFAULT_ELEVATION_RISK: f64 = 40.0;

/// Coastal contribution before weighting.
const COASTAL_ADJUSTMENT: f64 = 20.0;

/// Landmarks and coastal bands for the flood model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FloodRegions {
    /// Latitude bands of the coastline.
    pub coastal_latitude_bands: Vec<LatitudeBand>,
    /// Longitude bands of the coastline.
    pub coastal_longitude_bands: Vec<LongitudeBand>,
    /// Major river reaches.
    pub rivers: Vec<Landmark>,
}

static FLOOD_REGIONS: LazyLock<FloodRegions> =
    LazyLock::new(|| regions::parse_embedded(regions::FLOOD_TOML));

/// Returns the embedded flood landmarks.
#[must_use]
pub fn flood_regions() -> &'static FloodRegions {
    &FLOOD_REGIONS
}

/// Rule-based flood risk model.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloodModel;

impl FloodModel {
    /// Predicts flood risk in `[0, 100]`.
    ///
    /// `0.5 * elevation + 0.3 * river proximity + 0.2 * coastal`.
    #[must_use]
    #[allow(clippy::suboptimal_flops)]
    pub fn predict(self, point: Coordinate, elevation: Option<f64>) -> f64 {
        let elevation_risk = elevation_risk(elevation);
        let river_risk = river_proximity_risk(point);
        let coastal = if is_coastal(point) {
            COASTAL_ADJUSTMENT
        } else {
            0.0
        };

        let score = clamp_score(elevation_risk * 0.5 + river_risk * 0.3 + coastal * 0.2);
        log::debug!(
            "Flood risk at ({}, {}): elevation={elevation_risk} river={river_risk} \
             coastal={coastal} -> {score}",
            point.latitude,
            point.longitude,
        );
        score
    }
}

impl RiskModel for FloodModel {
    fn kind(&self) -> RiskKind {
        RiskKind::Flood
    }

    fn assess(&self, point: Coordinate, covariates: &Covariates) -> f64 {
        self.predict(point, covariates.elevation)
    }
}

/// Buckets elevation in meters: lower ground floods more.
#[must_use]
pub fn elevation_risk(elevation: Option<f64>) -> f64 {
    match elevation {
        None => DEFAULT_ELEVATION_RISK,
        Some(e) if e < 10.0 => 70.0,
        Some(e) if e < 50.0 => 50.0,
        Some(e) if e < 200.0 => 30.0,
        Some(_) => 20.0,
    }
}

/// Whether `point` is treated as coastal.
///
/// Every latitude band is paired with every longitude band, so a point whose
/// latitude matches one coast and longitude matches the other still counts.
#[must_use]
pub fn is_coastal(point: Coordinate) -> bool {
    let regions = flood_regions();
    regions.coastal_latitude_bands.iter().any(|lat_band| {
        lat_band.contains(point.latitude)
            && regions
                .coastal_longitude_bands
                .iter()
                .any(|lon_band| lon_band.contains(point.longitude))
    })
}

/// Whether `point` lies inside one of the coast rectangles, pairing each
/// latitude band only with the longitude band at the same position.
///
/// Stricter than [`is_coastal`]; used for descriptive site features, not
/// for scoring.
#[must_use]
pub fn within_coast_rectangle(point: Coordinate) -> bool {
    let regions = flood_regions();
    regions
        .coastal_latitude_bands
        .iter()
        .zip(&regions.coastal_longitude_bands)
        .any(|(lat_band, lon_band)| {
            lat_band.contains(point.latitude) && lon_band.contains(point.longitude)
        })
}

/// Risk from the straight-line degree distance to the nearest river.
#[must_use]
pub fn river_proximity_risk(point: Coordinate) -> f64 {
    let distance =
        regions::nearest_distance(&flood_regions().rivers, point).unwrap_or(f64::INFINITY);

    if distance < 0.5 {
        80.0
    } else if distance < 1.0 {
        50.0
    } else if distance < 2.0 {
        30.0
    } else {
        20.0
    }
}
