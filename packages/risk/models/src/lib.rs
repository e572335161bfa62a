#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Climate risk value types shared across the climarisk workspace.
//!
//! Every scoring call produces fresh, immutable values: a [`RiskBreakdown`]
//! of the five component scores, a [`ScoreResult`] combining them, and (for
//! forecasts) one [`YearForecast`] per requested year offset. None of these
//! types are persisted by the scoring core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Rounds a value to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A WGS84 point. Latitude is expected in `[-90, 90]` and longitude in
/// `[-180, 180]`, but range checking is the caller's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate from latitude and longitude in degrees.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Straight-line distance to `other` in raw degree units.
    ///
    /// This is a planar approximation, not a geodesic distance.
    #[must_use]
    pub fn degree_distance(self, other: Self) -> f64 {
        (self.latitude - other.latitude).hypot(self.longitude - other.longitude)
    }
}

/// Kind of property being assessed.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PropertyType {
    /// Homes and apartments.
    #[default]
    Residential,
    /// Offices and retail.
    Commercial,
    /// Factories and warehouses.
    Industrial,
    /// Farmland.
    Agricultural,
}

/// Optional site measurements that refine the sub-model heuristics.
///
/// Each field is read by at most one sub-model. When a field is absent the
/// sub-model falls back to a regional estimate:
///
/// * `elevation` (meters, flood): absent means a moderate default.
/// * `annual_precipitation` (mm/year, drought): absent or `0` means the
///   regional precipitation estimate.
/// * `current_water_level` (meters, groundwater): accepted but not used.
/// * `is_urban` (heat): absent means "near one of the major cities".
/// * `population_density` (people/km², heat): absent or `0` means a fixed
///   moderate adjustment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Covariates {
    /// Elevation above sea level in meters.
    pub elevation: Option<f64>,
    /// Annual precipitation in millimeters.
    pub annual_precipitation: Option<f64>,
    /// Current groundwater level in meters.
    pub current_water_level: Option<f64>,
    /// Whether the location is urban.
    pub is_urban: Option<bool>,
    /// Population per square kilometer.
    pub population_density: Option<f64>,
}

/// Property attributes passed through to scoring.
///
/// `property_type`, `area_sqm` and `floor` are carried for the caller's
/// benefit; none of the current sub-models read them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyContext {
    /// Property category.
    #[serde(default)]
    pub property_type: PropertyType,
    /// Floor area in square meters.
    pub area_sqm: Option<f64>,
    /// Floor number (0 = ground).
    pub floor: Option<u32>,
    /// Site measurements.
    #[serde(flatten)]
    pub covariates: Covariates,
}

impl PropertyContext {
    /// Creates a context with the given property type and no covariates.
    #[must_use]
    pub fn of_type(property_type: PropertyType) -> Self {
        Self {
            property_type,
            ..Self::default()
        }
    }
}

/// One of the five components of the composite score.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RiskKind {
    /// Riverine and coastal flooding.
    Flood,
    /// Heat waves and urban heat islands.
    Heat,
    /// Precipitation deficit.
    Drought,
    /// Groundwater depletion.
    Groundwater,
    /// Rainfall variability, derived from drought.
    Rainfall,
}

impl RiskKind {
    /// Weight of this component in the composite score.
    ///
    /// The weights of [`RiskKind::all`] sum to `1.0`, which keeps the
    /// composite within `[0, 100]` whenever every component is.
    #[must_use]
    pub const fn weight(self) -> f64 {
        match self {
            Self::Flood | Self::Heat => 0.25,
            Self::Drought => 0.20,
            Self::Groundwater | Self::Rainfall => 0.15,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Flood,
            Self::Heat,
            Self::Drought,
            Self::Groundwater,
            Self::Rainfall,
        ]
    }
}

/// The five component scores, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskBreakdown {
    /// Flood risk.
    pub flood: f64,
    /// Heat risk.
    pub heat: f64,
    /// Drought risk.
    pub drought: f64,
    /// Groundwater depletion risk.
    pub groundwater: f64,
    /// Rainfall risk.
    pub rainfall: f64,
}

impl RiskBreakdown {
    /// Returns the score for a single component.
    #[must_use]
    pub const fn get(&self, kind: RiskKind) -> f64 {
        match kind {
            RiskKind::Flood => self.flood,
            RiskKind::Heat => self.heat,
            RiskKind::Drought => self.drought,
            RiskKind::Groundwater => self.groundwater,
            RiskKind::Rainfall => self.rainfall,
        }
    }

    /// Component scores in [`RiskKind::all`] order.
    #[must_use]
    pub const fn values(&self) -> [f64; 5] {
        [
            self.flood,
            self.heat,
            self.drought,
            self.groundwater,
            self.rainfall,
        ]
    }

    /// Weighted sum of the components using [`RiskKind::weight`].
    #[must_use]
    pub fn weighted_sum(&self) -> f64 {
        RiskKind::all()
            .iter()
            .map(|kind| kind.weight() * self.get(*kind))
            .sum()
    }

    /// Copy with every component rounded to two decimals.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            flood: round2(self.flood),
            heat: round2(self.heat),
            drought: round2(self.drought),
            groundwater: round2(self.groundwater),
            rainfall: round2(self.rainfall),
        }
    }
}

/// Four-tier label derived from a composite score.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RiskLevel {
    /// Score below 25.
    Low,
    /// Score in `[25, 50)`.
    Moderate,
    /// Score in `[50, 75)`.
    High,
    /// Score of 75 or more.
    Extreme,
}

impl RiskLevel {
    /// Classifies a score. Lower bounds are inclusive, so exactly `25.0`
    /// is [`RiskLevel::Moderate`].
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score < 25.0 {
            Self::Low
        } else if score < 50.0 {
            Self::Moderate
        } else if score < 75.0 {
            Self::High
        } else {
            Self::Extreme
        }
    }
}

/// Output of a single scoring call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    /// Weighted composite of the breakdown, in `[0, 100]`.
    pub composite_score: f64,
    /// Rounded component scores.
    pub breakdown: RiskBreakdown,
    /// Level derived from the composite score.
    pub risk_level: RiskLevel,
    /// Inter-component agreement, in `[0.5, 1.0]`.
    pub confidence: f64,
    /// When the score was computed.
    pub calculated_at: DateTime<Utc>,
}

/// Projection of the score for one future year offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearForecast {
    /// Years from now.
    pub year_offset: u32,
    /// Projected composite score, capped at 100.
    pub predicted_score: f64,
    /// Level derived from the projected score.
    pub predicted_level: RiskLevel,
    /// Projected component scores, each capped at 100.
    pub breakdown: RiskBreakdown,
    /// Lower edge of the ±10% band. Not clamped.
    pub confidence_interval_lower: f64,
    /// Upper edge of the ±10% band. Not clamped.
    pub confidence_interval_upper: f64,
}

/// Output of a forecast call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    /// One entry per distinct requested year, ascending.
    pub forecasts: Vec<YearForecast>,
    /// The composite score the projections start from.
    pub current_score: f64,
    /// When the forecast was computed.
    pub forecasted_at: DateTime<Utc>,
}

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Longitude span in degrees.
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Latitude span in degrees.
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.north - self.south
    }
}

/// Which value a risk map reports per cell.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RiskLayer {
    /// Flood component.
    Flood,
    /// Heat component.
    Heat,
    /// Drought component.
    Drought,
    /// Groundwater component.
    Groundwater,
    /// Composite score.
    #[default]
    Overall,
}

impl RiskLayer {
    /// The breakdown component this layer shows, or `None` for the
    /// composite score.
    #[must_use]
    pub const fn component(self) -> Option<RiskKind> {
        match self {
            Self::Flood => Some(RiskKind::Flood),
            Self::Heat => Some(RiskKind::Heat),
            Self::Drought => Some(RiskKind::Drought),
            Self::Groundwater => Some(RiskKind::Groundwater),
            Self::Overall => None,
        }
    }
}

/// One sampled cell of a risk map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMapCell {
    /// Row index, counted northwards from the southern edge.
    pub row: u32,
    /// Column index, counted eastwards from the western edge.
    pub column: u32,
    /// Point the cell was scored at.
    pub center: Coordinate,
    /// Layer value at `center`.
    pub value: f64,
}

/// A grid of risk values covering a bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMap {
    /// Area covered.
    pub bbox: BoundingBox,
    /// Value reported per cell.
    pub layer: RiskLayer,
    /// Cells per side.
    pub zoom: u8,
    /// Sampled cells, row-major from the south-west corner.
    pub cells: Vec<RiskMapCell>,
    /// Smallest cell value.
    pub min_risk: f64,
    /// Largest cell value.
    pub max_risk: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one() {
        let total: f64 = RiskKind::all().iter().map(|k| k.weight()).sum();
        assert!((total - 1.0).abs() < 1e-12, "weights sum to {total}");
    }

    #[test]
    fn risk_level_boundaries() {
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(24.99), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(25.0), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(49.99), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(50.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(74.99), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(75.0), RiskLevel::Extreme);
        assert_eq!(RiskLevel::from_score(100.0), RiskLevel::Extreme);
    }

    #[test]
    fn round2_keeps_two_decimals() {
        assert!((round2(38.123_456) - 38.12).abs() < 1e-9);
        assert!((round2(0.005_1) - 0.01).abs() < 1e-9);
        assert!((round2(-3.456) + 3.46).abs() < 1e-9);
    }

    #[test]
    fn breakdown_weighted_sum_of_uniform_components_is_that_value() {
        let breakdown = RiskBreakdown {
            flood: 40.0,
            heat: 40.0,
            drought: 40.0,
            groundwater: 40.0,
            rainfall: 40.0,
        };
        assert!((breakdown.weighted_sum() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn breakdown_get_matches_values_order() {
        let breakdown = RiskBreakdown {
            flood: 1.0,
            heat: 2.0,
            drought: 3.0,
            groundwater: 4.0,
            rainfall: 5.0,
        };
        let from_get: Vec<f64> = RiskKind::all().iter().map(|k| breakdown.get(*k)).collect();
        assert_eq!(from_get, breakdown.values().to_vec());
    }

    #[test]
    fn degree_distance_is_planar() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(3.0, 4.0);
        assert!((a.degree_distance(b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn risk_layer_maps_to_component() {
        assert_eq!(RiskLayer::Heat.component(), Some(RiskKind::Heat));
        assert_eq!(RiskLayer::Overall.component(), None);
        assert_eq!("overall".parse::<RiskLayer>().unwrap(), RiskLayer::Overall);
    }

    #[test]
    fn property_type_parses_lowercase() {
        assert_eq!(
            "agricultural".parse::<PropertyType>().unwrap(),
            PropertyType::Agricultural
        );
        assert_eq!(PropertyType::Commercial.to_string(), "commercial");
        assert!("castle".parse::<PropertyType>().is_err());
    }

    #[test]
    fn property_context_deserializes_flattened_covariates() {
        let ctx: PropertyContext = serde_json::from_str(
            r#"{"propertyType":"industrial","floor":3,"elevation":12.5,"isUrban":true}"#,
        )
        .unwrap();
        assert_eq!(ctx.property_type, PropertyType::Industrial);
        assert_eq!(ctx.floor, Some(3));
        assert_eq!(ctx.covariates.elevation, Some(12.5));
        assert_eq!(ctx.covariates.is_urban, Some(true));
        assert_eq!(ctx.covariates.population_density, None);
    }
}
