//! Region rule tables and named landmarks used by the sub-models.
//!
//! Each sub-model has its own TOML file in `regions/`, embedded at compile
//! time via `include_str!` and parsed once on first use. Tables are ordered
//! lists of `(region, value)` rules evaluated first-match-wins. Each table is
//! independent of the others, even where their regions overlap
//! or disagree.

use climarisk_risk_models::Coordinate;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Embedded TOML rule tables, keyed by sub-model name.
pub(crate) const FLOOD_TOML: (&str, &str) = ("flood", include_str!("../regions/flood.toml"));
pub(crate) const HEAT_TOML: (&str, &str) = ("heat", include_str!("../regions/heat.toml"));
pub(crate) const DROUGHT_TOML: (&str, &str) = ("drought", include_str!("../regions/drought.toml"));
pub(crate) const GROUNDWATER_TOML: (&str, &str) = (
    "groundwater",
    include_str!("../regions/groundwater.toml"),
);

/// Parses one embedded table.
///
/// # Panics
///
/// Panics if the embedded TOML fails to parse. The tables are compile-time
/// constants, so a failure is a development error caught by the tests.
pub(crate) fn parse_embedded<T: DeserializeOwned>((name, toml_str): (&str, &str)) -> T {
    toml::de::from_str(toml_str)
        .unwrap_or_else(|e| panic!("Failed to parse region table '{name}': {e}"))
}

/// Geographic shape a rule applies to. Bounds are inclusive unless noted.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Region {
    /// Latitude/longitude rectangle.
    Rect {
        /// Southern latitude boundary.
        south: f64,
        /// Northern latitude boundary.
        north: f64,
        /// Western longitude boundary.
        west: f64,
        /// Eastern longitude boundary.
        east: f64,
    },
    /// Latitude band spanning every longitude.
    LatBand {
        /// Southern latitude boundary.
        south: f64,
        /// Northern latitude boundary.
        north: f64,
    },
    /// Everything strictly south of `latitude`.
    SouthOf {
        /// Exclusive northern boundary.
        latitude: f64,
    },
    /// Matches every point.
    Anywhere,
}

impl Region {
    /// Whether `point` lies inside this region.
    #[must_use]
    pub fn contains(&self, point: Coordinate) -> bool {
        let Coordinate {
            latitude: lat,
            longitude: lon,
        } = point;
        match *self {
            Self::Rect {
                south,
                north,
                west,
                east,
            } => (south..=north).contains(&lat) && (west..=east).contains(&lon),
            Self::LatBand { south, north } => (south..=north).contains(&lat),
            Self::SouthOf { latitude } => lat < latitude,
            Self::Anywhere => true,
        }
    }
}

/// A single `(region, value)` rule.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegionRule {
    /// Human-readable region name.
    pub name: String,
    /// Value returned when the region matches.
    pub value: f64,
    /// Shape of the region.
    pub region: Region,
}

/// Ordered rule list with a fallback value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RuleTable {
    /// Value used when no rule matches.
    pub fallback: f64,
    /// Rules in evaluation order.
    #[serde(default)]
    pub rules: Vec<RegionRule>,
}

impl RuleTable {
    /// Returns the first rule whose region contains `point`.
    #[must_use]
    pub fn matching_rule(&self, point: Coordinate) -> Option<&RegionRule> {
        self.rules.iter().find(|rule| rule.region.contains(point))
    }

    /// Value of the first matching rule, if any.
    #[must_use]
    pub fn lookup(&self, point: Coordinate) -> Option<f64> {
        self.matching_rule(point).map(|rule| rule.value)
    }

    /// Value of the first matching rule, or the fallback.
    #[must_use]
    pub fn evaluate(&self, point: Coordinate) -> f64 {
        self.lookup(point).unwrap_or(self.fallback)
    }
}

/// A named point of interest (river reach, city centre).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Landmark {
    /// Landmark name.
    pub name: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Landmark {
    /// Landmark position as a [`Coordinate`].
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Distance in degrees from `point` to the nearest landmark, or `None` when
/// the list is empty.
#[must_use]
pub fn nearest_distance(landmarks: &[Landmark], point: Coordinate) -> Option<f64> {
    landmarks
        .iter()
        .map(|landmark| point.degree_distance(landmark.coordinate()))
        .min_by(f64::total_cmp)
}

/// Whether any landmark lies strictly closer than `radius` degrees.
#[must_use]
pub fn within_radius(landmarks: &[Landmark], point: Coordinate, radius: f64) -> bool {
    landmarks
        .iter()
        .any(|landmark| point.degree_distance(landmark.coordinate()) < radius)
}

/// Inclusive latitude band.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LatitudeBand {
    /// Southern boundary.
    pub south: f64,
    /// Northern boundary.
    pub north: f64,
}

impl LatitudeBand {
    /// Whether `latitude` falls inside the band.
    #[must_use]
    pub fn contains(&self, latitude: f64) -> bool {
        (self.south..=self.north).contains(&latitude)
    }
}

/// Inclusive longitude band.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LongitudeBand {
    /// Western boundary.
    pub west: f64,
    /// Eastern boundary.
    pub east: f64,
}

impl LongitudeBand {
    /// Whether `longitude` falls inside the band.
    #[must_use]
    pub fn contains(&self, longitude: f64) -> bool {
        (self.west..=self.east).contains(&longitude)
    }
}
