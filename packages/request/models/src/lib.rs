#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Request types accepted at the boundary of the scoring core.
//!
//! The scoring core trusts its inputs. Everything a caller sends passes
//! through one of the `validate` methods here first, which range-check
//! coordinates and property attributes and normalize forecast years.

use climarisk_risk_models::{BoundingBox, Coordinate, PropertyContext, PropertyType, RiskLayer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Forecast horizons used when a request names none.
pub const DEFAULT_FORECAST_YEARS: [u32; 6] = [5, 10, 15, 20, 25, 30];

/// Furthest forecast horizon accepted, in years.
pub const MAX_FORECAST_YEAR: u32 = 50;

/// Risk map zoom used when a request names none.
pub const DEFAULT_ZOOM: u8 = 10;

/// Highest accepted risk map zoom.
pub const MAX_ZOOM: u8 = 18;

/// Reasons a request is rejected before scoring.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Latitude outside `[-90, 90]` or not a number.
    #[error("Latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    /// Longitude outside `[-180, 180]` or not a number.
    #[error("Longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    /// A forecast asked for no years.
    #[error("At least one forecast year must be specified")]
    NoForecastYears,

    /// A forecast year outside `1..=50`.
    #[error("Forecast year {0} is outside 1..=50")]
    ForecastYearOutOfRange(u32),

    /// Area given but not strictly positive.
    #[error("Area must be positive, got {0}")]
    NonPositiveArea(f64),

    /// Property type string not recognized.
    #[error("Unknown property type: {0}")]
    UnknownPropertyType(String),

    /// Risk layer string not recognized.
    #[error("Unknown risk layer: {0}")]
    UnknownRiskLayer(String),

    /// Bounding box could not be parsed or is not a proper area.
    #[error("Invalid bounding box: {message}")]
    InvalidBoundingBox {
        /// What is wrong with the box.
        message: String,
    },

    /// Risk map zoom outside `1..=18`.
    #[error("Zoom {0} is outside 1..=18")]
    ZoomOutOfRange(u8),

    /// Analysis request carried only an address.
    #[error("Address geocoding is not supported; provide latitude and longitude")]
    GeocodingUnsupported,

    /// Analysis request carried neither coordinates nor an address.
    #[error("Either an address or latitude/longitude must be provided")]
    MissingLocation,

    /// Bulk request with no items.
    #[error("Bulk request must contain at least one property")]
    EmptyBulkRequest,

    /// Bulk request over the configured limit.
    #[error("Bulk request has {count} properties; the maximum is {max}")]
    TooManyBulkItems {
        /// Items in the request.
        count: usize,
        /// Configured limit.
        max: usize,
    },
}

/// Checks that a latitude/longitude pair is on the globe.
///
/// # Errors
///
/// * If either value is out of range or not finite
pub fn validate_coordinate(latitude: f64, longitude: f64) -> Result<Coordinate, ValidationError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ValidationError::LatitudeOutOfRange(latitude));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ValidationError::LongitudeOutOfRange(longitude));
    }
    Ok(Coordinate::new(latitude, longitude))
}

/// Checks property attributes. `floor` is non-negative by type.
///
/// # Errors
///
/// * If `area_sqm` is present and not strictly positive
pub fn validate_context(context: &PropertyContext) -> Result<(), ValidationError> {
    match context.area_sqm {
        Some(area) if area.is_nan() || area <= 0.0 => Err(ValidationError::NonPositiveArea(area)),
        _ => Ok(()),
    }
}

/// Parses a property type name such as `"commercial"`.
///
/// # Errors
///
/// * If the name is not one of the four property types
pub fn parse_property_type(s: &str) -> Result<PropertyType, ValidationError> {
    s.trim()
        .parse()
        .map_err(|_| ValidationError::UnknownPropertyType(s.to_string()))
}

/// Parses a risk layer name such as `"flood"` or `"overall"`.
///
/// # Errors
///
/// * If the name is not a known layer
pub fn parse_risk_layer(s: &str) -> Result<RiskLayer, ValidationError> {
    s.trim()
        .parse()
        .map_err(|_| ValidationError::UnknownRiskLayer(s.to_string()))
}

/// Parses a `"west,south,east,north"` string and checks the box is a
/// proper area on the globe.
///
/// # Errors
///
/// * If the string does not hold exactly four numbers
/// * If the box is inverted, empty, or off the globe
pub fn parse_bbox(s: &str) -> Result<BoundingBox, ValidationError> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ValidationError::InvalidBoundingBox {
            message: format!("{s:?}: {e}"),
        })?;

    let [west, south, east, north] = parts[..] else {
        return Err(ValidationError::InvalidBoundingBox {
            message: format!("expected west,south,east,north but got {} value(s)", parts.len()),
        });
    };

    validate_bbox(BoundingBox::new(west, south, east, north))
}

/// Checks `-180 <= west < east <= 180` and `-90 <= south < north <= 90`.
///
/// # Errors
///
/// * If either axis is inverted, empty, or off the globe
pub fn validate_bbox(bbox: BoundingBox) -> Result<BoundingBox, ValidationError> {
    let longitudes_ok = bbox.west >= -180.0 && bbox.west < bbox.east && bbox.east <= 180.0;
    let latitudes_ok = bbox.south >= -90.0 && bbox.south < bbox.north && bbox.north <= 90.0;

    if longitudes_ok && latitudes_ok {
        Ok(bbox)
    } else {
        Err(ValidationError::InvalidBoundingBox {
            message: format!(
                "west={} south={} east={} north={} is not a proper area",
                bbox.west, bbox.south, bbox.east, bbox.north
            ),
        })
    }
}

/// Single-location score request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(flatten)]
    pub context: PropertyContext,
}

impl ScoreRequest {
    /// # Errors
    ///
    /// * If the coordinate or property attributes are out of range
    pub fn validate(&self) -> Result<Coordinate, ValidationError> {
        let point = validate_coordinate(self.latitude, self.longitude)?;
        validate_context(&self.context)?;
        Ok(point)
    }
}

/// Forecast request. `years` defaults to [`DEFAULT_FORECAST_YEARS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRequest {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_years")]
    pub years: Vec<u32>,
    #[serde(flatten)]
    pub context: PropertyContext,
}

fn default_years() -> Vec<u32> {
    DEFAULT_FORECAST_YEARS.to_vec()
}

impl ForecastRequest {
    /// Validates the request and returns the coordinate together with the
    /// years sorted ascending without duplicates.
    ///
    /// # Errors
    ///
    /// * If the coordinate or property attributes are out of range
    /// * If `years` is empty or holds a year outside `1..=50`
    pub fn validate(&self) -> Result<(Coordinate, Vec<u32>), ValidationError> {
        let point = validate_coordinate(self.latitude, self.longitude)?;
        validate_context(&self.context)?;
        let years = normalize_years(&self.years)?;
        Ok((point, years))
    }
}

/// Sorts and deduplicates forecast years after range-checking them.
///
/// # Errors
///
/// * If `years` is empty or holds a year outside `1..=50`
pub fn normalize_years(years: &[u32]) -> Result<Vec<u32>, ValidationError> {
    if years.is_empty() {
        return Err(ValidationError::NoForecastYears);
    }
    if let Some(&year) = years
        .iter()
        .find(|y| !(1..=MAX_FORECAST_YEAR).contains(*y))
    {
        return Err(ValidationError::ForecastYearOutOfRange(year));
    }

    let mut years = years.to_vec();
    years.sort_unstable();
    years.dedup();
    Ok(years)
}

/// Property analysis request. Either both coordinates or an address must
/// be present; addresses are not geocoded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyAnalysisRequest {
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(flatten)]
    pub context: PropertyContext,
}

impl PropertyAnalysisRequest {
    /// # Errors
    ///
    /// * If only an address is given
    /// * If neither coordinates nor an address is given
    /// * If the coordinate or property attributes are out of range
    pub fn validate(&self) -> Result<Coordinate, ValidationError> {
        let point = match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => validate_coordinate(latitude, longitude)?,
            _ if self.address.as_deref().is_some_and(|a| !a.trim().is_empty()) => {
                return Err(ValidationError::GeocodingUnsupported);
            }
            _ => return Err(ValidationError::MissingLocation),
        };
        validate_context(&self.context)?;
        Ok(point)
    }
}

/// One property in a bulk request.
///
/// `property_type` stays a string so that one bad entry fails on its own
/// instead of rejecting the whole request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkItem {
    #[serde(default)]
    pub property_id: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub property_type: Option<String>,
    pub area_sqm: Option<f64>,
    pub floor: Option<u32>,
}

impl BulkItem {
    /// Validates this item and builds its scoring context.
    ///
    /// # Errors
    ///
    /// * If the coordinate, property type, or area is invalid
    pub fn validate(&self) -> Result<(Coordinate, PropertyContext), ValidationError> {
        let point = validate_coordinate(self.latitude, self.longitude)?;
        let property_type = self
            .property_type
            .as_deref()
            .map(parse_property_type)
            .transpose()?
            .unwrap_or_default();
        let context = PropertyContext {
            property_type,
            area_sqm: self.area_sqm,
            floor: self.floor,
            ..PropertyContext::default()
        };
        validate_context(&context)?;
        Ok((point, context))
    }
}

/// Many properties scored in one call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkScoreRequest {
    pub properties: Vec<BulkItem>,
}

impl BulkScoreRequest {
    /// Checks the envelope only; items are validated one by one during
    /// scoring.
    ///
    /// # Errors
    ///
    /// * If there are no items or more than `max_items`
    pub fn validate(&self, max_items: usize) -> Result<(), ValidationError> {
        let count = self.properties.len();
        if count == 0 {
            Err(ValidationError::EmptyBulkRequest)
        } else if count > max_items {
            Err(ValidationError::TooManyBulkItems {
                count,
                max: max_items,
            })
        } else {
            Ok(())
        }
    }
}

/// Risk map request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMapRequest {
    /// `"west,south,east,north"`.
    pub bbox: String,
    #[serde(default)]
    pub layer: RiskLayer,
    #[serde(default = "default_zoom")]
    pub zoom: u8,
}

const fn default_zoom() -> u8 {
    DEFAULT_ZOOM
}

impl RiskMapRequest {
    /// # Errors
    ///
    /// * If the bounding box is malformed or not a proper area
    /// * If `zoom` is outside `1..=18`
    pub fn validate(&self) -> Result<BoundingBox, ValidationError> {
        if !(1..=MAX_ZOOM).contains(&self.zoom) {
            return Err(ValidationError::ZoomOutOfRange(self.zoom));
        }
        parse_bbox(&self.bbox)
    }
}
