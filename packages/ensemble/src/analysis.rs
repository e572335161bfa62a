//! Property-level analysis: score, mitigation recommendations, and
//! descriptive site features.

use climarisk_risk_models::{
    Coordinate, PropertyContext, RiskBreakdown, RiskKind, RiskLevel, ScoreResult,
};
use climarisk_submodels::flood;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::LocationScorer;

/// Component scores above this value get a specific recommendation.
pub const COMPONENT_ALERT_THRESHOLD: f64 = 70.0;

/// Broad climate zone by absolute latitude band.
#[derive(
    Debug,
    Clone,
    Copy,
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
pub enum ClimateZone {
    Tropical,
    Subtropical,
    Temperate,
}

impl ClimateZone {
    /// Classifies by latitude: below 23.5 is tropical, below 30
    /// subtropical, anything else temperate.
    #[must_use]
    pub fn from_latitude(latitude: f64) -> Self {
        if latitude < 23.5 {
            Self::Tropical
        } else if latitude < 30.0 {
            Self::Subtropical
        } else {
            Self::Temperate
        }
    }
}

/// Descriptive features of a site. These do not feed the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoFeatures {
    pub climate_zone: ClimateZone,
    pub monsoon_region: bool,
    pub coastal: bool,
}

impl GeoFeatures {
    #[must_use]
    pub fn of(point: Coordinate) -> Self {
        Self {
            climate_zone: ClimateZone::from_latitude(point.latitude),
            monsoon_region: is_monsoon_region(point),
            coastal: flood::within_coast_rectangle(point),
        }
    }
}

/// Whether `point` lies in the monsoon belt (latitude 20..=30, longitude
/// 70..=95).
#[must_use]
pub fn is_monsoon_region(point: Coordinate) -> bool {
    (20.0..=30.0).contains(&point.latitude) && (70.0..=95.0).contains(&point.longitude)
}

/// Full analysis of one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyAnalysis {
    /// Freshly generated identifier for this analysis.
    pub property_id: String,
    pub coordinate: Coordinate,
    pub context: PropertyContext,
    pub score: ScoreResult,
    /// Mitigation advice, most severe first.
    pub recommendations: Vec<String>,
    pub features: GeoFeatures,
}

/// Scores `point` and attaches recommendations and site features.
#[must_use]
pub fn analyze<S: LocationScorer + ?Sized>(
    scorer: &S,
    point: Coordinate,
    context: &PropertyContext,
) -> PropertyAnalysis {
    let score = scorer.score(point, context);
    let recommendations = recommendations(score.risk_level, &score.breakdown);
    let property_id = uuid::Uuid::new_v4().to_string();

    log::debug!(
        "Analyzed property {property_id} at ({}, {}): {} recommendation(s)",
        point.latitude,
        point.longitude,
        recommendations.len()
    );

    PropertyAnalysis {
        property_id,
        coordinate: point,
        context: *context,
        features: GeoFeatures::of(point),
        score,
        recommendations,
    }
}

/// Builds mitigation advice for a scored property.
///
/// Order: an overall warning for high or extreme levels, then one entry per
/// component above [`COMPONENT_ALERT_THRESHOLD`], then general advice for
/// anything above low.
#[must_use]
pub fn recommendations(level: RiskLevel, breakdown: &RiskBreakdown) -> Vec<String> {
    let mut recommendations = Vec::new();

    match level {
        RiskLevel::Extreme => recommendations.push(
            "EXTREME RISK: Consider alternative locations or robust mitigation measures"
                .to_string(),
        ),
        RiskLevel::High => recommendations
            .push("HIGH RISK: Implement comprehensive risk mitigation strategies".to_string()),
        RiskLevel::Moderate | RiskLevel::Low => {}
    }

    recommendations.extend(
        RiskKind::all()
            .iter()
            .filter(|kind| breakdown.get(**kind) > COMPONENT_ALERT_THRESHOLD)
            .filter_map(|kind| component_advice(*kind))
            .map(ToString::to_string),
    );

    if level >= RiskLevel::Moderate {
        recommendations
            .push("Monitor climate trends and update risk assessment annually".to_string());
        recommendations.push("Ensure property insurance covers climate-related damages".to_string());
    }

    recommendations
}

const fn component_advice(kind: RiskKind) -> Option<&'static str> {
    match kind {
        RiskKind::Flood => Some(
            "High flood risk: Consider elevated foundation, flood barriers, and flood insurance",
        ),
        RiskKind::Heat => Some(
            "High heat risk: Consider green roofs, insulation, and efficient cooling systems",
        ),
        RiskKind::Drought => Some(
            "High drought risk: Consider water conservation systems and drought-resistant \
             landscaping",
        ),
        RiskKind::Groundwater => Some(
            "High groundwater depletion risk: Consider rainwater harvesting and reduced water \
             dependency",
        ),
        RiskKind::Rainfall => None,
    }
}
