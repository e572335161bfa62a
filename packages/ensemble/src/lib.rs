#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Composite climate risk scoring.
//!
//! [`EnsembleScorer`] runs the four rule-based sub-models, derives rainfall
//! risk, and combines the five components into a single score with a
//! confidence value. The rest of this crate builds on any
//! [`LocationScorer`]:
//!
//! * [`forecast`] projects a score forward by year offset.
//! * [`analysis`] adds recommendations and descriptive site features.
//! * [`risk_map`] samples one risk layer over a bounding box.
//!
//! Everything here is pure and synchronous. Callers validate coordinates
//! before scoring; out-of-range input produces clamped output, not errors.

pub mod analysis;
pub mod forecast;
pub mod risk_map;
pub mod scorer;

use climarisk_risk_models::{Coordinate, PropertyContext, ScoreResult};

pub use analysis::{ClimateZone, GeoFeatures, PropertyAnalysis, analyze};
pub use forecast::forecast;
pub use risk_map::risk_map;
pub use scorer::EnsembleScorer;

/// Something that can score a single location.
///
/// [`EnsembleScorer`] is the production implementation. The seam exists so
/// bulk and map callers can be driven by any scorer sharing this contract.
pub trait LocationScorer: Send + Sync {
    /// Scores `point` for a property described by `context`.
    fn score(&self, point: Coordinate, context: &PropertyContext) -> ScoreResult;
}
