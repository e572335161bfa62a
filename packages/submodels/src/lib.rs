#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Rule-based climate risk sub-models.
//!
//! Four independent models each map a coordinate (plus optional site
//! measurements) to a risk value in `[0, 100]`:
//!
//! * [`FloodModel`]: elevation, coastal exposure, river proximity.
//! * [`HeatModel`]: latitude, urban heat island, population density.
//! * [`DroughtModel`]: precipitation, aridity, monsoon dependency.
//! * [`GroundwaterModel`]: critical zones, agriculture, recharge.
//!
//! The models are deterministic piecewise functions driven by the region
//! tables in [`regions`]. They hold no state and are safe to share across
//! threads.

pub mod drought;
pub mod flood;
pub mod groundwater;
pub mod heat;
pub mod regions;

use climarisk_risk_models::{Coordinate, Covariates, RiskKind};

pub use drought::DroughtModel;
pub use flood::FloodModel;
pub use groundwater::GroundwaterModel;
pub use heat::HeatModel;

/// A sub-model that scores one kind of climate risk.
///
/// Implementations read only the covariates they understand and fall back
/// to regional heuristics for anything absent.
pub trait RiskModel: Send + Sync {
    /// The component this model scores.
    fn kind(&self) -> RiskKind;

    /// Scores `point` in `[0, 100]`.
    fn assess(&self, point: Coordinate, covariates: &Covariates) -> f64;
}

/// Clamps a raw model output to `[0, 100]`.
pub(crate) const fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_model_stays_in_range_across_the_globe() {
        let models: [&dyn RiskModel; 4] =
            [&FloodModel, &HeatModel, &DroughtModel, &GroundwaterModel];
        let covariate_sets = [
            Covariates::default(),
            Covariates {
                elevation: Some(-5.0),
                annual_precipitation: Some(50.0),
                current_water_level: Some(3.0),
                is_urban: Some(true),
                population_density: Some(50_000.0),
            },
        ];

        for lat in (-90..=90).step_by(5) {
            for lon in (-180..=180).step_by(5) {
                let point = Coordinate::new(f64::from(lat), f64::from(lon));
                for covariates in &covariate_sets {
                    for model in models {
                        let score = model.assess(point, covariates);
                        assert!(
                            (0.0..=100.0).contains(&score),
                            "{:?} produced {score} at {point:?}",
                            model.kind()
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn models_report_their_kind() {
        assert_eq!(FloodModel.kind(), RiskKind::Flood);
        assert_eq!(HeatModel.kind(), RiskKind::Heat);
        assert_eq!(DroughtModel.kind(), RiskKind::Drought);
        assert_eq!(GroundwaterModel.kind(), RiskKind::Groundwater);
    }
}
