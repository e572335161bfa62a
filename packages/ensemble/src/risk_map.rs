//! Grid sampling of a single risk layer over a bounding box.

use climarisk_risk_models::{
    BoundingBox, Coordinate, PropertyContext, RiskLayer, RiskMap, RiskMapCell, ScoreResult,
    round2,
};

use crate::LocationScorer;

/// Splits `bbox` into `zoom × zoom` equal cells and scores each at its
/// centre with no covariates.
///
/// A `zoom` of zero is treated as one. The bounding box is assumed to be
/// validated (west < east, south < north).
#[must_use]
pub fn risk_map<S: LocationScorer + ?Sized>(
    scorer: &S,
    bbox: BoundingBox,
    layer: RiskLayer,
    zoom: u8,
) -> RiskMap {
    let zoom = zoom.max(1);
    let divisions = u32::from(zoom);
    let cell_width = bbox.width() / f64::from(divisions);
    let cell_height = bbox.height() / f64::from(divisions);
    let context = PropertyContext::default();

    let mut cells = Vec::with_capacity(usize::from(zoom) * usize::from(zoom));
    for row in 0..divisions {
        for column in 0..divisions {
            let center = Coordinate::new(
                (f64::from(row) + 0.5).mul_add(cell_height, bbox.south),
                (f64::from(column) + 0.5).mul_add(cell_width, bbox.west),
            );
            let score = scorer.score(center, &context);
            cells.push(RiskMapCell {
                row,
                column,
                center,
                value: layer_value(&score, layer),
            });
        }
    }

    let min_risk = cells.iter().map(|c| c.value).fold(f64::INFINITY, f64::min);
    let max_risk = cells
        .iter()
        .map(|c| c.value)
        .fold(f64::NEG_INFINITY, f64::max);

    log::debug!(
        "Sampled {} {layer} cells over {bbox:?}: min={min_risk} max={max_risk}",
        cells.len()
    );

    RiskMap {
        bbox,
        layer,
        zoom,
        cells,
        min_risk: round2(min_risk),
        max_risk: round2(max_risk),
    }
}

/// Value a cell reports for `layer`.
#[must_use]
pub fn layer_value(score: &ScoreResult, layer: RiskLayer) -> f64 {
    layer
        .component()
        .map_or(score.composite_score, |kind| score.breakdown.get(kind))
}

#[cfg(test)]
mod tests {
    use climarisk_risk_models::RiskKind;

    use super::*;
    use crate::EnsembleScorer;

    const INDIA: BoundingBox = BoundingBox::new(68.0, 8.0, 97.0, 37.0);

    #[test]
    fn samples_zoom_squared_cells() {
        let map = risk_map(&EnsembleScorer::new(), INDIA, RiskLayer::Overall, 4);
        assert_eq!(map.cells.len(), 16);
        assert_eq!(map.zoom, 4);
        assert_eq!(map.cells[0].row, 0);
        assert_eq!(map.cells[0].column, 0);
        assert_eq!(map.cells[15].row, 3);
        assert_eq!(map.cells[15].column, 3);
    }

    #[test]
    fn cells_are_scored_at_their_centres() {
        let bbox = BoundingBox::new(70.0, 10.0, 80.0, 20.0);
        let map = risk_map(&EnsembleScorer::new(), bbox, RiskLayer::Flood, 2);
        let first = map.cells[0].center;
        assert!((first.longitude - 72.5).abs() < 1e-9);
        assert!((first.latitude - 12.5).abs() < 1e-9);
        let last = map.cells[3].center;
        assert!((last.longitude - 77.5).abs() < 1e-9);
        assert!((last.latitude - 17.5).abs() < 1e-9);
    }

    #[test]
    fn layer_values_match_point_scores() {
        let scorer = EnsembleScorer::new();
        let map = risk_map(&scorer, INDIA, RiskLayer::Heat, 3);
        for cell in &map.cells {
            let score = scorer.score(cell.center, &PropertyContext::default());
            assert!((cell.value - score.breakdown.get(RiskKind::Heat)).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn min_and_max_bound_every_cell() {
        let map = risk_map(&EnsembleScorer::new(), INDIA, RiskLayer::Overall, 6);
        assert!(map.min_risk <= map.max_risk);
        for cell in &map.cells {
            assert!(cell.value >= map.min_risk - 0.005);
            assert!(cell.value <= map.max_risk + 0.005);
        }
    }

    #[test]
    fn single_cell_map() {
        let map = risk_map(&EnsembleScorer::new(), INDIA, RiskLayer::Drought, 1);
        assert_eq!(map.cells.len(), 1);
        assert!((map.min_risk - map.max_risk).abs() < f64::EPSILON);
    }
}
