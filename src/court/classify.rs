// Coordinate normalization and shot classification.
//
// Every play attacks one of the two baskets (x = +/-41.75). All region
// geometry lives in the right-attack frame, so positions from left-attack
// possessions are mirrored across the center line first. Only x flips:
// y is a sideline offset and keeps its sign, so "left" regions stay on the
// shooter's left relative to the attacked basket.

use crate::court::geometry::Point;
use crate::court::regions::{CourtRegions, RegionLabel};

/// Map a raw court position into the canonical right-attack frame.
///
/// Identity when the attacked basket is on the positive-x side; otherwise
/// mirrors x. Any finite input is accepted; out-of-court positions simply
/// fail to classify downstream.
pub fn normalize(x: f64, y: f64, basket_x: f64) -> Point {
    if basket_x < 0.0 {
        Point::new(-x, y)
    } else {
        Point::new(x, y)
    }
}

/// Classify a raw shot location against the fixed region set.
///
/// Returns `None` when no region matches (backcourt beyond the defined
/// polygon, out-of-bounds positions, numerical edge misses). Classification
/// is pure: identical inputs always produce identical labels.
pub fn classify(regions: &CourtRegions, x: f64, y: f64, basket_x: f64) -> Option<RegionLabel> {
    regions.locate(normalize(x, y, basket_x))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
