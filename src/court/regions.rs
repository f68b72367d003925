// The fixed court region model: eleven named regions built once as
// discretized polygons in the canonical right-attack frame (basket at
// x = +41.75, half court spanning [0, 47] x [-25, 25]).
//
// Region definitions reconciled to a single canonical set:
//   - close range is the 11 ft semicircle toward the half-court line plus
//     the 8 ft half-width lane extension to the baseline;
//   - the corner-three zone is |y| in [22, 25] with x in [33, 47];
//   - the three-point arc (radius 23.75 around the basket) runs exactly
//     corner to corner and is split into wing/center sub-arcs at the arc
//     points with y = +/-14, whose basket sightlines extended to the
//     sideline bound the wing regions;
//   - midrange is split into baseline/elbow quadrants by those same
//     sightlines and the y = 0 line through the basket.
//
// "Left" regions sit at positive y in the canonical frame.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use thiserror::Error;

use crate::court::geometry::{GeometryError, Point, Polygon};

// ---------------------------------------------------------------------------
// Court dimension constants (feet)
// ---------------------------------------------------------------------------

/// X coordinate of the attacked basket in the canonical frame.
pub const BASKET_X: f64 = 41.75;
/// Above-the-break three-point arc radius.
pub const THREE_POINT_RADIUS: f64 = 23.75;
/// Distance of the corner-three line from the center line of the court.
pub const CORNER_THREE_Y: f64 = 22.0;
/// Depth of the corner-three zone measured from the baseline.
pub const CORNER_ZONE_DEPTH: f64 = 14.0;
/// Radius of the close-range semicircle around the basket.
pub const CLOSE_RANGE_RADIUS: f64 = 11.0;
/// Half-width of the lane extension joining the basket to the baseline.
pub const LANE_HALF_WIDTH: f64 = 8.0;
/// The wing/center split runs through the arc points at y = +/- this value.
pub const WING_SPLIT_Y: f64 = 14.0;
/// Half-court line.
pub const HALF_COURT_X: f64 = 0.0;
/// Baseline of the attacking half.
pub const BASELINE_X: f64 = 47.0;
/// Sideline offset from the center line.
pub const SIDELINE_Y: f64 = 25.0;
/// Far baseline of the backcourt.
pub const BACKCOURT_X: f64 = -47.0;
/// Number of sample vertices along the corner-to-corner three-point arc.
pub const ARC_SAMPLES: usize = 100;

// ---------------------------------------------------------------------------
// Region labels
// ---------------------------------------------------------------------------

/// The closed set of named shot regions. Classification returns
/// `Option<RegionLabel>`; positions outside every region are unclassified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegionLabel {
    BeyondHalfcourt,
    CloseRange,
    LeftBaselineMid,
    RightBaselineMid,
    LeftElbowMid,
    RightElbowMid,
    LeftCornerThree,
    RightCornerThree,
    LeftWingThree,
    RightWingThree,
    CenterThree,
}

impl RegionLabel {
    /// Evaluation order for classification. Earlier entries win on shared
    /// boundaries, which keeps classification deterministic.
    pub const PRECEDENCE: [RegionLabel; 11] = [
        RegionLabel::BeyondHalfcourt,
        RegionLabel::CloseRange,
        RegionLabel::LeftBaselineMid,
        RegionLabel::RightBaselineMid,
        RegionLabel::LeftElbowMid,
        RegionLabel::RightElbowMid,
        RegionLabel::LeftCornerThree,
        RegionLabel::RightCornerThree,
        RegionLabel::LeftWingThree,
        RegionLabel::RightWingThree,
        RegionLabel::CenterThree,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegionLabel::BeyondHalfcourt => "BEYOND_HALFCOURT",
            RegionLabel::CloseRange => "CLOSE_RANGE",
            RegionLabel::LeftBaselineMid => "LEFT_BASELINE_MID",
            RegionLabel::RightBaselineMid => "RIGHT_BASELINE_MID",
            RegionLabel::LeftElbowMid => "LEFT_ELBOW_MID",
            RegionLabel::RightElbowMid => "RIGHT_ELBOW_MID",
            RegionLabel::LeftCornerThree => "LEFT_CORNER_THREE",
            RegionLabel::RightCornerThree => "RIGHT_CORNER_THREE",
            RegionLabel::LeftWingThree => "LEFT_WING_THREE",
            RegionLabel::RightWingThree => "RIGHT_WING_THREE",
            RegionLabel::CenterThree => "CENTER_THREE",
        }
    }

    /// True for the five three-point regions.
    pub fn is_three(&self) -> bool {
        matches!(
            self,
            RegionLabel::LeftCornerThree
                | RegionLabel::RightCornerThree
                | RegionLabel::LeftWingThree
                | RegionLabel::RightWingThree
                | RegionLabel::CenterThree
        )
    }
}

impl std::fmt::Display for RegionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// A region polygon failed validation at construction time. This is a
/// geometry-constant bug, not a data problem, so construction fails fast.
#[derive(Debug, Error)]
#[error("invalid geometry for region {label}: {source}")]
pub struct RegionBuildError {
    pub label: RegionLabel,
    #[source]
    pub source: GeometryError,
}

// ---------------------------------------------------------------------------
// CourtRegions
// ---------------------------------------------------------------------------

/// The immutable region set. Built once per process and shared by reference;
/// nothing mutates it after construction, so concurrent reads are safe.
#[derive(Debug, Clone)]
pub struct CourtRegions {
    // Kept in precedence order; eleven entries, so linear lookups are fine.
    ordered: Vec<(RegionLabel, Polygon)>,
}

impl CourtRegions {
    /// Construct and validate every region polygon.
    pub fn build() -> Result<Self, RegionBuildError> {
        let d = Derived::compute();

        let mut ordered = Vec::with_capacity(RegionLabel::PRECEDENCE.len());
        for label in RegionLabel::PRECEDENCE {
            let ring = region_ring(label, &d);
            let polygon =
                Polygon::new(ring).map_err(|source| RegionBuildError { label, source })?;
            ordered.push((label, polygon));
        }
        Ok(CourtRegions { ordered })
    }

    /// Regions paired with their polygons, in precedence order.
    pub fn iter(&self) -> impl Iterator<Item = (RegionLabel, &Polygon)> {
        self.ordered.iter().map(|(label, poly)| (*label, poly))
    }

    pub fn get(&self, label: RegionLabel) -> &Polygon {
        // Every label is present by construction.
        &self
            .ordered
            .iter()
            .find(|(l, _)| *l == label)
            .expect("all region labels are built")
            .1
    }

    /// First region (in precedence order) containing the canonical-frame
    /// point, boundary-inclusive.
    pub fn locate(&self, p: Point) -> Option<RegionLabel> {
        self.ordered
            .iter()
            .find(|(_, poly)| poly.contains(p))
            .map(|(label, _)| *label)
    }
}

// ---------------------------------------------------------------------------
// Construction internals
// ---------------------------------------------------------------------------

/// Quantities derived from the court constants: arc split angles and the
/// sightline geometry shared by several regions.
struct Derived {
    /// Arc half-angle at which the arc meets the corner-three line.
    phi_break: f64,
    /// Arc angle of the wing/center split points (y = +/-14 on the arc).
    phi_split: f64,
    /// X where the basket sightline through a split point meets the sideline.
    sight_x: f64,
    /// X of the corner-zone boundary (depth measured from the baseline).
    corner_x: f64,
    /// Shared arc sample angles, corner to corner, with the exact split
    /// angles (-phi_split, 0, +phi_split) inserted. Every region slices its
    /// arc boundary out of this single list, so neighbors that meet on the
    /// arc share bit-identical vertices and no sliver gaps can open.
    arc_knots: Vec<f64>,
}

impl Derived {
    fn compute() -> Self {
        let phi_break = (CORNER_THREE_Y / THREE_POINT_RADIUS).asin();
        let phi_split = (WING_SPLIT_Y / THREE_POINT_RADIUS).asin();
        // X of the wing/center split points on the arc (y = +/-14), and the
        // basket sightline through them extended to the sideline.
        let split_x = BASKET_X
            - (THREE_POINT_RADIUS * THREE_POINT_RADIUS - WING_SPLIT_Y * WING_SPLIT_Y).sqrt();
        let sight_x = BASKET_X - (BASKET_X - split_x) * (SIDELINE_Y / WING_SPLIT_Y);
        let corner_x = BASELINE_X - CORNER_ZONE_DEPTH;

        let mut arc_knots: Vec<f64> = (0..ARC_SAMPLES)
            .map(|i| -phi_break + 2.0 * phi_break * (i as f64) / (ARC_SAMPLES as f64 - 1.0))
            .collect();
        arc_knots.extend_from_slice(&[-phi_split, 0.0, phi_split]);
        arc_knots.sort_by(|a, b| a.partial_cmp(b).unwrap());
        arc_knots.dedup_by(|a, b| (*a - *b).abs() < 1e-12);

        Derived {
            phi_break,
            phi_split,
            sight_x,
            corner_x,
            arc_knots,
        }
    }
}

/// Points on the three-point arc for knot angles in `phi0..=phi1`, where phi
/// is measured at the basket from the direction of the half-court line
/// (positive toward positive y). Bounds must themselves be knot angles.
fn three_point_arc(phi0: f64, phi1: f64, d: &Derived) -> Vec<Point> {
    let (lo, hi) = (phi0.min(phi1), phi0.max(phi1));
    let mut points: Vec<Point> = d
        .arc_knots
        .iter()
        .filter(|phi| **phi >= lo - 1e-12 && **phi <= hi + 1e-12)
        .map(|phi| {
            Point::new(
                BASKET_X - THREE_POINT_RADIUS * phi.cos(),
                THREE_POINT_RADIUS * phi.sin(),
            )
        })
        .collect();
    if phi0 > phi1 {
        points.reverse();
    }
    points
}

/// The close-range semicircle, swept from (BASKET_X, -r) through the
/// half-court side to (BASKET_X, +r).
fn close_range_arc(samples: usize) -> Vec<Point> {
    (0..samples)
        .map(|i| {
            let t = i as f64 / (samples - 1) as f64;
            let theta = -PI / 2.0 - PI * t;
            Point::new(
                BASKET_X + CLOSE_RANGE_RADIUS * theta.cos(),
                CLOSE_RANGE_RADIUS * theta.sin(),
            )
        })
        .collect()
}

fn region_ring(label: RegionLabel, d: &Derived) -> Vec<Point> {
    let basket = Point::new(BASKET_X, 0.0);
    match label {
        RegionLabel::BeyondHalfcourt => vec![
            Point::new(HALF_COURT_X, -SIDELINE_Y),
            Point::new(HALF_COURT_X, SIDELINE_Y),
            Point::new(BACKCOURT_X, SIDELINE_Y),
            Point::new(BACKCOURT_X, -SIDELINE_Y),
        ],

        RegionLabel::CloseRange => {
            // Lane extension to the baseline, then around the semicircle.
            let mut ring = vec![
                Point::new(BASELINE_X, -LANE_HALF_WIDTH),
                Point::new(BASKET_X, -LANE_HALF_WIDTH),
                Point::new(BASKET_X, -CLOSE_RANGE_RADIUS),
            ];
            ring.extend(close_range_arc(48));
            ring.push(Point::new(BASKET_X, LANE_HALF_WIDTH));
            ring.push(Point::new(BASELINE_X, LANE_HALF_WIDTH));
            ring
        }

        RegionLabel::LeftBaselineMid => {
            let mut ring = vec![basket];
            ring.extend(three_point_arc(d.phi_split, d.phi_break, d));
            ring.push(Point::new(BASELINE_X, CORNER_THREE_Y));
            ring.push(Point::new(BASELINE_X, 0.0));
            ring
        }

        RegionLabel::RightBaselineMid => {
            let mut ring = vec![basket];
            ring.extend(three_point_arc(-d.phi_split, -d.phi_break, d));
            ring.push(Point::new(BASELINE_X, -CORNER_THREE_Y));
            ring.push(Point::new(BASELINE_X, 0.0));
            ring
        }

        RegionLabel::LeftElbowMid => {
            let mut ring = vec![basket];
            ring.extend(three_point_arc(0.0, d.phi_split, d));
            ring
        }

        RegionLabel::RightElbowMid => {
            let mut ring = vec![basket];
            ring.extend(three_point_arc(0.0, -d.phi_split, d));
            ring
        }

        RegionLabel::LeftCornerThree => vec![
            Point::new(d.corner_x, SIDELINE_Y),
            Point::new(d.corner_x, CORNER_THREE_Y),
            Point::new(BASELINE_X, CORNER_THREE_Y),
            Point::new(BASELINE_X, SIDELINE_Y),
        ],

        RegionLabel::RightCornerThree => vec![
            Point::new(d.corner_x, -SIDELINE_Y),
            Point::new(d.corner_x, -CORNER_THREE_Y),
            Point::new(BASELINE_X, -CORNER_THREE_Y),
            Point::new(BASELINE_X, -SIDELINE_Y),
        ],

        RegionLabel::LeftWingThree => {
            let mut ring = three_point_arc(d.phi_split, d.phi_break, d);
            ring.push(Point::new(d.corner_x, CORNER_THREE_Y));
            ring.push(Point::new(d.corner_x, SIDELINE_Y));
            ring.push(Point::new(d.sight_x, SIDELINE_Y));
            ring
        }

        RegionLabel::RightWingThree => {
            let mut ring = three_point_arc(-d.phi_split, -d.phi_break, d);
            ring.push(Point::new(d.corner_x, -CORNER_THREE_Y));
            ring.push(Point::new(d.corner_x, -SIDELINE_Y));
            ring.push(Point::new(d.sight_x, -SIDELINE_Y));
            ring
        }

        RegionLabel::CenterThree => {
            let mut ring = three_point_arc(-d.phi_split, d.phi_split, d);
            ring.push(Point::new(d.sight_x, SIDELINE_Y));
            ring.push(Point::new(HALF_COURT_X, SIDELINE_Y));
            ring.push(Point::new(HALF_COURT_X, -SIDELINE_Y));
            ring.push(Point::new(d.sight_x, -SIDELINE_Y));
            ring
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
