// Spatial dominance: Voronoi tessellation over on-court player positions.
//
// Each player's cell is the set of half-court points closer to that player
// than to any other, built directly as the intersection of bisector
// half-planes with the half-court rectangle. Cells are therefore bounded by
// construction and the clipped cells tile the half court exactly; no
// synthetic boundary sites are needed.
//
// Cells are recomputed on every call. Positions move continuously, so there
// is nothing worth caching across instants.

use std::collections::BTreeMap;

use tracing::debug;

use crate::court::geometry::{Point, Polygon, GEOM_EPSILON};
use crate::court::normalize;
use crate::court::regions::{BASELINE_X, HALF_COURT_X, SIDELINE_Y};

/// One player's position at an instant, in raw court coordinates.
#[derive(Debug, Clone)]
pub struct PlayerPosition {
    pub player_id: String,
    pub team_id: String,
    pub x: f64,
    pub y: f64,
}

/// Compute the clipped Voronoi cell for every supplied player.
///
/// Positions are normalized into the canonical right-attack frame first, so
/// the returned polygons live in the same frame as the region model and the
/// rebound density samples. Non-finite positions are dropped. With fewer
/// than two usable players there is no meaningful tessellation and the
/// result is empty; callers treat that as "no spatial information", never as
/// an error.
pub fn tessellate(positions: &[PlayerPosition], basket_x: f64) -> BTreeMap<String, Polygon> {
    let sites: Vec<(&str, Point)> = positions
        .iter()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .map(|p| (p.player_id.as_str(), normalize(p.x, p.y, basket_x)))
        .collect();

    let mut cells = BTreeMap::new();
    if sites.len() < 2 {
        debug!(
            players = sites.len(),
            "degenerate tessellation input, returning no cells"
        );
        return cells;
    }

    let court = Polygon::rect(HALF_COURT_X, -SIDELINE_Y, BASELINE_X, SIDELINE_Y);

    for (i, (player_id, site)) in sites.iter().enumerate() {
        let mut cell = Some(court.clone());
        for (j, (_, other)) in sites.iter().enumerate() {
            if i == j {
                continue;
            }
            // Coincident sites have no bisector; skip rather than divide by
            // zero. Duplicate positions are an input-quality problem and the
            // resulting overlapping cells are at least deterministic.
            if site.distance_sq(*other) < GEOM_EPSILON * GEOM_EPSILON {
                continue;
            }
            // Points p with |p - site| <= |p - other|, rewritten as a linear
            // half-plane: 2(other - site) . p <= |other|^2 - |site|^2.
            let normal = (2.0 * (other.x - site.x), 2.0 * (other.y - site.y));
            let c = (other.x * other.x + other.y * other.y)
                - (site.x * site.x + site.y * site.y);
            cell = match cell {
                Some(poly) => poly.clip_halfplane(normal, c),
                None => None,
            };
            if cell.is_none() {
                break;
            }
        }
        // Off-court players can end up with an empty clipped cell; they
        // simply contest no half-court area.
        if let Some(poly) = cell {
            cells.insert((*player_id).to_string(), poly);
        }
    }
    cells
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
