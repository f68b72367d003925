// Rebound recovery probabilities: a precomputed rebound-location density
// surface weighted by each player's Voronoi cell.
//
// The density table is built once per analysis run by binning the landing
// locations of historical missed-shot rebounds (in the canonical frame),
// keyed by the region the miss was taken from plus an overall table. Per
// query, each sample's mass is credited to the player whose cell contains
// it; shares are percentages of the total mass that landed in any cell.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::court::geometry::{Point, Polygon};
use crate::court::regions::{RegionLabel, BASELINE_X, HALF_COURT_X, SIDELINE_Y};

// ---------------------------------------------------------------------------
// Density surface
// ---------------------------------------------------------------------------

/// One cell-center of the rebound-location heatmap.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DensitySample {
    pub x: f64,
    pub y: f64,
    pub density: f64,
}

/// Rebound-location densities, per shot region and overall. Read-only after
/// construction.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DensityTable {
    global: Vec<DensitySample>,
    by_region: HashMap<RegionLabel, Vec<DensitySample>>,
}

impl DensityTable {
    /// Bin canonical-frame rebound locations into square cells of
    /// `bin_size` feet. Each rebound contributes to its shot-region table
    /// (when the shot classified) and always to the global table. Locations
    /// outside the half court are ignored.
    pub fn build(rebounds: &[(Option<RegionLabel>, Point)], bin_size: f64) -> DensityTable {
        let mut global: HashMap<(i64, i64), f64> = HashMap::new();
        let mut by_region: HashMap<RegionLabel, HashMap<(i64, i64), f64>> = HashMap::new();

        for (region, location) in rebounds {
            let Some(bin) = bin_index(*location, bin_size) else {
                continue;
            };
            *global.entry(bin).or_insert(0.0) += 1.0;
            if let Some(label) = region {
                *by_region.entry(*label).or_default().entry(bin).or_insert(0.0) += 1.0;
            }
        }

        DensityTable {
            global: to_samples(global, bin_size),
            by_region: by_region
                .into_iter()
                .map(|(label, bins)| (label, to_samples(bins, bin_size)))
                .collect(),
        }
    }

    pub fn global(&self) -> &[DensitySample] {
        &self.global
    }

    /// Samples for a shot region, falling back to the global table when the
    /// shot was unclassified or the region has no coverage.
    pub fn samples_for(&self, region: Option<RegionLabel>) -> &[DensitySample] {
        region
            .and_then(|label| self.by_region.get(&label))
            .map(Vec::as_slice)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.global)
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_empty()
    }
}

fn bin_index(p: Point, bin_size: f64) -> Option<(i64, i64)> {
    if !p.is_finite() {
        return None;
    }
    if p.x < HALF_COURT_X || p.x > BASELINE_X || p.y < -SIDELINE_Y || p.y > SIDELINE_Y {
        return None;
    }
    Some((
        ((p.x - HALF_COURT_X) / bin_size).floor() as i64,
        ((p.y + SIDELINE_Y) / bin_size).floor() as i64,
    ))
}

fn to_samples(bins: HashMap<(i64, i64), f64>, bin_size: f64) -> Vec<DensitySample> {
    let mut samples: Vec<DensitySample> = bins
        .into_iter()
        .map(|((ix, iy), density)| DensitySample {
            x: HALF_COURT_X + (ix as f64 + 0.5) * bin_size,
            y: -SIDELINE_Y + (iy as f64 + 0.5) * bin_size,
            density,
        })
        .collect();
    // Deterministic ordering regardless of hash state.
    samples.sort_by(|a, b| {
        (a.x, a.y)
            .partial_cmp(&(b.x, b.y))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    samples
}

// ---------------------------------------------------------------------------
// Probability aggregation
// ---------------------------------------------------------------------------

/// Rebound recovery shares, in percent. Players and teams with no credited
/// mass are omitted entirely; absence means zero. Both maps are empty when
/// no sample landed in any cell.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReboundChances {
    pub players: BTreeMap<String, f64>,
    pub teams: BTreeMap<String, f64>,
}

impl ReboundChances {
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Distribute density mass across player cells and their teams.
///
/// Cells do not overlap (tessellation), so each sample lands in at most one
/// cell; samples outside every cell contribute nothing. A zero grand total
/// yields empty maps rather than a division error.
pub fn rebound_chances(
    samples: &[DensitySample],
    cells: &BTreeMap<String, Polygon>,
    team_of: &HashMap<String, String>,
) -> ReboundChances {
    let mut player_mass: BTreeMap<&str, f64> = BTreeMap::new();
    let mut team_mass: BTreeMap<&str, f64> = BTreeMap::new();
    let mut grand_total = 0.0;

    for sample in samples {
        if sample.density <= 0.0 {
            continue;
        }
        let point = Point::new(sample.x, sample.y);
        // Boundary-inclusive containment can match two adjacent cells for a
        // sample exactly on a shared edge; first match (player-id order)
        // wins, keeping the result deterministic.
        let owner = cells
            .iter()
            .find(|(_, cell)| cell.contains(point))
            .map(|(id, _)| id.as_str());
        let Some(owner) = owner else {
            continue;
        };

        *player_mass.entry(owner).or_insert(0.0) += sample.density;
        if let Some(team) = team_of.get(owner) {
            *team_mass.entry(team.as_str()).or_insert(0.0) += sample.density;
        }
        grand_total += sample.density;
    }

    if grand_total <= 0.0 {
        return ReboundChances::default();
    }

    ReboundChances {
        players: player_mass
            .into_iter()
            .map(|(id, mass)| (id.to_string(), mass / grand_total * 100.0))
            .collect(),
        teams: team_mass
            .into_iter()
            .map(|(id, mass)| (id.to_string(), mass / grand_total * 100.0))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
