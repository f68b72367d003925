// Batch analysis driver: joins the typed feeds, runs every shot through the
// classification / tessellation / probability pipeline, and assembles a
// serializable report.
//
// Each shot is processed independently against read-only inputs (the region
// set and the density table), so a caller that wants parallelism can split
// the shot list across workers without any synchronization.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::court::{classify, normalize, CourtRegions, RegionLabel};
use crate::impact::{impact_points, ImpactPoints};
use crate::io::actions::{extract_shots_and_rebounds, ShotRecord};
use crate::io::events::GameEvent;
use crate::io::possessions::Possession;
use crate::io::same_instant;
use crate::io::tracking::{positions_at_moment, TrackingRow};
use crate::rebound::{rebound_chances, DensityTable};
use crate::spatial::tessellate;
use crate::stats::{oreb_points_per_possession, true_points};

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// One fully analyzed shot attempt.
#[derive(Debug, Clone, Serialize)]
pub struct ShotBreakdown {
    pub game_id: String,
    pub player_id: String,
    pub team_id: String,
    pub period: u32,
    pub wc_time: f64,
    pub x: f64,
    pub y: f64,
    pub made: bool,
    pub three: bool,
    /// `None` when the location classified to no region; reported as null,
    /// never coerced to a zero-value label.
    pub region: Option<RegionLabel>,
    pub points_produced: f64,
    pub true_points_produced: f64,
    /// Shooting team's rebound-recovery share in percent; `None` when no
    /// estimate was possible for a miss (and for all makes).
    pub off_reb_chance: Option<f64>,
    pub expected_oreb_points: Option<f64>,
    pub true_impact_points: Option<f64>,
}

/// Aggregates for one region. Shots with no impact estimate are counted in
/// `missing_impact` and excluded from `avg_impact_points`, not averaged in
/// as zero.
#[derive(Debug, Clone, Serialize)]
pub struct RegionSummary {
    pub region: RegionLabel,
    pub attempts: usize,
    pub makes: usize,
    pub avg_true_points: f64,
    pub avg_impact_points: Option<f64>,
    pub missing_impact: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_at: String,
    pub games: Vec<String>,
    /// League points per possession following an offensive rebound; `None`
    /// when neither configured nor derivable from the possession data.
    pub oreb_ppp: Option<f64>,
    pub unclassified_shots: usize,
    pub shots: Vec<ShotBreakdown>,
    pub regions: Vec<RegionSummary>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the full analysis over pre-loaded feeds.
pub fn run(
    config: &Config,
    regions: &CourtRegions,
    tracking: &[TrackingRow],
    events: &[GameEvent],
    possessions: &[Possession],
) -> AnalysisReport {
    let shots = extract_shots_and_rebounds(events, tracking, possessions);
    info!(shots = shots.len(), "joined shot records");

    let realized = true_points(events);

    // Density surface from the rebounds of classified misses.
    let rebound_locations: Vec<(Option<RegionLabel>, crate::court::Point)> = shots
        .iter()
        .filter(|s| !s.made)
        .filter_map(|s| {
            s.rebound.as_ref().map(|reb| {
                (
                    classify(regions, s.x, s.y, s.basket_x),
                    normalize(reb.x, reb.y, s.basket_x),
                )
            })
        })
        .collect();
    let density = DensityTable::build(&rebound_locations, config.analysis.density_bin_size);
    if density.is_empty() {
        warn!("no rebound locations available; rebound chances will be empty");
    }

    let oreb_ppp = match config.analysis.oreb_ppp {
        Some(configured) => Some(configured),
        None => {
            let computed = oreb_points_per_possession(events, possessions);
            if computed.is_none() {
                warn!("no offensive-rebound possessions found and no oreb_ppp configured");
            }
            computed
        }
    };

    let breakdowns: Vec<ShotBreakdown> = shots
        .iter()
        .map(|shot| analyze_shot(shot, regions, &density, tracking, &realized, oreb_ppp))
        .collect();

    let unclassified = breakdowns.iter().filter(|b| b.region.is_none()).count();
    let summaries = summarize_regions(&breakdowns);

    let mut games: Vec<String> = breakdowns.iter().map(|b| b.game_id.clone()).collect();
    games.sort();
    games.dedup();

    AnalysisReport {
        generated_at: Utc::now().to_rfc3339(),
        games,
        oreb_ppp,
        unclassified_shots: unclassified,
        shots: breakdowns,
        regions: summaries,
    }
}

/// Analyze one shot: classify, tessellate the moment, and value the miss.
fn analyze_shot(
    shot: &ShotRecord,
    regions: &CourtRegions,
    density: &DensityTable,
    tracking: &[TrackingRow],
    realized: &[crate::stats::TruePoints],
    oreb_ppp: Option<f64>,
) -> ShotBreakdown {
    let region = classify(regions, shot.x, shot.y, shot.basket_x);

    // Realized value from the event scan; fall back to the raw field-goal
    // value if the scan somehow skipped this shot.
    let (points, true_pts) = realized
        .iter()
        .find(|tp| {
            tp.game_id == shot.game_id
                && tp.player_id == shot.player_id
                && same_instant(tp.wc_time, shot.wc_time)
        })
        .map(|tp| (tp.points_produced, tp.true_points_produced))
        .unwrap_or_else(|| {
            let base = match (shot.made, shot.three) {
                (true, true) => 3.0,
                (true, false) => 2.0,
                (false, _) => 0.0,
            };
            (base, base)
        });

    let off_reb_chance = if shot.made {
        None
    } else {
        offensive_rebound_chance(shot, region, density, tracking)
    };

    let impact = match (shot.made, oreb_ppp) {
        (true, _) => impact_points(true, true_pts, None, 0.0),
        (false, Some(ppp)) => impact_points(false, true_pts, off_reb_chance, ppp),
        // A miss with no continuation value available stays unvalued.
        (false, None) => ImpactPoints {
            expected_oreb_points: None,
            true_impact_points: None,
        },
    };

    ShotBreakdown {
        game_id: shot.game_id.clone(),
        player_id: shot.player_id.clone(),
        team_id: shot.team_id.clone(),
        period: shot.period,
        wc_time: shot.wc_time,
        x: shot.x,
        y: shot.y,
        made: shot.made,
        three: shot.three,
        region,
        points_produced: points,
        true_points_produced: true_pts,
        off_reb_chance,
        expected_oreb_points: impact.expected_oreb_points,
        true_impact_points: impact.true_impact_points,
    }
}

/// The shooting team's rebound-recovery share at the shot instant, from the
/// tessellation of the tracked players against the region's density surface.
fn offensive_rebound_chance(
    shot: &ShotRecord,
    region: Option<RegionLabel>,
    density: &DensityTable,
    tracking: &[TrackingRow],
) -> Option<f64> {
    let positions = positions_at_moment(tracking, &shot.game_id, shot.wc_time);
    let cells = tessellate(&positions, shot.basket_x);
    if cells.is_empty() {
        return None;
    }

    let team_of: HashMap<String, String> = positions
        .iter()
        .map(|p| (p.player_id.clone(), p.team_id.clone()))
        .collect();

    let chances = rebound_chances(density.samples_for(region), &cells, &team_of);
    if chances.is_empty() {
        return None;
    }
    // Absent from a non-empty map means a genuine zero share.
    Some(chances.teams.get(&shot.team_id).copied().unwrap_or(0.0))
}

fn summarize_regions(breakdowns: &[ShotBreakdown]) -> Vec<RegionSummary> {
    let mut grouped: BTreeMap<RegionLabel, Vec<&ShotBreakdown>> = BTreeMap::new();
    for breakdown in breakdowns {
        if let Some(region) = breakdown.region {
            grouped.entry(region).or_default().push(breakdown);
        }
    }

    grouped
        .into_iter()
        .map(|(region, shots)| {
            let attempts = shots.len();
            let makes = shots.iter().filter(|s| s.made).count();
            let avg_true_points =
                shots.iter().map(|s| s.true_points_produced).sum::<f64>() / attempts as f64;

            let valued: Vec<f64> = shots
                .iter()
                .filter_map(|s| s.true_impact_points)
                .collect();
            let avg_impact_points = if valued.is_empty() {
                None
            } else {
                Some(valued.iter().sum::<f64>() / valued.len() as f64)
            };

            RegionSummary {
                region,
                attempts,
                makes,
                avg_true_points,
                avg_impact_points,
                missing_impact: attempts - valued.len(),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
