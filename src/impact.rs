// Impact points: credit a missed shot with the expected value of the
// offensive-rebound continuation it still creates.
//
// A make ends the possession, so its impact equals its true points. A miss
// is worth the shooting team's spatially modeled chance of recovering the
// ball times the league-average points that follow an offensive rebound.

use serde::Serialize;

/// Expected continuation value and adjusted point value for one shot.
///
/// Both fields are `None` when a miss has no usable rebound-chance estimate
/// (empty probability maps, no density coverage). Callers must report that
/// as missing, not as zero, so averages are not biased downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImpactPoints {
    pub expected_oreb_points: Option<f64>,
    pub true_impact_points: Option<f64>,
}

/// Compute impact points for a single shot.
///
/// `off_reb_chance` is the shooting team's rebound-recovery share in percent
/// (`None` when unavailable); `oreb_ppp` is the precomputed league-average
/// points per possession following an offensive rebound.
pub fn impact_points(
    made: bool,
    true_points: f64,
    off_reb_chance: Option<f64>,
    oreb_ppp: f64,
) -> ImpactPoints {
    if made {
        // No possession continuation on a make.
        return ImpactPoints {
            expected_oreb_points: Some(0.0),
            true_impact_points: Some(true_points),
        };
    }
    match off_reb_chance {
        Some(chance) => {
            let expected = chance / 100.0 * oreb_ppp;
            ImpactPoints {
                expected_oreb_points: Some(expected),
                true_impact_points: Some(true_points + expected),
            }
        }
        None => ImpactPoints {
            expected_oreb_points: None,
            true_impact_points: None,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
