// Possession and player statistics derived from the event and tracking
// feeds: true points produced (shot value including free throws from a
// shooting foul), travel distance / average speed, and the league-average
// points per possession following an offensive rebound.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::io::events::{extract_off_rebounds, EventType, GameEvent};
use crate::io::possessions::{possession_at, Possession};
use crate::io::tracking::TrackingRow;

/// Feet-per-second to miles-per-hour.
const FPS_TO_MPH: f64 = 0.681818;

// ---------------------------------------------------------------------------
// True points produced
// ---------------------------------------------------------------------------

/// Realized point value of one shot attempt.
#[derive(Debug, Clone, Serialize)]
pub struct TruePoints {
    pub game_id: String,
    pub player_id: String,
    pub team_id: String,
    pub period: u32,
    pub wc_time: f64,
    /// Points from the field goal itself.
    pub points_produced: f64,
    /// Field goal points plus made free throws awarded for a foul on the
    /// shot (the and-one or the full trip after a missed fouled attempt).
    pub true_points_produced: f64,
}

/// Scanner states for the foul/free-throw continuation that can follow a
/// shot attempt.
enum ScanState {
    /// No open free-throw sequence.
    AwaitingShot,
    /// The last event was a shot by `shooter` at `shot` (index into the
    /// output); a foul on that shooter opens a free-throw trip.
    AwaitingFoul { shot: usize, shooter: String },
    /// Counting made free throws by `shooter` into `shot`'s total; any
    /// non-free-throw event closes the trip.
    CountingFreeThrows { shot: usize, shooter: String },
}

/// Compute true points produced for every shot in a wall-clock-ordered
/// event stream.
///
/// The foul must be the event immediately following the shot and name the
/// shooter as the fouled player; free throws then accrue to that shot until
/// a non-free-throw event ends the trip. Shots without an attributable
/// shooter or outcome are skipped.
pub fn true_points(events: &[GameEvent]) -> Vec<TruePoints> {
    let mut shots: Vec<TruePoints> = Vec::new();
    let mut state = ScanState::AwaitingShot;

    for event in events {
        if event.event_type == EventType::Shot {
            let (Some(player_id), Some(made)) = (&event.player_id, event.made) else {
                state = ScanState::AwaitingShot;
                continue;
            };
            let points = if made {
                if event.three == Some(true) {
                    3.0
                } else {
                    2.0
                }
            } else {
                0.0
            };
            shots.push(TruePoints {
                game_id: event.game_id.clone(),
                player_id: player_id.clone(),
                team_id: event.team_id.clone(),
                period: event.period,
                wc_time: event.wc_time,
                points_produced: points,
                true_points_produced: points,
            });
            state = ScanState::AwaitingFoul {
                shot: shots.len() - 1,
                shooter: player_id.clone(),
            };
            continue;
        }

        state = match (state, &event.event_type) {
            (ScanState::AwaitingFoul { shot, shooter }, EventType::Foul)
                if event.fouled_id.as_deref() == Some(shooter.as_str()) =>
            {
                ScanState::CountingFreeThrows { shot, shooter }
            }

            (ScanState::CountingFreeThrows { shot, shooter }, EventType::FreeThrow) => {
                if event.player_id.as_deref() == Some(shooter.as_str())
                    && event.made == Some(true)
                {
                    shots[shot].true_points_produced += 1.0;
                }
                ScanState::CountingFreeThrows { shot, shooter }
            }

            // A foul on someone else, or any event after the trip, resets.
            _ => ScanState::AwaitingShot,
        };
    }
    shots
}

// ---------------------------------------------------------------------------
// Travel distance and speed
// ---------------------------------------------------------------------------

/// Total distance traveled per player over the given tracking rows, in feet.
pub fn travel_distance(rows: &[TrackingRow]) -> BTreeMap<String, f64> {
    let mut by_player: BTreeMap<String, Vec<(f64, f64, f64)>> = BTreeMap::new();
    for row in rows {
        if let Some(player_id) = &row.player_id {
            by_player
                .entry(player_id.clone())
                .or_default()
                .push((row.wc_time, row.x, row.y));
        }
    }

    let mut distances = BTreeMap::new();
    for (player_id, mut frames) in by_player {
        frames.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        let total: f64 = frames
            .windows(2)
            .map(|w| {
                let dx = w[1].1 - w[0].1;
                let dy = w[1].2 - w[0].2;
                (dx * dx + dy * dy).sqrt()
            })
            .sum();
        distances.insert(player_id, total);
    }
    distances
}

/// Average speed per player in miles per hour over the given rows. Players
/// with fewer than two frames, or a zero elapsed span, are omitted.
pub fn average_speed(rows: &[TrackingRow]) -> BTreeMap<String, f64> {
    let mut spans: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for row in rows {
        if let Some(player_id) = &row.player_id {
            let span = spans
                .entry(player_id.clone())
                .or_insert((row.wc_time, row.wc_time));
            span.0 = span.0.min(row.wc_time);
            span.1 = span.1.max(row.wc_time);
        }
    }

    let distances = travel_distance(rows);
    let mut speeds = BTreeMap::new();
    for (player_id, distance) in distances {
        let Some((start, end)) = spans.get(&player_id) else {
            continue;
        };
        let seconds = end - start;
        if seconds > 0.0 {
            speeds.insert(player_id, distance / seconds * FPS_TO_MPH);
        }
    }
    speeds
}

// ---------------------------------------------------------------------------
// Offensive-rebound points per possession
// ---------------------------------------------------------------------------

/// League-average points scored on possessions where the possessing team
/// recovered an offensive rebound. `None` when no qualifying possessions
/// exist (callers fall back to a configured value).
pub fn oreb_points_per_possession(
    events: &[GameEvent],
    possessions: &[Possession],
) -> Option<f64> {
    let mut seen: Vec<&str> = Vec::new();
    let mut total_points = 0.0;
    for oreb in extract_off_rebounds(events) {
        let Some(possession) = possession_at(
            possessions,
            &oreb.game_id,
            oreb.period,
            &oreb.team_id,
            oreb.wc_time,
        ) else {
            continue;
        };
        // A possession with several offensive rebounds still counts once.
        if seen.contains(&possession.poss_id.as_str()) {
            continue;
        }
        seen.push(&possession.poss_id);
        total_points += possession.pts_scored;
    }

    if seen.is_empty() {
        None
    } else {
        Some(total_points / seen.len() as f64)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
