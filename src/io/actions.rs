// Shot/rebound joining: turns the raw event and tracking feeds into typed
// shot records with ball coordinates, the attacking basket, and (for misses)
// the matched rebound.
//
// Matching rule: a rebound belongs to the latest missed shot before it in
// the same game and period, and each rebound is used at most once. Shot and
// rebound coordinates come from the ball's tracking rows at those instants.

use std::collections::HashSet;

use tracing::warn;

use super::events::{EventType, GameEvent};
use super::possessions::{basket_at, Possession};
use super::tracking::{ball_at_moment, TrackingRow};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The rebound matched to a missed shot.
#[derive(Debug, Clone)]
pub struct ReboundRecord {
    pub wc_time: f64,
    pub x: f64,
    pub y: f64,
    pub team_id: String,
    /// Defensive (true) or offensive (false); `None` for team rebounds.
    pub defensive: Option<bool>,
}

/// One shot attempt, fully joined and ready for the analysis core.
#[derive(Debug, Clone)]
pub struct ShotRecord {
    pub game_id: String,
    pub player_id: String,
    pub team_id: String,
    pub period: u32,
    pub wc_time: f64,
    /// Ball location at release, raw court coordinates.
    pub x: f64,
    pub y: f64,
    pub made: bool,
    pub three: bool,
    /// The basket this shot attacked, from the containing possession.
    pub basket_x: f64,
    /// Matched rebound; always `None` for makes.
    pub rebound: Option<ReboundRecord>,
}

// ---------------------------------------------------------------------------
// Join
// ---------------------------------------------------------------------------

/// Join shots to rebounds, ball coordinates, and the attacking basket.
///
/// Shots that cannot be joined completely (no ball tracking row at the shot
/// instant, or no containing possession) are dropped with a warning; a miss
/// whose rebound lacks ball coordinates keeps the shot and drops only the
/// rebound.
pub fn extract_shots_and_rebounds(
    events: &[GameEvent],
    tracking: &[TrackingRow],
    possessions: &[Possession],
) -> Vec<ShotRecord> {
    // Indices of shot events, in feed (wall-clock) order.
    let shot_indices: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| e.event_type == EventType::Shot)
        .map(|(i, _)| i)
        .collect();

    // Assign each rebound to the latest prior unmatched missed shot in the
    // same game and period.
    let mut rebound_of_shot: Vec<Option<usize>> = vec![None; events.len()];
    let mut matched_shots: HashSet<usize> = HashSet::new();
    for (reb_idx, reb) in events.iter().enumerate() {
        if reb.event_type != EventType::Rebound {
            continue;
        }
        let candidate = shot_indices
            .iter()
            .copied()
            .filter(|&si| {
                let shot = &events[si];
                shot.game_id == reb.game_id
                    && shot.period == reb.period
                    && shot.wc_time < reb.wc_time
                    && shot.made == Some(false)
                    && !matched_shots.contains(&si)
            })
            .max_by(|&a, &b| {
                events[a]
                    .wc_time
                    .partial_cmp(&events[b].wc_time)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        if let Some(shot_idx) = candidate {
            matched_shots.insert(shot_idx);
            rebound_of_shot[shot_idx] = Some(reb_idx);
        }
    }

    let mut records = Vec::with_capacity(shot_indices.len());
    for si in shot_indices {
        let shot = &events[si];
        let (Some(player_id), Some(made)) = (&shot.player_id, shot.made) else {
            warn!(
                game = %shot.game_id,
                time = shot.wc_time,
                "skipping shot with missing shooter or outcome"
            );
            continue;
        };

        let Some(location) = ball_at_moment(tracking, &shot.game_id, shot.wc_time) else {
            warn!(
                game = %shot.game_id,
                time = shot.wc_time,
                "skipping shot with no ball tracking at release"
            );
            continue;
        };

        let Some(basket_x) = basket_at(
            possessions,
            &shot.game_id,
            shot.period,
            &shot.team_id,
            shot.wc_time,
        ) else {
            warn!(
                game = %shot.game_id,
                time = shot.wc_time,
                "skipping shot with no containing possession"
            );
            continue;
        };

        let rebound = if made {
            None
        } else {
            rebound_of_shot[si].and_then(|reb_idx| {
                let reb = &events[reb_idx];
                match ball_at_moment(tracking, &reb.game_id, reb.wc_time) {
                    Some(loc) => Some(ReboundRecord {
                        wc_time: reb.wc_time,
                        x: loc.x,
                        y: loc.y,
                        team_id: reb.team_id.clone(),
                        defensive: reb.d_reb,
                    }),
                    None => {
                        warn!(
                            game = %reb.game_id,
                            time = reb.wc_time,
                            "rebound has no ball tracking, keeping shot without it"
                        );
                        None
                    }
                }
            })
        };

        records.push(ShotRecord {
            game_id: shot.game_id.clone(),
            player_id: player_id.clone(),
            team_id: shot.team_id.clone(),
            period: shot.period,
            wc_time: shot.wc_time,
            x: location.x,
            y: location.y,
            made,
            three: shot.three.unwrap_or(false),
            basket_x,
            rebound,
        });
    }
    records
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::events::load_events_from_reader;
    use crate::io::possessions::load_possessions_from_reader;
    use crate::io::tracking::load_tracking_from_reader;

    const EVENT_HEADER: &str = "gameId,eventType,playerId,playerName,teamId,teamAbbr,period,wcTime,wcTimeEnd,gcTime,scTime,fouledId,fouledName,foulType,made,three,fouled,assisted,receiverId,receiverName,distance,dReb,defenderProximity,defenderId,defenderName\n";
    const TRACK_HEADER: &str =
        "gameId,playerId,playerName,teamId,teamAbbr,period,wcTime,gcTime,scTime,x,y,z,gameDate\n";
    const POSS_HEADER: &str =
        "gameId,period,possId,possNum,teamId,teamAbbr,outcome,ptsScored,wcStart,wcEnd,gcStart,gcEnd,basketX\n";

    fn fixture() -> (Vec<GameEvent>, Vec<TrackingRow>, Vec<Possession>) {
        let mut ev = String::from(EVENT_HEADER);
        // Two misses then a rebound: the rebound pairs with the SECOND miss.
        ev.push_str("g1,SHOT,p1,Alice,t1,AAA,1,100.0,,600,20,,,,False,False,,,,,20.1,,,,\n");
        ev.push_str("g1,SHOT,p2,Bella,t1,AAA,1,110.0,,590,15,,,,False,True,,,,,25.0,,,,\n");
        ev.push_str("g1,REB,p9,Zoe,t2,BBB,1,112.0,,588,24,,,,,,,,,,,True,,,\n");
        // A make: no rebound expected.
        ev.push_str("g1,SHOT,p3,Cara,t1,AAA,1,120.0,,580,12,,,,True,False,,,,,8.0,,,,\n");

        let mut tr = String::from(TRACK_HEADER);
        for (t, x, y) in [(100.0, 30.0, 4.0), (110.0, 25.0, -8.0), (112.0, 40.0, 1.0), (120.0, 38.0, 0.0)] {
            tr.push_str(&format!("g1,,ball,-1,BAL,1,{t},600,20,{x},{y},9.0,2024-02-10\n"));
        }

        let mut po = String::from(POSS_HEADER);
        po.push_str("g1,1,poss1,1,t1,AAA,MISS,0,95.0,125.0,600,575,41.75\n");

        (
            load_events_from_reader(ev.as_bytes()).unwrap(),
            load_tracking_from_reader(tr.as_bytes()).unwrap(),
            load_possessions_from_reader(po.as_bytes()).unwrap(),
        )
    }

    #[test]
    fn rebound_pairs_with_latest_prior_miss() {
        let (events, tracking, possessions) = fixture();
        let records = extract_shots_and_rebounds(&events, &tracking, &possessions);
        assert_eq!(records.len(), 3);

        let first_miss = &records[0];
        assert_eq!(first_miss.player_id, "p1");
        assert!(first_miss.rebound.is_none(), "older miss must not steal the rebound");

        let second_miss = &records[1];
        assert_eq!(second_miss.player_id, "p2");
        let reb = second_miss.rebound.as_ref().unwrap();
        assert_eq!(reb.team_id, "t2");
        assert_eq!(reb.wc_time, 112.0);
        assert_eq!(reb.x, 40.0);
        assert_eq!(reb.defensive, Some(true));
    }

    #[test]
    fn made_shots_carry_no_rebound() {
        let (events, tracking, possessions) = fixture();
        let records = extract_shots_and_rebounds(&events, &tracking, &possessions);
        let make = records.iter().find(|r| r.player_id == "p3").unwrap();
        assert!(make.made);
        assert!(make.rebound.is_none());
    }

    #[test]
    fn shot_coordinates_come_from_ball_tracking() {
        let (events, tracking, possessions) = fixture();
        let records = extract_shots_and_rebounds(&events, &tracking, &possessions);
        let shot = &records[0];
        assert_eq!(shot.x, 30.0);
        assert_eq!(shot.y, 4.0);
        assert_eq!(shot.basket_x, 41.75);
    }

    #[test]
    fn shot_without_tracking_is_dropped() {
        let (mut events, tracking, possessions) = fixture();
        // Add a shot at an instant with no ball row.
        events.push(GameEvent {
            game_id: "g1".into(),
            event_type: EventType::Shot,
            player_id: Some("p4".into()),
            team_id: "t1".into(),
            period: 1,
            wc_time: 122.0,
            fouled_id: None,
            made: Some(false),
            three: Some(false),
            d_reb: None,
        });
        let records = extract_shots_and_rebounds(&events, &tracking, &possessions);
        assert!(records.iter().all(|r| r.player_id != "p4"));
    }

    #[test]
    fn shot_outside_any_possession_is_dropped() {
        let (events, tracking, _) = fixture();
        let records = extract_shots_and_rebounds(&events, &tracking, &[]);
        assert!(records.is_empty());
    }
}
