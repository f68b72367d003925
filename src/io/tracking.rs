// Tracking feed ingestion and moment extraction.
//
// tracking.csv columns:
//   gameId, playerId, playerName, teamId, teamAbbr, period, wcTime, gcTime,
//   scTime, x, y, z, gameDate
//
// Ball rows carry the team sentinel "-1" and an empty playerId.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;

use super::{same_instant, IngestError, BALL_TEAM_ID};
use crate::court::geometry::Point;
use crate::spatial::PlayerPosition;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One tracked entity (player or ball) at one instant.
#[derive(Debug, Clone)]
pub struct TrackingRow {
    pub game_id: String,
    /// `None` for the ball.
    pub player_id: Option<String>,
    pub team_id: String,
    pub period: u32,
    pub wc_time: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub game_date: Option<NaiveDate>,
}

impl TrackingRow {
    pub fn is_ball(&self) -> bool {
        self.team_id == BALL_TEAM_ID
    }
}

// ---------------------------------------------------------------------------
// Raw CSV row (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawTracking {
    #[serde(rename = "gameId")]
    game_id: String,
    #[serde(rename = "playerId")]
    player_id: Option<String>,
    #[serde(rename = "teamId")]
    team_id: String,
    period: u32,
    #[serde(rename = "wcTime")]
    wc_time: f64,
    x: f64,
    y: f64,
    z: Option<f64>,
    #[serde(rename = "gameDate")]
    game_date: Option<String>,
}

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

pub fn load_tracking_from_reader<R: Read>(rdr: R) -> Result<Vec<TrackingRow>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut rows = Vec::new();
    for result in reader.deserialize::<RawTracking>() {
        let raw = result?;
        if !raw.x.is_finite() || !raw.y.is_finite() {
            warn!(
                game = %raw.game_id,
                time = raw.wc_time,
                "skipping tracking row with non-finite coordinates"
            );
            continue;
        }
        let game_date = raw
            .game_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok());
        rows.push(TrackingRow {
            game_id: raw.game_id,
            player_id: raw.player_id.filter(|s| !s.trim().is_empty()),
            team_id: raw.team_id,
            period: raw.period,
            wc_time: raw.wc_time,
            x: raw.x,
            y: raw.y,
            z: raw.z.unwrap_or(0.0),
            game_date,
        });
    }
    rows.sort_by(|a, b| {
        a.wc_time
            .partial_cmp(&b.wc_time)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(rows)
}

/// Load the tracking feed, optionally restricted to a set of game ids.
pub fn load_tracking(path: &Path, games: &[String]) -> Result<Vec<TrackingRow>, IngestError> {
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut rows = load_tracking_from_reader(file).map_err(|source| IngestError::Csv {
        path: path.display().to_string(),
        source,
    })?;
    if !games.is_empty() {
        rows.retain(|r| games.iter().any(|g| g == &r.game_id));
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Moment extraction
// ---------------------------------------------------------------------------

/// Player positions (ball excluded) for one game at one instant.
pub fn positions_at_moment(rows: &[TrackingRow], game_id: &str, wc_time: f64) -> Vec<PlayerPosition> {
    rows.iter()
        .filter(|r| r.game_id == game_id && same_instant(r.wc_time, wc_time) && !r.is_ball())
        .filter_map(|r| {
            r.player_id.as_ref().map(|id| PlayerPosition {
                player_id: id.clone(),
                team_id: r.team_id.clone(),
                x: r.x,
                y: r.y,
            })
        })
        .collect()
}

/// Ball position for one game at one instant, if tracked.
pub fn ball_at_moment(rows: &[TrackingRow], game_id: &str, wc_time: f64) -> Option<Point> {
    rows.iter()
        .find(|r| r.game_id == game_id && same_instant(r.wc_time, wc_time) && r.is_ball())
        .map(|r| Point::new(r.x, r.y))
}

/// Rows within a wall-clock window (inclusive on both ends), e.g. one
/// possession's span.
pub fn slice_window(rows: &[TrackingRow], wc_start: f64, wc_end: f64) -> Vec<&TrackingRow> {
    rows.iter()
        .filter(|r| r.wc_time >= wc_start && r.wc_time <= wc_end)
        .collect()
}

/// Split tracked player ids into the attacking team's and everyone else's.
pub fn offense_defense_split(rows: &[TrackingRow], off_team_id: &str) -> (Vec<String>, Vec<String>) {
    let mut offense = Vec::new();
    let mut defense = Vec::new();
    for row in rows {
        let Some(player_id) = &row.player_id else {
            continue;
        };
        let bucket = if row.team_id == off_team_id {
            &mut offense
        } else {
            &mut defense
        };
        if !bucket.contains(player_id) {
            bucket.push(player_id.clone());
        }
    }
    (offense, defense)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "gameId,playerId,playerName,teamId,teamAbbr,period,wcTime,gcTime,scTime,x,y,z,gameDate\n";

    fn sample_csv() -> String {
        let mut csv = String::from(HEADER);
        csv.push_str("g1,p1,Alice,t1,AAA,1,100.0,600,20,40.0,-5.0,0,2024-02-10\n");
        csv.push_str("g1,p2,Bella,t2,BBB,1,100.0,600,20,40.0,5.0,0,2024-02-10\n");
        csv.push_str("g1,,ball,-1,BAL,1,100.0,600,20,41.0,0.5,9.1,2024-02-10\n");
        csv.push_str("g1,p1,Alice,t1,AAA,1,101.0,599,19,41.0,-4.0,0,2024-02-10\n");
        csv
    }

    #[test]
    fn loads_rows_and_parses_dates() {
        let rows = load_tracking_from_reader(sample_csv().as_bytes()).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(
            rows[0].game_date,
            Some(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap())
        );
        assert!(rows.iter().any(|r| r.is_ball() && r.player_id.is_none()));
    }

    #[test]
    fn positions_at_moment_excludes_ball() {
        let rows = load_tracking_from_reader(sample_csv().as_bytes()).unwrap();
        let positions = positions_at_moment(&rows, "g1", 100.0);
        assert_eq!(positions.len(), 2);
        assert!(positions.iter().all(|p| p.team_id != BALL_TEAM_ID));
    }

    #[test]
    fn ball_at_moment_finds_the_sentinel_row() {
        let rows = load_tracking_from_reader(sample_csv().as_bytes()).unwrap();
        let ball = ball_at_moment(&rows, "g1", 100.0).unwrap();
        assert_eq!(ball.x, 41.0);
        assert_eq!(ball.y, 0.5);
        assert!(ball_at_moment(&rows, "g1", 55.0).is_none());
    }

    #[test]
    fn slice_window_is_inclusive() {
        let rows = load_tracking_from_reader(sample_csv().as_bytes()).unwrap();
        assert_eq!(slice_window(&rows, 100.0, 101.0).len(), 4);
        assert_eq!(slice_window(&rows, 100.5, 101.0).len(), 1);
    }

    #[test]
    fn offense_defense_split_dedupes_players() {
        let rows = load_tracking_from_reader(sample_csv().as_bytes()).unwrap();
        let (offense, defense) = offense_defense_split(&rows, "t1");
        assert_eq!(offense, vec!["p1".to_string()]);
        assert_eq!(defense, vec!["p2".to_string()]);
    }
}
