// Possession record ingestion.
//
// possessions.csv columns:
//   gameId, period, possId, possNum, teamId, teamAbbr, outcome, ptsScored,
//   wcStart, wcEnd, gcStart, gcEnd, basketX
//
// Possessions attribute an attacking basket to every wall-clock instant,
// which drives the mirroring frame for classification and tessellation.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::IngestError;

#[derive(Debug, Clone)]
pub struct Possession {
    pub game_id: String,
    pub period: u32,
    pub poss_id: String,
    pub team_id: String,
    pub outcome: Option<String>,
    pub pts_scored: f64,
    pub wc_start: f64,
    pub wc_end: f64,
    pub basket_x: f64,
}

#[derive(Debug, Deserialize)]
struct RawPossession {
    #[serde(rename = "gameId")]
    game_id: String,
    period: u32,
    #[serde(rename = "possId")]
    poss_id: String,
    #[serde(rename = "teamId")]
    team_id: String,
    outcome: Option<String>,
    #[serde(rename = "ptsScored")]
    pts_scored: Option<f64>,
    #[serde(rename = "wcStart")]
    wc_start: f64,
    #[serde(rename = "wcEnd")]
    wc_end: f64,
    #[serde(rename = "basketX")]
    basket_x: f64,
}

pub fn load_possessions_from_reader<R: Read>(rdr: R) -> Result<Vec<Possession>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut possessions = Vec::new();
    for result in reader.deserialize::<RawPossession>() {
        let raw = result?;
        possessions.push(Possession {
            game_id: raw.game_id,
            period: raw.period,
            poss_id: raw.poss_id,
            team_id: raw.team_id,
            outcome: raw.outcome.filter(|s| !s.trim().is_empty()),
            pts_scored: raw.pts_scored.unwrap_or(0.0),
            wc_start: raw.wc_start,
            wc_end: raw.wc_end,
            basket_x: raw.basket_x,
        });
    }
    Ok(possessions)
}

/// Load the possession feed, optionally restricted to a set of game ids.
pub fn load_possessions(path: &Path, games: &[String]) -> Result<Vec<Possession>, IngestError> {
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut possessions =
        load_possessions_from_reader(file).map_err(|source| IngestError::Csv {
            path: path.display().to_string(),
            source,
        })?;
    if !games.is_empty() {
        possessions.retain(|p| games.iter().any(|g| g == &p.game_id));
    }
    Ok(possessions)
}

/// The possession containing an instant for a given team, if any.
pub fn possession_at<'a>(
    possessions: &'a [Possession],
    game_id: &str,
    period: u32,
    team_id: &str,
    wc_time: f64,
) -> Option<&'a Possession> {
    possessions.iter().find(|p| {
        p.game_id == game_id
            && p.period == period
            && p.team_id == team_id
            && wc_time >= p.wc_start
            && wc_time <= p.wc_end
    })
}

/// The attacking basket in effect for a team at an instant.
pub fn basket_at(
    possessions: &[Possession],
    game_id: &str,
    period: u32,
    team_id: &str,
    wc_time: f64,
) -> Option<f64> {
    possession_at(possessions, game_id, period, team_id, wc_time).map(|p| p.basket_x)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
