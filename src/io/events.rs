// Game event ingestion.
//
// events.csv columns:
//   gameId, eventType, playerId, playerName, teamId, teamAbbr, period,
//   wcTime, wcTimeEnd, gcTime, scTime, fouledId, fouledName, foulType,
//   made, three, fouled, assisted, receiverId, receiverName, distance,
//   dReb, defenderProximity, defenderId, defenderName
//
// Only the columns the analysis consumes are read; the rest are ignored by
// header name.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::{parse_flag, IngestError};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    Shot,
    Rebound,
    Foul,
    FreeThrow,
    /// Anything else in the feed (TOUCH, TO, ...); carried through so the
    /// free-throw state machine can see sequence breaks.
    Other(String),
}

impl EventType {
    fn from_raw(raw: &str) -> EventType {
        match raw {
            "SHOT" => EventType::Shot,
            "REB" => EventType::Rebound,
            "FOUL" => EventType::Foul,
            "FT" => EventType::FreeThrow,
            other => EventType::Other(other.to_string()),
        }
    }
}

/// One row of the event feed, typed.
#[derive(Debug, Clone)]
pub struct GameEvent {
    pub game_id: String,
    pub event_type: EventType,
    pub player_id: Option<String>,
    pub team_id: String,
    pub period: u32,
    pub wc_time: f64,
    pub fouled_id: Option<String>,
    pub made: Option<bool>,
    pub three: Option<bool>,
    /// For rebounds: defensive (true) or offensive (false); `None` for team
    /// rebounds and non-rebound events.
    pub d_reb: Option<bool>,
}

// ---------------------------------------------------------------------------
// Raw CSV row (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "gameId")]
    game_id: String,
    #[serde(rename = "eventType")]
    event_type: String,
    #[serde(rename = "playerId")]
    player_id: Option<String>,
    #[serde(rename = "teamId")]
    team_id: String,
    period: u32,
    #[serde(rename = "wcTime")]
    wc_time: f64,
    #[serde(rename = "fouledId")]
    fouled_id: Option<String>,
    made: Option<String>,
    three: Option<String>,
    #[serde(rename = "dReb")]
    d_reb: Option<String>,
}

fn none_if_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

pub fn load_events_from_reader<R: Read>(rdr: R) -> Result<Vec<GameEvent>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut events = Vec::new();
    for result in reader.deserialize::<RawEvent>() {
        let raw = result?;
        events.push(GameEvent {
            game_id: raw.game_id,
            event_type: EventType::from_raw(raw.event_type.trim()),
            player_id: none_if_empty(raw.player_id),
            team_id: raw.team_id,
            period: raw.period,
            wc_time: raw.wc_time,
            fouled_id: none_if_empty(raw.fouled_id),
            made: parse_flag(&raw.made),
            three: parse_flag(&raw.three),
            d_reb: parse_flag(&raw.d_reb),
        });
    }
    // Downstream scans assume wall-clock order.
    events.sort_by(|a, b| {
        a.wc_time
            .partial_cmp(&b.wc_time)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(events)
}

/// Load the event feed, optionally restricted to a set of game ids.
pub fn load_events(path: &Path, games: &[String]) -> Result<Vec<GameEvent>, IngestError> {
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut events = load_events_from_reader(file).map_err(|source| IngestError::Csv {
        path: path.display().to_string(),
        source,
    })?;
    if !games.is_empty() {
        events.retain(|e| games.iter().any(|g| g == &e.game_id));
    }
    Ok(events)
}

// ---------------------------------------------------------------------------
// Extraction helpers
// ---------------------------------------------------------------------------

pub fn extract_shots(events: &[GameEvent]) -> Vec<&GameEvent> {
    events
        .iter()
        .filter(|e| e.event_type == EventType::Shot)
        .collect()
}

/// Offensive rebounds credited to a player; team rebounds are excluded.
pub fn extract_off_rebounds(events: &[GameEvent]) -> Vec<&GameEvent> {
    events
        .iter()
        .filter(|e| {
            e.event_type == EventType::Rebound && e.d_reb == Some(false) && e.player_id.is_some()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "gameId,eventType,playerId,playerName,teamId,teamAbbr,period,wcTime,wcTimeEnd,gcTime,scTime,fouledId,fouledName,foulType,made,three,fouled,assisted,receiverId,receiverName,distance,dReb,defenderProximity,defenderId,defenderName\n";

    fn sample_csv() -> String {
        let mut csv = String::from(HEADER);
        csv.push_str("g1,SHOT,p1,Alice,t1,AAA,1,100.5,,600,20,,,,True,False,False,,,,12.3,,,,\n");
        csv.push_str("g1,REB,p2,Bella,t2,BBB,1,103.0,,598,24,,,,,,,,,,,True,,,\n");
        csv.push_str("g1,REB,p3,Cara,t1,AAA,1,90.0,,610,10,,,,,,,,,,,False,,,\n");
        csv.push_str("g1,TOUCH,p2,Bella,t2,BBB,1,104.0,,597,24,,,,,,,,,,,,,,\n");
        csv
    }

    #[test]
    fn loads_and_types_rows() {
        let events = load_events_from_reader(sample_csv().as_bytes()).unwrap();
        assert_eq!(events.len(), 4);

        // Sorted by wcTime: the early rebound comes first.
        assert_eq!(events[0].wc_time, 90.0);
        assert_eq!(events[0].event_type, EventType::Rebound);
        assert_eq!(events[0].d_reb, Some(false));

        let shot = &events[1];
        assert_eq!(shot.event_type, EventType::Shot);
        assert_eq!(shot.player_id.as_deref(), Some("p1"));
        assert_eq!(shot.made, Some(true));
        assert_eq!(shot.three, Some(false));

        assert_eq!(events[3].event_type, EventType::Other("TOUCH".into()));
    }

    #[test]
    fn extracts_shots_and_offensive_rebounds() {
        let events = load_events_from_reader(sample_csv().as_bytes()).unwrap();
        assert_eq!(extract_shots(&events).len(), 1);

        let orebs = extract_off_rebounds(&events);
        assert_eq!(orebs.len(), 1);
        assert_eq!(orebs[0].player_id.as_deref(), Some("p3"));
    }

    #[test]
    fn missing_optional_fields_become_none() {
        let events = load_events_from_reader(sample_csv().as_bytes()).unwrap();
        let touch = &events[3];
        assert_eq!(touch.made, None);
        assert_eq!(touch.three, None);
        assert_eq!(touch.fouled_id, None);
    }
}
