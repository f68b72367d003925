// Integration tests for the court analysis pipeline.
//
// These tests exercise the full system end-to-end through the library
// crate's public API: CSV ingestion via the reader-based loaders, shot
// classification, Voronoi tessellation, rebound probabilities, and impact
// points, plus the cross-component properties the subsystems must uphold
// together.

use std::collections::HashMap;

use approx::assert_relative_eq;

use court_analysis::analysis;
use court_analysis::config::{AnalysisConfig, Config, DataPaths, OutputConfig};
use court_analysis::court::regions::BASKET_X;
use court_analysis::court::{classify, CourtRegions, Point, RegionLabel};
use court_analysis::io::events::load_events_from_reader;
use court_analysis::io::possessions::load_possessions_from_reader;
use court_analysis::io::tracking::load_tracking_from_reader;
use court_analysis::rebound::{rebound_chances, DensitySample, DensityTable};
use court_analysis::spatial::{tessellate, PlayerPosition};

// ===========================================================================
// Test helpers
// ===========================================================================

const EVENT_HEADER: &str = "gameId,eventType,playerId,playerName,teamId,teamAbbr,period,wcTime,wcTimeEnd,gcTime,scTime,fouledId,fouledName,foulType,made,three,fouled,assisted,receiverId,receiverName,distance,dReb,defenderProximity,defenderId,defenderName\n";
const TRACK_HEADER: &str =
    "gameId,playerId,playerName,teamId,teamAbbr,period,wcTime,gcTime,scTime,x,y,z,gameDate\n";
const POSS_HEADER: &str =
    "gameId,period,possId,possNum,teamId,teamAbbr,outcome,ptsScored,wcStart,wcEnd,gcStart,gcEnd,basketX\n";

fn inline_config() -> Config {
    Config {
        data: DataPaths {
            tracking: "unused".into(),
            events: "unused".into(),
            possessions: "unused".into(),
        },
        output: OutputConfig {
            report: "unused".into(),
        },
        analysis: AnalysisConfig {
            density_bin_size: 1.0,
            oreb_ppp: Some(1.1),
            games: vec![],
        },
    }
}

fn player(id: &str, team: &str, x: f64, y: f64) -> PlayerPosition {
    PlayerPosition {
        player_id: id.to_string(),
        team_id: team.to_string(),
        x,
        y,
    }
}

/// A full synthetic game slice: a missed corner three with an offensive
/// rebound, a fouled make with a free throw, and tracking for four players
/// plus the ball at every event instant.
fn game_fixture() -> (String, String, String) {
    let mut events = String::from(EVENT_HEADER);
    // Miss from the left corner at t=100; offensive rebound at t=103.
    events.push_str("g1,SHOT,s1,Shooter,home,HOM,1,100.0,,600,18,,,,False,True,,,,,23.0,,,,\n");
    events.push_str("g1,REB,c1,Crasher,home,HOM,1,103.0,,597,24,,,,,,,,,,,False,,,\n");
    // Fouled make at t=200 followed by one made free throw.
    events.push_str("g1,SHOT,s1,Shooter,home,HOM,1,200.0,,500,14,,,,True,False,True,,,,10.0,,,,\n");
    events.push_str("g1,FOUL,d1,Defender,away,AWY,1,200.5,,500,14,s1,Shooter,SHOOTING,,,,,,,,,,,\n");
    events.push_str("g1,FT,s1,Shooter,home,HOM,1,202.0,,500,14,,,,True,,,,,,,,,,\n");
    events.push_str("g1,TOUCH,d2,Wing,away,AWY,1,204.0,,499,13,,,,,,,,,,,,,,\n");

    let mut tracking = String::from(TRACK_HEADER);
    for t in ["100.0", "200.0"] {
        tracking.push_str(&format!("g1,s1,Shooter,home,HOM,1,{t},600,18,44.0,24.0,0,2024-02-10\n"));
        tracking.push_str(&format!("g1,c1,Crasher,home,HOM,1,{t},600,18,43.0,2.0,0,2024-02-10\n"));
        tracking.push_str(&format!("g1,d1,Defender,away,AWY,1,{t},600,18,38.0,-6.0,0,2024-02-10\n"));
        tracking.push_str(&format!("g1,d2,Wing,away,AWY,1,{t},600,18,25.0,10.0,0,2024-02-10\n"));
    }
    // Ball at the corner for the first shot, at the elbow for the second,
    // and near the rim for the rebound.
    tracking.push_str("g1,,ball,-1,BAL,1,100.0,600,18,44.0,24.0,8.0,2024-02-10\n");
    tracking.push_str("g1,,ball,-1,BAL,1,103.0,597,24,42.5,1.8,6.0,2024-02-10\n");
    tracking.push_str("g1,,ball,-1,BAL,1,200.0,500,14,30.0,-5.0,8.0,2024-02-10\n");

    let mut possessions = String::from(POSS_HEADER);
    possessions.push_str("g1,1,poss1,1,home,HOM,MISS,0,95.0,110.0,605,590,41.75\n");
    possessions.push_str("g1,1,poss2,2,home,HOM,MADE,3,195.0,210.0,505,490,41.75\n");

    (events, tracking, possessions)
}

// ===========================================================================
// End-to-end pipeline
// ===========================================================================

#[test]
fn full_pipeline_over_csv_fixture() {
    let (ev, tr, po) = game_fixture();
    let events = load_events_from_reader(ev.as_bytes()).unwrap();
    let tracking = load_tracking_from_reader(tr.as_bytes()).unwrap();
    let possessions = load_possessions_from_reader(po.as_bytes()).unwrap();

    let regions = CourtRegions::build().unwrap();
    let report = analysis::run(&inline_config(), &regions, &tracking, &events, &possessions);

    assert_eq!(report.shots.len(), 2);
    assert_eq!(report.games, vec!["g1".to_string()]);
    assert_eq!(report.unclassified_shots, 0);

    // The miss: left corner three, full rebound chance for the shooting
    // team (the crasher's cell owns the rim area where the rebound landed).
    let miss = report.shots.iter().find(|s| !s.made).unwrap();
    assert_eq!(miss.region, Some(RegionLabel::LeftCornerThree));
    assert_relative_eq!(miss.true_points_produced, 0.0);
    assert_relative_eq!(miss.off_reb_chance.unwrap(), 100.0, epsilon = 1e-9);
    assert_relative_eq!(miss.expected_oreb_points.unwrap(), 1.1, epsilon = 1e-9);
    assert_relative_eq!(miss.true_impact_points.unwrap(), 1.1, epsilon = 1e-9);

    // The fouled make: two for the shot plus the free throw, no
    // continuation value.
    let make = report.shots.iter().find(|s| s.made).unwrap();
    assert_eq!(make.region, Some(RegionLabel::RightElbowMid));
    assert_relative_eq!(make.points_produced, 2.0);
    assert_relative_eq!(make.true_points_produced, 3.0);
    assert_relative_eq!(make.true_impact_points.unwrap(), 3.0);
}

#[test]
fn report_serializes_to_json() {
    let (ev, tr, po) = game_fixture();
    let events = load_events_from_reader(ev.as_bytes()).unwrap();
    let tracking = load_tracking_from_reader(tr.as_bytes()).unwrap();
    let possessions = load_possessions_from_reader(po.as_bytes()).unwrap();

    let regions = CourtRegions::build().unwrap();
    let report = analysis::run(&inline_config(), &regions, &tracking, &events, &possessions);

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"LEFT_CORNER_THREE\""));
    assert!(json.contains("\"true_impact_points\""));

    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["shots"].as_array().unwrap().len(), 2);
}

// ===========================================================================
// Classification scenarios
// ===========================================================================

#[test]
fn scenario_half_court_line_position() {
    let regions = CourtRegions::build().unwrap();
    // (0, 0) sits exactly on the backcourt polygon boundary, which is
    // evaluated first.
    assert_eq!(
        classify(&regions, 0.0, 0.0, BASKET_X),
        Some(RegionLabel::BeyondHalfcourt)
    );
}

#[test]
fn scenario_close_range_behind_the_rim() {
    let regions = CourtRegions::build().unwrap();
    assert_eq!(
        classify(&regions, 45.0, 0.0, BASKET_X),
        Some(RegionLabel::CloseRange)
    );
}

#[test]
fn scenario_sideline_corner() {
    let regions = CourtRegions::build().unwrap();
    // Positive y is "left" in the canonical frame.
    assert_eq!(
        classify(&regions, 44.0, 24.0, BASKET_X),
        Some(RegionLabel::LeftCornerThree)
    );
}

#[test]
fn classification_mirrors_between_baskets() {
    let regions = CourtRegions::build().unwrap();
    for (x, y) in [
        (44.0, 24.0),
        (30.0, -16.0),
        (15.0, 0.0),
        (45.0, 0.0),
        (0.0, 0.0),
        (25.0, 20.0),
    ] {
        assert_eq!(
            classify(&regions, x, y, BASKET_X),
            classify(&regions, -x, y, -BASKET_X),
            "mirror mismatch at ({x}, {y})"
        );
    }
}

// ===========================================================================
// Tessellation and probability scenarios
// ===========================================================================

#[test]
fn scenario_two_player_split() {
    let positions = vec![
        player("a", "home", 40.0, -5.0),
        player("b", "away", 40.0, 5.0),
    ];
    let cells = tessellate(&positions, BASKET_X);
    assert_eq!(cells.len(), 2);
    // Each bounded cell covers half of the 47 x 50 half court.
    assert_relative_eq!(cells["a"].area(), 47.0 * 50.0 / 2.0, epsilon = 1e-6);
    assert_relative_eq!(cells["b"].area(), 47.0 * 50.0 / 2.0, epsilon = 1e-6);
}

#[test]
fn scenario_single_sample_attribution() {
    let positions = vec![
        player("a", "home", 41.0, -3.0),
        player("b", "away", 30.0, 10.0),
    ];
    let cells = tessellate(&positions, BASKET_X);
    let samples = vec![DensitySample {
        x: BASKET_X,
        y: -2.0,
        density: 10.0,
    }];
    let team_of: HashMap<String, String> = [
        ("a".to_string(), "home".to_string()),
        ("b".to_string(), "away".to_string()),
    ]
    .into();

    let chances = rebound_chances(&samples, &cells, &team_of);
    assert_eq!(chances.players.len(), 1);
    assert_relative_eq!(chances.players["a"], 100.0, epsilon = 1e-9);
    assert_relative_eq!(chances.teams["home"], 100.0, epsilon = 1e-9);
}

#[test]
fn probability_mass_conserved_for_ten_players() {
    // A full ten-player floor spread over the half court.
    let positions: Vec<PlayerPosition> = [
        (44.0, 2.0, "home"),
        (40.0, -9.0, "home"),
        (36.0, 11.0, "home"),
        (28.0, -3.0, "home"),
        (21.0, 16.0, "home"),
        (43.0, -4.0, "away"),
        (38.0, 6.0, "away"),
        (31.0, -15.0, "away"),
        (24.0, 7.0, "away"),
        (12.0, -1.0, "away"),
    ]
    .iter()
    .enumerate()
    .map(|(i, (x, y, team))| player(&format!("p{i}"), team, *x, *y))
    .collect();

    let cells = tessellate(&positions, BASKET_X);
    assert_eq!(cells.len(), 10);

    let team_of: HashMap<String, String> = positions
        .iter()
        .map(|p| (p.player_id.clone(), p.team_id.clone()))
        .collect();

    // Dense sample grid over the half court.
    let mut samples = Vec::new();
    let mut x = 0.5;
    while x < 47.0 {
        let mut y = -24.5;
        while y < 25.0 {
            samples.push(DensitySample {
                x,
                y,
                density: 1.0,
            });
            y += 1.0;
        }
        x += 1.0;
    }

    let chances = rebound_chances(&samples, &cells, &team_of);
    let player_total: f64 = chances.players.values().sum();
    let team_total: f64 = chances.teams.values().sum();
    assert_relative_eq!(player_total, 100.0, epsilon = 1e-9);
    assert_relative_eq!(team_total, 100.0, epsilon = 1e-9);
    assert_eq!(chances.teams.len(), 2);
}

#[test]
fn degenerate_inputs_flow_through_as_empty_results() {
    // One player: no tessellation, and the downstream probability query
    // yields empty maps instead of erroring.
    let cells = tessellate(&[player("a", "home", 30.0, 0.0)], BASKET_X);
    assert!(cells.is_empty());

    let samples = vec![DensitySample {
        x: 40.0,
        y: 0.0,
        density: 4.0,
    }];
    let chances = rebound_chances(&samples, &cells, &HashMap::new());
    assert!(chances.players.is_empty());
    assert!(chances.teams.is_empty());
}

// ===========================================================================
// Density table routing
// ===========================================================================

#[test]
fn density_table_routes_by_region_with_global_fallback() {
    let rebounds = vec![
        (Some(RegionLabel::LeftCornerThree), Point::new(42.0, 2.0)),
        (Some(RegionLabel::LeftCornerThree), Point::new(40.0, -1.0)),
        (Some(RegionLabel::CenterThree), Point::new(39.0, 4.0)),
        (None, Point::new(36.0, 0.0)),
    ];
    let table = DensityTable::build(&rebounds, 1.0);

    assert_eq!(table.samples_for(Some(RegionLabel::LeftCornerThree)).len(), 2);
    assert_eq!(table.samples_for(Some(RegionLabel::CenterThree)).len(), 1);
    // Uncovered region and unclassified shots both use the global surface.
    assert_eq!(table.samples_for(Some(RegionLabel::RightWingThree)).len(), 4);
    assert_eq!(table.samples_for(None).len(), 4);
}
