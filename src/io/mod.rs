// Typed CSV ingestion for the three source files (tracking, events,
// possessions) and the shot/rebound join built on top of them.
//
// All schema handling and value coercion happens here, at the boundary; the
// geometry and probability core only ever sees the typed records.

pub mod actions;
pub mod events;
pub mod possessions;
pub mod tracking;

use thiserror::Error;

/// Wall-clock timestamps come from the same feed on every file, so exact
/// joins are intended; the tolerance only absorbs float formatting noise.
pub const TIME_EPSILON: f64 = 1e-6;

/// Team id sentinel used for ball rows in the tracking feed.
pub const BALL_TEAM_ID: &str = "-1";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

/// True when two wall-clock timestamps refer to the same instant.
pub fn same_instant(a: f64, b: f64) -> bool {
    (a - b).abs() < TIME_EPSILON
}

/// Parse the boolean flags the source files carry as text ("True"/"False",
/// sometimes lowercase, empty when unknown).
pub(crate) fn parse_flag(raw: &Option<String>) -> Option<bool> {
    let raw = raw.as_deref()?.trim();
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
