// Season row and team metadata loading from CSV.
//
// Box-score exports occasionally carry fractional or blank counting cells,
// so every count is read as f64, checked, and rounded. Rows that fail the
// checks are skipped with a warning rather than aborting the run.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::types::{RawPlayerRow, TeamConferenceMap, TeamInfo};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvPlayerRow {
    player_id: String,
    player_name: String,
    team: String,
    season: u16,
    #[serde(default)]
    games_bat: Option<f64>,
    #[serde(default)]
    ab: Option<f64>,
    #[serde(default)]
    r: Option<f64>,
    #[serde(default)]
    h: Option<f64>,
    #[serde(default)]
    doubles: Option<f64>,
    #[serde(default)]
    triples: Option<f64>,
    #[serde(default)]
    hr: Option<f64>,
    #[serde(default)]
    rbi: Option<f64>,
    #[serde(default)]
    bb: Option<f64>,
    #[serde(default)]
    hbp: Option<f64>,
    #[serde(default)]
    so: Option<f64>,
    #[serde(default)]
    sf: Option<f64>,
    #[serde(default)]
    sb: Option<f64>,
    #[serde(default)]
    games_pitch: Option<f64>,
    #[serde(default)]
    ip_thirds: Option<f64>,
    #[serde(default)]
    h_allowed: Option<f64>,
    #[serde(default)]
    r_allowed: Option<f64>,
    #[serde(default)]
    er: Option<f64>,
    #[serde(default)]
    bb_allowed: Option<f64>,
    #[serde(default)]
    hbp_allowed: Option<f64>,
    #[serde(default)]
    so_pitch: Option<f64>,
    #[serde(default)]
    hr_allowed: Option<f64>,
    #[serde(default)]
    batters_faced: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CsvTeamRow {
    team: String,
    conference: String,
    #[serde(default)]
    stadium: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Largest season count accepted from a CSV cell. Far above any real college
/// season total; anything larger is a corrupt export.
pub const MAX_SEASON_COUNT: f64 = 100_000.0;

/// Convert an optional CSV cell to a count. Blank cells are zero; negative,
/// non-finite or implausibly large cells are rejected.
fn count(value: Option<f64>) -> Option<u32> {
    match value {
        None => Some(0),
        Some(v) if v.is_finite() && (0.0..=MAX_SEASON_COUNT).contains(&v) => {
            Some(v.round() as u32)
        }
        Some(_) => None,
    }
}

fn convert_player(raw: CsvPlayerRow) -> Option<RawPlayerRow> {
    let batters_faced = match raw.batters_faced {
        None => None,
        Some(v) => Some(count(Some(v))?),
    };
    Some(RawPlayerRow {
        player_id: raw.player_id.trim().to_string(),
        player_name: raw.player_name.trim().to_string(),
        team: raw.team.trim().to_string(),
        season: raw.season,
        games_bat: count(raw.games_bat)?,
        ab: count(raw.ab)?,
        r: count(raw.r)?,
        h: count(raw.h)?,
        doubles: count(raw.doubles)?,
        triples: count(raw.triples)?,
        hr: count(raw.hr)?,
        rbi: count(raw.rbi)?,
        bb: count(raw.bb)?,
        hbp: count(raw.hbp)?,
        so: count(raw.so)?,
        sf: count(raw.sf)?,
        sb: count(raw.sb)?,
        games_pitch: count(raw.games_pitch)?,
        ip_thirds: count(raw.ip_thirds)?,
        h_allowed: count(raw.h_allowed)?,
        r_allowed: count(raw.r_allowed)?,
        er: count(raw.er)?,
        bb_allowed: count(raw.bb_allowed)?,
        hbp_allowed: count(raw.hbp_allowed)?,
        so_pitch: count(raw.so_pitch)?,
        hr_allowed: count(raw.hr_allowed)?,
        batters_faced,
    })
}

// ---------------------------------------------------------------------------
// Reader-based loaders
// ---------------------------------------------------------------------------

pub fn load_player_rows_from_reader<R: Read>(rdr: R) -> Result<Vec<RawPlayerRow>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut rows = Vec::new();
    for result in reader.deserialize::<CsvPlayerRow>() {
        match result {
            Ok(raw) => {
                let id = raw.player_id.trim().to_string();
                if id.is_empty() {
                    warn!("skipping player row with empty player_id");
                    continue;
                }
                match convert_player(raw) {
                    Some(row) => rows.push(row),
                    None => warn!("skipping player '{}': negative, non-finite or out-of-range count", id),
                }
            }
            Err(e) => {
                warn!("skipping malformed player row: {}", e);
            }
        }
    }
    Ok(rows)
}

pub fn load_team_map_from_reader<R: Read>(rdr: R) -> Result<TeamConferenceMap, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut map = TeamConferenceMap::new();
    for result in reader.deserialize::<CsvTeamRow>() {
        match result {
            Ok(raw) => {
                let team = raw.team.trim().to_string();
                let conference = raw.conference.trim().to_string();
                if team.is_empty() || conference.is_empty() {
                    warn!("skipping team row with empty team or conference");
                    continue;
                }
                let stadium = raw
                    .stadium
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty());
                if map.contains_key(&team) {
                    warn!("duplicate team entry for '{}', using latest value", team);
                }
                map.insert(team, TeamInfo { conference, stadium });
            }
            Err(e) => {
                warn!("skipping malformed team row: {}", e);
            }
        }
    }
    Ok(map)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

/// Load season rows from a CSV file. Errors if no valid row survives.
pub fn load_player_rows(path: &Path) -> Result<Vec<RawPlayerRow>, IngestError> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let rows = load_player_rows_from_reader(file).map_err(|e| IngestError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    if rows.is_empty() {
        return Err(IngestError::Validation(format!(
            "{} produced zero valid player rows",
            path.display()
        )));
    }
    Ok(rows)
}

/// Load the team -> conference/stadium map from a CSV file.
pub fn load_team_map(path: &Path) -> Result<TeamConferenceMap, IngestError> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_team_map_from_reader(file).map_err(|e| IngestError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
