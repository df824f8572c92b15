// Seed driver: CSV season snapshot -> compute pipeline -> SQLite tables.
//
// Run sequence:
// 1. Load raw player rows and the team map
// 2. Warn about teams the map does not cover
// 3. Compute all tables for the configured season
// 4. Upsert into the store, retrying failed writes
// 5. Optionally dump the full result as JSON

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use savant_baseball::compute_savant_data_with;
use savant_core::config::Config;
use savant_core::db::{Store, WriteCounts};
use savant_core::ingest::{load_player_rows, load_team_map};
use savant_core::types::{ComputeResult, ComputeSummary, RawPlayerRow, TeamConferenceMap};

/// What one run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub season: u16,
    pub summary: ComputeSummary,
    pub writes: WriteCounts,
    pub unmapped_teams: Vec<String>,
    pub json_output: Option<PathBuf>,
}

pub fn run(config: &Config) -> Result<RunReport> {
    // ---- 1. Inputs ----
    let players_path = Path::new(&config.data_paths.players);
    let rows = load_player_rows(players_path)
        .with_context(|| format!("failed to load player rows from {}", players_path.display()))?;
    let teams_path = Path::new(&config.data_paths.teams);
    let team_map = load_team_map(teams_path)
        .with_context(|| format!("failed to load team map from {}", teams_path.display()))?;
    info!(
        "Loaded {} player rows and {} teams",
        rows.len(),
        team_map.len()
    );

    // ---- 2. Coverage check ----
    let unmapped_teams = unmapped_teams(&rows, &team_map);
    if !unmapped_teams.is_empty() {
        warn!(
            "{} teams missing from the team map (conference fields will be empty): {}",
            unmapped_teams.len(),
            unmapped_teams.join(", ")
        );
    }

    // ---- 3. Compute ----
    let result = compute_savant_data_with(&rows, &team_map, config.season, &config.pipeline);

    // ---- 4. Persist ----
    let store = Store::open(&config.database.path)
        .with_context(|| format!("failed to open store at {}", config.database.path))?;
    let writes = upsert_with_retry(
        &store,
        &result,
        config.database.retry_attempts,
        Duration::from_millis(config.database.retry_backoff_ms),
    )?;
    info!(
        "Wrote {} rows ({} batting, {} pitching, {} park factors, {} conferences)",
        writes.total(),
        writes.batting,
        writes.pitching,
        writes.park_factors,
        writes.conference_strength
    );

    // ---- 5. JSON dump ----
    let json_output = match &config.data_paths.json_output {
        Some(path) => {
            let path = PathBuf::from(path);
            write_json(&result, &path)?;
            info!("Wrote JSON result to {}", path.display());
            Some(path)
        }
        None => None,
    };

    Ok(RunReport {
        season: config.season,
        summary: result.summary,
        writes,
        unmapped_teams,
        json_output,
    })
}

/// Distinct team names in `rows` with no team map entry, sorted.
pub fn unmapped_teams(rows: &[RawPlayerRow], team_map: &TeamConferenceMap) -> Vec<String> {
    rows.iter()
        .map(|r| r.team.as_str())
        .filter(|team| !team_map.contains_key(*team))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

/// Upsert the whole result, retrying up to `attempts` times. The wait before
/// retry `n` is `n * backoff`.
pub fn upsert_with_retry(
    store: &Store,
    result: &ComputeResult,
    attempts: u32,
    backoff: Duration,
) -> Result<WriteCounts> {
    with_retry(attempts, backoff, || store.upsert_result(result))
        .context("failed to write computed tables")
}

/// Run `operation` until it succeeds or `attempts` runs are used up, sleeping
/// linearly longer between tries. Returns the last error.
pub fn with_retry<T, F>(attempts: u32, backoff: Duration, mut operation: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let mut last_error = None;
    for attempt in 1..=attempts {
        match operation() {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!("Attempt {}/{} failed: {:#}", attempt, attempts, e);
                last_error = Some(e);
                if attempt < attempts {
                    std::thread::sleep(backoff * attempt);
                }
            }
        }
    }
    match last_error {
        Some(e) => Err(e.context(format!("giving up after {attempts} attempts"))),
        None => bail!("no attempts were made"),
    }
}

fn write_json(result: &ComputeResult, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let text = serde_json::to_string_pretty(result).context("failed to serialize result")?;
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
