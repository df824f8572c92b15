// Season compute pipeline: raw box-score totals -> advanced-stat tables.
//
// Stage order:
// 1. League context (baselines + calibration constants)
// 2. Conference-strength pre-pass over raw rows
// 3. Per-player batting and pitching rows (needs 1 and 2)
// 4. Park factor rows (neutral defaults, one per team with a qualified player)
// 5. Conference-strength final pass over the rows from 3
//
// Stages 1 and 2 read the same input and share nothing. Every stage is a
// plain function of its inputs; no state survives a call.

pub mod conference;
pub mod league;
pub mod park;
pub mod players;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use savant_core::config::PipelineConfig;
use savant_core::types::{ComputeResult, ComputeSummary, RawPlayerRow, TeamConferenceMap};

use crate::metrics::thirds_to_ip;

// ---------------------------------------------------------------------------
// Qualification
// ---------------------------------------------------------------------------

/// Plate appearances for a batter who clears the qualification bar, else
/// `None`. The same test gates league baselines, the conference pre-pass and
/// published rows.
pub fn qualified_plate_appearances(row: &RawPlayerRow, config: &PipelineConfig) -> Option<u32> {
    if row.games_bat == 0 {
        return None;
    }
    let pa = row.plate_appearances();
    (pa >= config.min_pa).then_some(pa)
}

/// Decimal innings for a pitcher who clears the qualification bar, else `None`.
pub fn qualified_innings(row: &RawPlayerRow, config: &PipelineConfig) -> Option<f64> {
    if row.games_pitch == 0 {
        return None;
    }
    let ip = thirds_to_ip(row.ip_thirds);
    (ip >= config.min_ip).then_some(ip)
}

// ---------------------------------------------------------------------------
// Run stamp
// ---------------------------------------------------------------------------

/// Season, source tag and timestamp shared by every output row of a run.
#[derive(Debug, Clone, Copy)]
pub struct RunStamp<'a> {
    pub season: u16,
    pub data_source: &'a str,
    pub computed_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Compute all four tables with default thresholds and weights, stamped now.
pub fn compute_savant_data(
    rows: &[RawPlayerRow],
    team_map: &TeamConferenceMap,
    season: u16,
) -> ComputeResult {
    compute_savant_data_with(rows, team_map, season, &PipelineConfig::default())
}

/// Compute with explicit configuration, stamped now.
pub fn compute_savant_data_with(
    rows: &[RawPlayerRow],
    team_map: &TeamConferenceMap,
    season: u16,
    config: &PipelineConfig,
) -> ComputeResult {
    compute_savant_data_at(rows, team_map, season, config, Utc::now())
}

/// Compute with explicit configuration and timestamp. Output is fully
/// determined by the arguments.
pub fn compute_savant_data_at(
    rows: &[RawPlayerRow],
    team_map: &TeamConferenceMap,
    season: u16,
    config: &PipelineConfig,
    computed_at: DateTime<Utc>,
) -> ComputeResult {
    let off_season = rows.iter().filter(|r| r.season != season).count();
    if off_season > 0 {
        warn!(
            "{} of {} rows are tagged with a season other than {}; computing them as {}",
            off_season,
            rows.len(),
            season,
            season
        );
    }

    let stamp = RunStamp {
        season,
        data_source: &config.data_source,
        computed_at,
    };

    // ---- 1. League context ----
    let league = league::derive_league_context(rows, season, config);
    debug!(
        "league context: {} batters, {} pitchers, wOBA {:.3}, ERA {:.2}, FIP constant {:.2}, wOBA scale {:.2}",
        league.batters, league.pitchers, league.woba, league.era, league.fip_constant, league.woba_scale
    );

    // ---- 2. Conference pre-pass ----
    let preliminary = conference::preliminary_strength(rows, team_map, config);
    debug!("conference pre-pass: {} conferences", preliminary.len());

    // ---- 3. Per-player rows ----
    let batting: Vec<_> = rows
        .iter()
        .filter_map(|row| {
            players::compute_batting_row(row, team_map, &league, &preliminary, config, &stamp)
        })
        .collect();
    let pitching: Vec<_> = rows
        .iter()
        .filter_map(|row| players::compute_pitching_row(row, team_map, &league, config, &stamp))
        .collect();
    debug!(
        "per-player rows: {} batting, {} pitching",
        batting.len(),
        pitching.len()
    );

    // ---- 4. Park factors ----
    let park_factors = park::assemble_park_factors(&batting, &pitching, team_map, config, &stamp);

    // ---- 5. Conference final pass ----
    let conference_strength =
        conference::final_strength(&batting, &pitching, &league, config, &stamp);

    let summary = ComputeSummary {
        total_players: rows.len(),
        qualified_batters: batting.len(),
        qualified_pitchers: pitching.len(),
        venues: park_factors.len(),
        conferences: conference_strength.len(),
    };
    info!(
        "season {}: {} players, {} qualified batters, {} qualified pitchers, {} venues, {} conferences",
        season,
        summary.total_players,
        summary.qualified_batters,
        summary.qualified_pitchers,
        summary.venues,
        summary.conferences
    );

    ComputeResult {
        batting,
        pitching,
        park_factors,
        conference_strength,
        league,
        summary,
    }
}
