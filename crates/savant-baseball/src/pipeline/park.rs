// Park factor rows.
//
// Box-score totals carry no home/away split, so every factor is published as
// neutral and the methodology field says so. Consumers must not read these as
// measured values.

use std::collections::BTreeSet;

use savant_core::config::PipelineConfig;
use savant_core::types::{
    BattingAdvancedRow, ParkFactorRow, PitchingAdvancedRow, TeamConferenceMap,
};

use crate::metrics::calibration::NEUTRAL_PARK_FACTOR;

use super::RunStamp;

/// Methodology note for a neutral row. Names the home-game sample a measured
/// factor would need.
pub fn neutral_methodology(min_home_games: u32) -> String {
    format!(
        "neutral default: home/away run splits are not available from season box-score \
totals; all factors fixed at 1.0 (a measured factor needs at least {min_home_games} home games)"
    )
}

/// One neutral row per team with at least one qualified batter or pitcher,
/// sorted by team name.
pub fn assemble_park_factors(
    batting: &[BattingAdvancedRow],
    pitching: &[PitchingAdvancedRow],
    team_map: &TeamConferenceMap,
    config: &PipelineConfig,
    stamp: &RunStamp<'_>,
) -> Vec<ParkFactorRow> {
    let methodology = neutral_methodology(config.min_park_home_games);
    let teams: BTreeSet<&str> = batting
        .iter()
        .map(|r| r.team.as_str())
        .chain(pitching.iter().map(|r| r.team.as_str()))
        .collect();

    teams
        .into_iter()
        .map(|team| {
            let info = team_map.get(team);
            ParkFactorRow {
                team: team.to_string(),
                venue_name: info.and_then(|t| t.stadium.clone()),
                conference: info.map(|t| t.conference.clone()),
                season: stamp.season,
                runs_factor: NEUTRAL_PARK_FACTOR,
                hits_factor: NEUTRAL_PARK_FACTOR,
                hr_factor: NEUTRAL_PARK_FACTOR,
                bb_factor: NEUTRAL_PARK_FACTOR,
                so_factor: NEUTRAL_PARK_FACTOR,
                sample_games: 0,
                methodology: methodology.clone(),
                data_source: stamp.data_source.to_string(),
                computed_at: stamp.computed_at,
            }
        })
        .collect()
}
