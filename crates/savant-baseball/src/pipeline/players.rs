// Per-player compute: one raw row -> at most one batting row and one
// pitching row. Two-way players produce both.

use savant_core::config::PipelineConfig;
use savant_core::types::{
    BattingAdvancedRow, LeagueContext, PitchingAdvancedRow, RawPlayerRow, TeamConferenceMap,
};

use crate::metrics::calibration::NEUTRAL_PARK_FACTOR;
use crate::metrics::estimated::{self, RegressionParams, NEUTRAL_CONFERENCE_STRENGTH};
use crate::metrics::lines::{
    compute_full_batting_line, compute_full_pitching_line, BattingLine, PitchingLine,
};
use crate::metrics::round_to;

use super::conference::StrengthLookup;
use super::{qualified_innings, qualified_plate_appearances, RunStamp};

fn conference_of(row: &RawPlayerRow, team_map: &TeamConferenceMap) -> Option<String> {
    team_map.get(&row.team).map(|t| t.conference.clone())
}

// ---------------------------------------------------------------------------
// Batting
// ---------------------------------------------------------------------------

/// Advanced batting row for a qualified batter, `None` otherwise.
///
/// Park factor is neutral. Estimated stats use the pre-pass strength of the
/// player's conference, or neutral 50 when the team or conference is unknown.
pub fn compute_batting_row(
    row: &RawPlayerRow,
    team_map: &TeamConferenceMap,
    league: &LeagueContext,
    preliminary: &StrengthLookup,
    config: &PipelineConfig,
    stamp: &RunStamp<'_>,
) -> Option<BattingAdvancedRow> {
    let pa = qualified_plate_appearances(row, config)?;

    let line = BattingLine {
        pa,
        ab: row.ab,
        h: row.h,
        doubles: row.doubles,
        triples: row.triples,
        hr: row.hr,
        bb: row.bb,
        hbp: row.hbp,
        so: row.so,
        sf: row.sf,
        ..Default::default()
    };
    let full = compute_full_batting_line(&line, league, NEUTRAL_PARK_FACTOR, &config.woba_weights);

    let conference = conference_of(row, team_map);
    let strength = conference
        .as_deref()
        .and_then(|c| preliminary.get(c).copied())
        .unwrap_or(NEUTRAL_CONFERENCE_STRENGTH);
    let params = RegressionParams {
        league_babip: config.league_babip,
        babip_regression: config.babip_regression,
    };
    let e_ba = estimated::e_ba(full.babip, full.bip_share, full.hr_rate, strength, &params);
    let e_slg = estimated::e_slg(e_ba, full.iso);
    let e_woba = estimated::e_woba(e_ba, e_slg, full.bb_pct, config.woba_weights.bb);

    Some(BattingAdvancedRow {
        player_id: row.player_id.clone(),
        player_name: row.player_name.clone(),
        team: row.team.clone(),
        conference,
        season: stamp.season,
        g: row.games_bat,
        pa,
        ab: row.ab,
        r: row.r,
        hr: row.hr,
        avg: round_to(full.avg, 3),
        obp: round_to(full.obp, 3),
        slg: round_to(full.slg, 3),
        ops: round_to(full.ops, 3),
        iso: round_to(full.iso, 3),
        babip: round_to(full.babip, 3),
        woba: round_to(full.woba, 3),
        wrc_plus: round_to(full.wrc_plus, 1),
        ops_plus: round_to(full.ops_plus, 1),
        k_pct: round_to(full.k_pct, 3),
        bb_pct: round_to(full.bb_pct, 3),
        e_ba: round_to(e_ba, 3),
        e_slg: round_to(e_slg, 3),
        e_woba: round_to(e_woba, 3),
        data_source: stamp.data_source.to_string(),
        computed_at: stamp.computed_at,
    })
}

// ---------------------------------------------------------------------------
// Pitching
// ---------------------------------------------------------------------------

/// Advanced pitching row for a qualified pitcher, `None` otherwise.
pub fn compute_pitching_row(
    row: &RawPlayerRow,
    team_map: &TeamConferenceMap,
    league: &LeagueContext,
    config: &PipelineConfig,
    stamp: &RunStamp<'_>,
) -> Option<PitchingAdvancedRow> {
    let ip = qualified_innings(row, config)?;

    let line = PitchingLine {
        ip,
        h: row.h_allowed,
        er: row.er,
        bb: row.bb_allowed,
        hbp: row.hbp_allowed,
        so: row.so_pitch,
        hr: row.hr_allowed,
        batters_faced: row.batters_faced,
        fly_balls: None,
    };
    let full = compute_full_pitching_line(&line, league, NEUTRAL_PARK_FACTOR, config.fly_ball_rate);

    Some(PitchingAdvancedRow {
        player_id: row.player_id.clone(),
        player_name: row.player_name.clone(),
        team: row.team.clone(),
        conference: conference_of(row, team_map),
        season: stamp.season,
        g: row.games_pitch,
        ip: round_to(ip, 2),
        era: round_to(full.era, 2),
        whip: round_to(full.whip, 2),
        fip: round_to(full.fip, 2),
        x_fip: round_to(full.x_fip, 2),
        era_minus: round_to(full.era_minus, 1),
        k_per_9: round_to(full.k_per_9, 1),
        bb_per_9: round_to(full.bb_per_9, 1),
        hr_per_9: round_to(full.hr_per_9, 1),
        k_bb: round_to(full.k_bb, 2),
        k_pct: round_to(full.k_pct, 3),
        bb_pct: round_to(full.bb_pct, 3),
        babip_against: round_to(full.babip_against, 3),
        lob_pct: round_to(full.lob_pct, 3),
        data_source: stamp.data_source.to_string(),
        computed_at: stamp.computed_at,
    })
}
