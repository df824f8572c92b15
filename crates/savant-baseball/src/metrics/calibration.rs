// Park factors, conference strength, and the two league calibration constants.

use super::{clamp, ratio, sanitize};

pub const NEUTRAL_PARK_FACTOR: f64 = 1.0;

pub const DEFAULT_FIP_CONSTANT: f64 = 3.80;
pub const FIP_CONSTANT_MIN: f64 = 3.0;
pub const FIP_CONSTANT_MAX: f64 = 5.0;

pub const DEFAULT_WOBA_SCALE: f64 = 1.15;
pub const WOBA_SCALE_MIN: f64 = 0.8;
pub const WOBA_SCALE_MAX: f64 = 1.4;

/// `lgOBP - lgAVG` at or below this is too thin to derive a scale from.
const WOBA_SCALE_MIN_SPREAD: f64 = 0.01;

// ---------------------------------------------------------------------------
// Park factor
// ---------------------------------------------------------------------------

/// Runs-per-game at home over runs-per-game away. Neutral 1.0 when either
/// side has no games.
///
/// This does not enforce a minimum sample; see `trusted_park_factor`.
pub fn park_factor(home_runs: u32, home_games: u32, away_runs: u32, away_games: u32) -> f64 {
    if home_games == 0 || away_games == 0 {
        return NEUTRAL_PARK_FACTOR;
    }
    let home_rpg = home_runs as f64 / home_games as f64;
    let away_rpg = away_runs as f64 / away_games as f64;
    if away_rpg <= 0.0 {
        return NEUTRAL_PARK_FACTOR;
    }
    let pf = sanitize(home_rpg / away_rpg);
    if pf > 0.0 {
        pf
    } else {
        NEUTRAL_PARK_FACTOR
    }
}

/// `park_factor`, but neutral until the home sample reaches `min_home_games`.
pub fn trusted_park_factor(
    home_runs: u32,
    home_games: u32,
    away_runs: u32,
    away_games: u32,
    min_home_games: u32,
) -> f64 {
    if home_games < min_home_games {
        return NEUTRAL_PARK_FACTOR;
    }
    park_factor(home_runs, home_games, away_runs, away_games)
}

// ---------------------------------------------------------------------------
// Conference strength
// ---------------------------------------------------------------------------

/// Inputs to the conference-strength composite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConferenceInputs {
    pub inter_conf_win_pct: f64,
    pub rpi: f64,
    pub avg_woba: f64,
    pub avg_era: f64,
}

/// Weighted 0-100 composite:
/// 40% inter-conference win%, 30% `(1 - RPI)`, 15% `wOBA / 0.400`,
/// 15% `(1 - ERA / 10)`. Each sub-score is scaled to 0-100 and clamped
/// before weighting; the total is clamped again.
pub fn conference_strength(inputs: &ConferenceInputs) -> f64 {
    let win = clamp(inputs.inter_conf_win_pct * 100.0, 0.0, 100.0);
    let rpi = clamp((1.0 - inputs.rpi) * 100.0, 0.0, 100.0);
    let offense = clamp(inputs.avg_woba / 0.400 * 100.0, 0.0, 100.0);
    let pitching = clamp((1.0 - inputs.avg_era / 10.0) * 100.0, 0.0, 100.0);
    clamp(
        0.40 * win + 0.30 * rpi + 0.15 * offense + 0.15 * pitching,
        0.0,
        100.0,
    )
}

// ---------------------------------------------------------------------------
// League calibration
// ---------------------------------------------------------------------------

/// `lgERA - (13*lgHR + 3*lgBB - 2*lgK) / lgIP`, clamped to [3.0, 5.0].
/// Returns 3.80 when the league has no innings.
pub fn fip_constant(
    league_era: f64,
    league_hr: f64,
    league_bb: f64,
    league_k: f64,
    league_ip: f64,
) -> f64 {
    if league_ip.is_nan() || league_ip <= 0.0 {
        return DEFAULT_FIP_CONSTANT;
    }
    let core = ratio(13.0 * league_hr + 3.0 * league_bb - 2.0 * league_k, league_ip);
    let raw = league_era - core;
    if !raw.is_finite() {
        return DEFAULT_FIP_CONSTANT;
    }
    raw.clamp(FIP_CONSTANT_MIN, FIP_CONSTANT_MAX)
}

/// `(lgOBP - lgwOBA) / (lgOBP - lgAVG)`, clamped to [0.8, 1.4].
/// Returns 1.15 when `lgOBP - lgAVG` is 0.01 or less.
pub fn woba_scale(league_obp: f64, league_woba: f64, league_avg: f64) -> f64 {
    let spread = league_obp - league_avg;
    if spread.is_nan() || spread <= WOBA_SCALE_MIN_SPREAD {
        return DEFAULT_WOBA_SCALE;
    }
    let raw = (league_obp - league_woba) / spread;
    if !raw.is_finite() {
        return DEFAULT_WOBA_SCALE;
    }
    raw.clamp(WOBA_SCALE_MIN, WOBA_SCALE_MAX)
}
