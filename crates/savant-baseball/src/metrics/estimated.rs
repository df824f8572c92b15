// Estimated ("e-prefixed") batting stats.
//
// These are box-score approximations of expected stats: there is no batted-ball
// tracking for this league, so contact quality is inferred from a regressed
// BABIP plus strikeout and home-run rates. Published values must be labeled as
// estimates.

use super::{clamp, sanitize};

/// Conference strength treated as neutral; no adjustment is applied.
pub const NEUTRAL_CONFERENCE_STRENGTH: f64 = 50.0;

/// eBA change per point of strength index above neutral.
const CONFERENCE_EBA_PER_POINT: f64 = -0.001;

/// ewOBA blend coefficients.
const EWOBA_OBP_WEIGHT: f64 = 0.5;
const EWOBA_POWER_WEIGHT: f64 = 0.8;
const EWOBA_WALK_SHARE: f64 = 0.2;

/// Regression inputs for estimated stats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionParams {
    pub league_babip: f64,
    /// Share of the player's BABIP replaced by `league_babip`.
    pub babip_regression: f64,
}

impl Default for RegressionParams {
    fn default() -> Self {
        RegressionParams {
            league_babip: 0.300,
            babip_regression: 0.40,
        }
    }
}

/// BABIP regressed toward the league mean.
pub fn regressed_babip(babip: f64, params: &RegressionParams) -> f64 {
    let r = clamp(params.babip_regression, 0.0, 1.0);
    sanitize((1.0 - r) * babip + r * params.league_babip)
}

/// Estimated batting average.
///
/// `regressedBABIP * bip_share + HR%`, then shifted by 0.001 per point of
/// conference strength away from 50 (stronger conference, lower eBA).
/// `bip_share` is `(AB - SO - HR + SF) / PA`, the same balls-in-play basis
/// BABIP divides by, so the regressed term is
/// `(1 - r) * (H - HR) / PA + r * lgBABIP * bip_share` and extra strikeouts
/// can only lower it. Result is clamped to [0, 1].
pub fn e_ba(
    babip: f64,
    bip_share: f64,
    hr_rate: f64,
    conference_strength: f64,
    params: &RegressionParams,
) -> f64 {
    let share = clamp(bip_share, 0.0, 1.0);
    let hr = clamp(hr_rate, 0.0, 1.0);
    let conference_adj =
        CONFERENCE_EBA_PER_POINT * (sanitize(conference_strength) - NEUTRAL_CONFERENCE_STRENGTH);
    clamp(
        regressed_babip(babip, params) * share + hr + conference_adj,
        0.0,
        1.0,
    )
}

/// Estimated slugging: `eBA + ISO`.
pub fn e_slg(e_ba: f64, iso: f64) -> f64 {
    sanitize(e_ba + iso)
}

/// Estimated wOBA.
///
/// Blends an approximate OBP (`eBA + BB%`) with the power part of eSLG,
/// `0.5 * eOBP + 0.8 * (eSLG - eBA)`, plus a walk-weight term
/// `0.2 * wBB * BB%`. The 0.8 weight applies to `eSLG - eBA` (estimated ISO)
/// rather than to eSLG itself, so singles are not counted twice and the value
/// lands on the wOBA scale.
pub fn e_woba(e_ba: f64, e_slg: f64, bb_pct: f64, walk_weight: f64) -> f64 {
    let e_obp = e_ba + bb_pct;
    let e_power = e_slg - e_ba;
    clamp(
        EWOBA_OBP_WEIGHT * e_obp
            + EWOBA_POWER_WEIGHT * e_power
            + EWOBA_WALK_SHARE * walk_weight * bb_pct,
        0.0,
        2.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::batting;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn params() -> RegressionParams {
        RegressionParams::default()
    }

    #[test]
    fn regressed_babip_moves_40_percent_to_mean() {
        assert!(approx_eq(regressed_babip(0.400, &params()), 0.6 * 0.4 + 0.4 * 0.3, 1e-12));
        assert!(approx_eq(regressed_babip(0.300, &params()), 0.300, 1e-12));
    }

    #[test]
    fn e_ba_known_value_at_neutral_conference() {
        let v = e_ba(0.350, 0.70, 0.03, 50.0, &params());
        let reg = 0.6 * 0.35 + 0.4 * 0.3;
        assert!(approx_eq(v, reg * 0.70 + 0.03, 1e-12));
    }

    #[test]
    fn stronger_conference_depresses_e_ba() {
        let neutral = e_ba(0.330, 0.65, 0.02, 50.0, &params());
        let strong = e_ba(0.330, 0.65, 0.02, 70.0, &params());
        let weak = e_ba(0.330, 0.65, 0.02, 30.0, &params());
        assert!(approx_eq(neutral - strong, 0.020, 1e-12));
        assert!(approx_eq(weak - neutral, 0.020, 1e-12));
    }

    /// eBA from raw counts, the way the per-player pipeline builds it.
    fn e_ba_from_counts(ab: u32, h: u32, hr: u32, bb: u32, so: u32) -> f64 {
        let pa = ab + bb;
        e_ba(
            batting::babip(h, hr, ab, so, 0),
            batting::balls_in_play_share(ab, so, hr, 0, pa),
            hr as f64 / pa as f64,
            50.0,
            &params(),
        )
    }

    #[test]
    fn more_strikeouts_never_raise_e_ba_from_counts() {
        // Walk-heavy line: BABIP climbs quickly as strikeouts replace balls
        // in play, but eBA must still not rise.
        let mut prev = e_ba_from_counts(50, 30, 0, 50, 0);
        for so in 1..=20 {
            let v = e_ba_from_counts(50, 30, 0, 50, so);
            assert!(v <= prev, "eBA rose at SO {so}: {prev} -> {v}");
            prev = v;
        }

        let mut prev = e_ba_from_counts(100, 30, 4, 15, 0);
        for so in 1..=60 {
            let v = e_ba_from_counts(100, 30, 4, 15, so);
            assert!(v <= prev, "eBA rose at SO {so}: {prev} -> {v}");
            prev = v;
        }
    }

    #[test]
    fn smaller_ball_in_play_share_never_raises_e_ba() {
        let mut prev = e_ba(0.320, 1.0, 0.03, 55.0, &params());
        for step in 1..=40 {
            let share = 1.0 - step as f64 * 0.025;
            let v = e_ba(0.320, share, 0.03, 55.0, &params());
            assert!(v <= prev, "eBA rose at share {share}");
            prev = v;
        }
    }

    #[test]
    fn more_home_runs_raise_e_slg() {
        // One more homer in 100 AB: ISO rises by 3/100, HR rate by 1/118.
        let low = e_slg(e_ba(0.330, 0.66, 4.0 / 118.0, 50.0, &params()), 0.190);
        let high = e_slg(e_ba(0.330, 0.65, 5.0 / 118.0, 50.0, &params()), 0.220);
        assert!(high > low);
    }

    #[test]
    fn e_ba_clamped_to_unit_interval() {
        assert_eq!(e_ba(0.0, 0.0, 0.0, 100.0, &params()), 0.0);
        assert!(e_ba(5.0, 1.0, 0.5, 0.0, &params()) <= 1.0);
        assert!(e_ba(f64::NAN, f64::NAN, f64::NAN, f64::NAN, &params()) >= 0.0);
    }

    #[test]
    fn e_woba_formula() {
        let v = e_woba(0.280, 0.430, 0.10, 0.69);
        let expected = 0.5 * 0.38 + 0.8 * 0.15 + 0.2 * 0.69 * 0.10;
        assert!(approx_eq(v, expected, 1e-12));
    }
}
