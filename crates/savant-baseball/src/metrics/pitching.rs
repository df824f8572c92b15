// Pitching run-prevention and rate stats. `ip` is always decimal innings.

use super::{ratio, sanitize};

pub fn era(er: u32, ip: f64) -> f64 {
    ratio(er as f64 * 9.0, ip)
}

pub fn whip(h: u32, bb: u32, ip: f64) -> f64 {
    ratio(h as f64 + bb as f64, ip)
}

/// FIP: `(13*HR + 3*(BB + HBP) - 2*K) / IP + constant`. 0 with no innings.
pub fn fip(hr: u32, bb: u32, hbp: u32, so: u32, ip: f64, fip_constant: f64) -> f64 {
    if ip <= 0.0 {
        return 0.0;
    }
    let core = 13.0 * hr as f64 + 3.0 * (bb as f64 + hbp as f64) - 2.0 * so as f64;
    sanitize(ratio(core, ip) + fip_constant)
}

/// xFIP: FIP with home runs replaced by `fly_balls * hr_per_fly_ball`.
pub fn x_fip(
    fly_balls: f64,
    hr_per_fly_ball: f64,
    bb: u32,
    hbp: u32,
    so: u32,
    ip: f64,
    fip_constant: f64,
) -> f64 {
    if ip <= 0.0 {
        return 0.0;
    }
    let expected_hr = sanitize(fly_balls * hr_per_fly_ball).max(0.0);
    let core = 13.0 * expected_hr + 3.0 * (bb as f64 + hbp as f64) - 2.0 * so as f64;
    sanitize(ratio(core, ip) + fip_constant)
}

/// ERA-: `100 * (ERA / lgERA) / park`. Lower is better; 100 is average.
pub fn era_minus(era: f64, league_era: f64, park_factor: f64) -> f64 {
    if league_era <= 0.0 || park_factor <= 0.0 {
        return 100.0;
    }
    sanitize(100.0 * (era / league_era) / park_factor)
}

pub fn k_per_9(so: u32, ip: f64) -> f64 {
    ratio(so as f64 * 9.0, ip)
}

pub fn bb_per_9(bb: u32, ip: f64) -> f64 {
    ratio(bb as f64 * 9.0, ip)
}

pub fn hr_per_9(hr: u32, ip: f64) -> f64 {
    ratio(hr as f64 * 9.0, ip)
}

/// Strikeout-to-walk ratio. 0 for a walk-free line rather than infinity.
pub fn k_per_bb(so: u32, bb: u32) -> f64 {
    ratio(so as f64, bb as f64)
}

/// Left-on-base rate: `(H + BB + HBP - HR - ER) / (H + BB + HBP - HR)`.
pub fn lob_pct(h: u32, bb: u32, hbp: u32, hr: u32, er: u32) -> f64 {
    let reached = h as f64 + bb as f64 + hbp as f64 - hr as f64;
    ratio(reached - er as f64, reached)
}

/// Batters faced when the source does not record it: `IP*3 + H + BB`.
pub fn estimate_batters_faced(ip: f64, h: u32, bb: u32) -> f64 {
    sanitize(ip * 3.0 + h as f64 + bb as f64)
}

/// BABIP against, using balls in play `BF - SO - BB - HBP - HR`.
pub fn babip_against(h: u32, hr: u32, so: u32, bb: u32, hbp: u32, batters_faced: f64) -> f64 {
    let in_play = batters_faced - so as f64 - bb as f64 - hbp as f64 - hr as f64;
    ratio(h as f64 - hr as f64, in_play)
}

/// Fly balls implied by a fixed fly-ball share of non-K/BB/HBP plate
/// appearances. Home runs are part of the fly-ball pool.
pub fn estimate_fly_balls(
    batters_faced: f64,
    so: u32,
    bb: u32,
    hbp: u32,
    fly_ball_rate: f64,
) -> f64 {
    let contact = batters_faced - so as f64 - bb as f64 - hbp as f64;
    sanitize(contact.max(0.0) * fly_ball_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn era_and_whip() {
        assert!(approx_eq(era(10, 30.0), 3.0, 1e-12));
        assert!(approx_eq(whip(25, 11, 30.0), 1.2, 1e-12));
        assert_eq!(era(10, 0.0), 0.0);
        assert_eq!(whip(10, 3, 0.0), 0.0);
    }

    #[test]
    fn fip_known_value() {
        // (13*3 + 3*(10+2) - 2*40) / 30 + 3.8 = (39 + 36 - 80)/30 + 3.8
        let v = fip(3, 10, 2, 40, 30.0, 3.8);
        assert!(approx_eq(v, -5.0 / 30.0 + 3.8, 1e-12));
        assert_eq!(fip(3, 10, 2, 40, 0.0, 3.8), 0.0);
    }

    #[test]
    fn x_fip_matches_fip_when_expected_hr_equals_actual() {
        let f = fip(4, 10, 1, 35, 40.0, 4.0);
        let x = x_fip(40.0, 0.1, 10, 1, 35, 40.0, 4.0);
        assert!(approx_eq(f, x, 1e-12));
        assert_eq!(x_fip(40.0, 0.1, 10, 1, 35, 0.0, 4.0), 0.0);
    }

    #[test]
    fn x_fip_ignores_negative_fly_balls() {
        let with_zero = x_fip(0.0, 0.1, 5, 0, 20, 20.0, 4.0);
        let with_negative = x_fip(-10.0, 0.1, 5, 0, 20, 20.0, 4.0);
        assert!(approx_eq(with_zero, with_negative, 1e-12));
    }

    #[test]
    fn era_minus_formula_and_fallback() {
        assert!(approx_eq(era_minus(4.5, 6.0, 1.0), 75.0, 1e-12));
        assert!(approx_eq(era_minus(6.0, 6.0, 1.2), 100.0 / 1.2, 1e-12));
        assert_eq!(era_minus(4.5, 0.0, 1.0), 100.0);
    }

    #[test]
    fn per_nine_rates() {
        assert!(approx_eq(k_per_9(40, 30.0), 12.0, 1e-12));
        assert!(approx_eq(bb_per_9(10, 30.0), 3.0, 1e-12));
        assert!(approx_eq(hr_per_9(3, 30.0), 0.9, 1e-12));
        assert_eq!(k_per_9(40, 0.0), 0.0);
    }

    #[test]
    fn k_per_bb_walk_free_is_zero() {
        assert!(approx_eq(k_per_bb(40, 10), 4.0, 1e-12));
        assert_eq!(k_per_bb(40, 0), 0.0);
    }

    #[test]
    fn lob_pct_formula_and_zero_denominator() {
        // (25 + 10 + 2 - 3 - 10) / (25 + 10 + 2 - 3) = 24 / 34
        assert!(approx_eq(lob_pct(25, 10, 2, 3, 10), 24.0 / 34.0, 1e-12));
        assert_eq!(lob_pct(2, 0, 0, 2, 2), 0.0);
    }

    #[test]
    fn batters_faced_and_babip_against() {
        let bf = estimate_batters_faced(30.0, 25, 10);
        assert!(approx_eq(bf, 125.0, 1e-12));
        // (25 - 3) / (125 - 40 - 10 - 2 - 3) = 22 / 70
        assert!(approx_eq(babip_against(25, 3, 40, 10, 2, bf), 22.0 / 70.0, 1e-12));
        assert_eq!(babip_against(5, 0, 10, 0, 0, 8.0), 0.0);
    }

    #[test]
    fn extreme_counts_do_not_overflow() {
        let max = u32::MAX;
        assert!(whip(max, max, 30.0).is_finite());
        assert!(fip(max, max, max, 0, 30.0, 3.8).is_finite());
        assert!(x_fip(1.0e9, 0.1, max, max, 0, 30.0, 3.8).is_finite());
    }

    #[test]
    fn fly_ball_estimate() {
        assert!(approx_eq(estimate_fly_balls(125.0, 40, 10, 2, 0.35), 73.0 * 0.35, 1e-12));
        assert_eq!(estimate_fly_balls(10.0, 10, 5, 0, 0.35), 0.0);
    }
}
