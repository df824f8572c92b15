// Batting rate and weighted stats.

use savant_core::config::WobaWeights;
use savant_core::types::LeagueContext;

use super::{clamp, ratio, sanitize};

// ---------------------------------------------------------------------------
// Slash line
// ---------------------------------------------------------------------------

pub fn batting_average(h: u32, ab: u32) -> f64 {
    ratio(h as f64, ab as f64)
}

/// `(H + BB + HBP) / (AB + BB + HBP + SF)`
pub fn on_base_pct(h: u32, bb: u32, hbp: u32, ab: u32, sf: u32) -> f64 {
    let on_base = h as f64 + bb as f64 + hbp as f64;
    ratio(on_base, ab as f64 + bb as f64 + hbp as f64 + sf as f64)
}

/// Singles implied by the hit breakdown, floored at zero for inconsistent rows.
pub fn singles(h: u32, doubles: u32, triples: u32, hr: u32) -> u32 {
    h.saturating_sub(doubles.saturating_add(triples).saturating_add(hr))
}

/// Widened to `u64` so four-times-HR on an extreme row cannot overflow.
pub fn total_bases(h: u32, doubles: u32, triples: u32, hr: u32) -> u64 {
    u64::from(singles(h, doubles, triples, hr))
        + 2 * u64::from(doubles)
        + 3 * u64::from(triples)
        + 4 * u64::from(hr)
}

pub fn slugging_pct(total_bases: u64, ab: u32) -> f64 {
    ratio(total_bases as f64, ab as f64)
}

// ---------------------------------------------------------------------------
// Rate stats
// ---------------------------------------------------------------------------

/// Isolated power: `SLG - AVG`. Not floored; inconsistent inputs can make it
/// negative.
pub fn iso(slg: f64, avg: f64) -> f64 {
    sanitize(slg - avg)
}

/// `(H - HR) / (AB - SO - HR + SF)`, 0 when the denominator is not positive.
pub fn babip(h: u32, hr: u32, ab: u32, so: u32, sf: u32) -> f64 {
    let den = ab as f64 - so as f64 - hr as f64 + sf as f64;
    ratio(h as f64 - hr as f64, den)
}

/// Share of plate appearances that ended with a ball in play, on the same
/// basis as `babip`: `(AB - SO - HR + SF) / PA`, clamped to [0, 1].
pub fn balls_in_play_share(ab: u32, so: u32, hr: u32, sf: u32, pa: u32) -> f64 {
    let in_play = ab as f64 - so as f64 - hr as f64 + sf as f64;
    clamp(ratio(in_play, pa as f64), 0.0, 1.0)
}

pub fn k_pct(so: u32, pa: u32) -> f64 {
    ratio(so as f64, pa as f64)
}

pub fn bb_pct(bb: u32, pa: u32) -> f64 {
    ratio(bb as f64, pa as f64)
}

// ---------------------------------------------------------------------------
// Weighted stats
// ---------------------------------------------------------------------------

/// Counting inputs for wOBA. League totals use the same struct as players.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WobaCounts {
    pub pa: u32,
    pub h: u32,
    pub doubles: u32,
    pub triples: u32,
    pub hr: u32,
    pub bb: u32,
    pub hbp: u32,
}

/// Weighted on-base average over plate appearances.
pub fn woba(c: &WobaCounts, w: &WobaWeights) -> f64 {
    let s = singles(c.h, c.doubles, c.triples, c.hr) as f64;
    let num = w.bb * c.bb as f64
        + w.hbp * c.hbp as f64
        + w.single * s
        + w.double * c.doubles as f64
        + w.triple * c.triples as f64
        + w.hr * c.hr as f64;
    ratio(num, c.pa as f64)
}

/// wRC+: `(((wOBA - lgwOBA) / scale + lgR/PA) / park) / lgR/PA * 100`.
///
/// Returns the league-average 100 when the league run environment or scale
/// is unusable.
pub fn wrc_plus(woba: f64, league: &LeagueContext, park_factor: f64) -> f64 {
    let lg_rpa = league.runs_per_pa;
    if lg_rpa <= 0.0 || league.woba_scale <= 0.0 || park_factor <= 0.0 {
        return 100.0;
    }
    let wraa_per_pa = (woba - league.woba) / league.woba_scale;
    sanitize((wraa_per_pa + lg_rpa) / park_factor / lg_rpa * 100.0)
}

/// OPS+: `100 * (OBP / (lgOBP * park) + SLG / (lgSLG * park) - 1)`.
pub fn ops_plus(obp: f64, slg: f64, league: &LeagueContext, park_factor: f64) -> f64 {
    if league.obp <= 0.0 || league.slg <= 0.0 || park_factor <= 0.0 {
        return 100.0;
    }
    sanitize(100.0 * (obp / (league.obp * park_factor) + slg / (league.slg * park_factor) - 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn league() -> LeagueContext {
        LeagueContext {
            season: 2025,
            avg: 0.280,
            obp: 0.380,
            slg: 0.420,
            woba: 0.350,
            era: 5.50,
            runs_per_pa: 0.16,
            fip_constant: 4.2,
            woba_scale: 1.1,
            hr_per_fly_ball: 0.1,
            batters: 0,
            pitchers: 0,
            plate_appearances: 0,
            innings_pitched: 0.0,
        }
    }

    #[test]
    fn slash_line_basics() {
        assert!(approx_eq(batting_average(30, 100), 0.3, 1e-12));
        assert_eq!(batting_average(5, 0), 0.0);
        assert!(approx_eq(on_base_pct(30, 15, 1, 100, 2), 46.0 / 118.0, 1e-12));
        assert_eq!(total_bases(30, 5, 1, 4), 20 + 10 + 3 + 16);
    }

    #[test]
    fn singles_clamped_at_zero() {
        assert_eq!(singles(3, 2, 1, 2), 0);
        assert_eq!(singles(10, 2, 1, 2), 5);
    }

    #[test]
    fn iso_is_raw_difference() {
        assert!(approx_eq(iso(0.450, 0.300), 0.150, 1e-12));
        // Contrived inputs: negative ISO is returned as-is.
        assert!(approx_eq(iso(0.200, 0.300), -0.100, 1e-12));
        assert_eq!(iso(f64::NAN, 0.3), 0.0);
    }

    #[test]
    fn babip_formula_and_zero_denominator() {
        // (30 - 4) / (100 - 20 - 4 + 2) = 26 / 78
        assert!(approx_eq(babip(30, 4, 100, 20, 2), 26.0 / 78.0, 1e-12));
        // Every AB a strikeout or homer.
        assert_eq!(babip(5, 5, 10, 5, 0), 0.0);
    }

    #[test]
    fn balls_in_play_share_matches_babip_denominator() {
        // 78 balls in play over 118 PA.
        assert!(approx_eq(balls_in_play_share(100, 20, 4, 2, 118), 78.0 / 118.0, 1e-12));
        assert_eq!(balls_in_play_share(10, 8, 4, 0, 12), 0.0);
        assert_eq!(balls_in_play_share(10, 0, 0, 0, 0), 0.0);
    }

    #[test]
    fn extreme_counts_do_not_overflow() {
        let max = u32::MAX;
        assert!(on_base_pct(max, max, max, max, max).is_finite());
        assert_eq!(total_bases(max, 0, 0, max), 4 * u64::from(max));
        assert_eq!(singles(max, max, max, max), 0);
        assert!(slugging_pct(total_bases(max, max, max, max), max) > 0.0);
    }

    #[test]
    fn k_and_bb_pct_guard_zero_pa() {
        assert!(approx_eq(k_pct(20, 118), 20.0 / 118.0, 1e-12));
        assert!(approx_eq(bb_pct(15, 118), 15.0 / 118.0, 1e-12));
        assert_eq!(k_pct(3, 0), 0.0);
        assert_eq!(bb_pct(3, 0), 0.0);
    }

    #[test]
    fn k_pct_complement_decreases_with_strikeouts() {
        let contact_low_k = 1.0 - k_pct(10, 100);
        let contact_high_k = 1.0 - k_pct(11, 100);
        assert!(contact_high_k < contact_low_k);
    }

    #[test]
    fn woba_known_value() {
        let c = WobaCounts {
            pa: 118,
            h: 30,
            doubles: 5,
            triples: 1,
            hr: 4,
            bb: 15,
            hbp: 1,
        };
        let w = WobaWeights::default();
        let expected =
            (0.69 * 15.0 + 0.72 * 1.0 + 0.89 * 20.0 + 1.27 * 5.0 + 1.62 * 1.0 + 2.10 * 4.0) / 118.0;
        assert!(approx_eq(woba(&c, &w), expected, 1e-12));
        assert_eq!(woba(&WobaCounts::default(), &w), 0.0);
    }

    #[test]
    fn wrc_plus_league_average_is_100() {
        let lg = league();
        assert!(approx_eq(wrc_plus(lg.woba, &lg, 1.0), 100.0, 1e-9));
        assert!(wrc_plus(0.420, &lg, 1.0) > 100.0);
        assert!(wrc_plus(0.300, &lg, 1.0) < 100.0);
    }

    #[test]
    fn wrc_plus_defaults_when_league_unusable() {
        let mut lg = league();
        lg.runs_per_pa = 0.0;
        assert_eq!(wrc_plus(0.5, &lg, 1.0), 100.0);
        let mut lg = league();
        lg.woba_scale = 0.0;
        assert_eq!(wrc_plus(0.5, &lg, 1.0), 100.0);
    }

    #[test]
    fn wrc_plus_hitter_park_lowers_value() {
        let lg = league();
        assert!(wrc_plus(0.400, &lg, 1.1) < wrc_plus(0.400, &lg, 1.0));
    }

    #[test]
    fn ops_plus_league_average_is_100() {
        let lg = league();
        assert!(approx_eq(ops_plus(lg.obp, lg.slg, &lg, 1.0), 100.0, 1e-9));
        let mut lg = league();
        lg.slg = 0.0;
        assert_eq!(ops_plus(0.4, 0.5, &lg, 1.0), 100.0);
    }
}
