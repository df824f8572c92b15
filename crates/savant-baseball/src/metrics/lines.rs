// Composite builders: one normalized input line in, one full advanced line out.
//
// These are the only formula entry points the pipeline calls per player.

use savant_core::config::WobaWeights;
use savant_core::types::LeagueContext;

use super::batting::{self, WobaCounts};
use super::pitching;

// ---------------------------------------------------------------------------
// Batting
// ---------------------------------------------------------------------------

/// Normalized batting inputs. Rate fields are optional precomputed values;
/// when absent they are derived from the counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BattingLine {
    pub pa: u32,
    pub ab: u32,
    pub h: u32,
    pub doubles: u32,
    pub triples: u32,
    pub hr: u32,
    pub bb: u32,
    pub hbp: u32,
    pub so: u32,
    pub sf: u32,
    pub avg: Option<f64>,
    pub obp: Option<f64>,
    pub slg: Option<f64>,
}

impl BattingLine {
    pub fn woba_counts(&self) -> WobaCounts {
        WobaCounts {
            pa: self.pa,
            h: self.h,
            doubles: self.doubles,
            triples: self.triples,
            hr: self.hr,
            bb: self.bb,
            hbp: self.hbp,
        }
    }
}

/// Full advanced batting line, unrounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FullBattingLine {
    pub avg: f64,
    pub obp: f64,
    pub slg: f64,
    pub ops: f64,
    pub iso: f64,
    pub babip: f64,
    pub woba: f64,
    pub wrc_plus: f64,
    pub ops_plus: f64,
    pub k_pct: f64,
    pub bb_pct: f64,
    pub hr_rate: f64,
    /// `(AB - SO - HR + SF) / PA`, the input to eBA.
    pub bip_share: f64,
}

pub fn compute_full_batting_line(
    line: &BattingLine,
    league: &LeagueContext,
    park_factor: f64,
    weights: &WobaWeights,
) -> FullBattingLine {
    let avg = line
        .avg
        .unwrap_or_else(|| batting::batting_average(line.h, line.ab));
    let obp = line
        .obp
        .unwrap_or_else(|| batting::on_base_pct(line.h, line.bb, line.hbp, line.ab, line.sf));
    let slg = line.slg.unwrap_or_else(|| {
        batting::slugging_pct(
            batting::total_bases(line.h, line.doubles, line.triples, line.hr),
            line.ab,
        )
    });
    let woba = batting::woba(&line.woba_counts(), weights);

    FullBattingLine {
        avg,
        obp,
        slg,
        ops: obp + slg,
        iso: batting::iso(slg, avg),
        babip: batting::babip(line.h, line.hr, line.ab, line.so, line.sf),
        woba,
        wrc_plus: batting::wrc_plus(woba, league, park_factor),
        ops_plus: batting::ops_plus(obp, slg, league, park_factor),
        k_pct: batting::k_pct(line.so, line.pa),
        bb_pct: batting::bb_pct(line.bb, line.pa),
        hr_rate: super::ratio(line.hr as f64, line.pa as f64),
        bip_share: batting::balls_in_play_share(line.ab, line.so, line.hr, line.sf, line.pa),
    }
}

// ---------------------------------------------------------------------------
// Pitching
// ---------------------------------------------------------------------------

/// Normalized pitching inputs. `ip` is decimal innings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PitchingLine {
    pub ip: f64,
    pub h: u32,
    pub er: u32,
    pub bb: u32,
    pub hbp: u32,
    pub so: u32,
    pub hr: u32,
    /// Recorded batters faced; estimated as `IP*3 + H + BB` when absent.
    pub batters_faced: Option<u32>,
    /// Recorded fly balls; estimated from `fly_ball_rate` when absent.
    pub fly_balls: Option<u32>,
}

impl PitchingLine {
    pub fn batters_faced(&self) -> f64 {
        match self.batters_faced {
            Some(bf) => bf as f64,
            None => pitching::estimate_batters_faced(self.ip, self.h, self.bb),
        }
    }

    pub fn fly_balls(&self, fly_ball_rate: f64) -> f64 {
        match self.fly_balls {
            Some(fb) => fb as f64,
            None => pitching::estimate_fly_balls(
                self.batters_faced(),
                self.so,
                self.bb,
                self.hbp,
                fly_ball_rate,
            ),
        }
    }
}

/// Full advanced pitching line, unrounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FullPitchingLine {
    pub era: f64,
    pub whip: f64,
    pub fip: f64,
    pub x_fip: f64,
    pub era_minus: f64,
    pub k_per_9: f64,
    pub bb_per_9: f64,
    pub hr_per_9: f64,
    pub k_bb: f64,
    pub k_pct: f64,
    pub bb_pct: f64,
    pub babip_against: f64,
    pub lob_pct: f64,
    pub batters_faced: f64,
}

pub fn compute_full_pitching_line(
    line: &PitchingLine,
    league: &LeagueContext,
    park_factor: f64,
    fly_ball_rate: f64,
) -> FullPitchingLine {
    let ip = line.ip;
    let bf = line.batters_faced();
    let era = pitching::era(line.er, ip);

    FullPitchingLine {
        era,
        whip: pitching::whip(line.h, line.bb, ip),
        fip: pitching::fip(line.hr, line.bb, line.hbp, line.so, ip, league.fip_constant),
        x_fip: pitching::x_fip(
            line.fly_balls(fly_ball_rate),
            league.hr_per_fly_ball,
            line.bb,
            line.hbp,
            line.so,
            ip,
            league.fip_constant,
        ),
        era_minus: pitching::era_minus(era, league.era, park_factor),
        k_per_9: pitching::k_per_9(line.so, ip),
        bb_per_9: pitching::bb_per_9(line.bb, ip),
        hr_per_9: pitching::hr_per_9(line.hr, ip),
        k_bb: pitching::k_per_bb(line.so, line.bb),
        k_pct: super::ratio(line.so as f64, bf),
        bb_pct: super::ratio(line.bb as f64, bf),
        babip_against: pitching::babip_against(line.h, line.hr, line.so, line.bb, line.hbp, bf),
        lob_pct: pitching::lob_pct(line.h, line.bb, line.hbp, line.hr, line.er),
        batters_faced: bf,
    }
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
            obp: 0.370,
            slg: 0.420,
            woba: 0.345,
            era: 5.40,
            runs_per_pa: 0.15,
            fip_constant: 4.10,
            woba_scale: 1.10,
            hr_per_fly_ball: 0.10,
            batters: 0,
            pitchers: 0,
            plate_appearances: 0,
            innings_pitched: 0.0,
        }
    }

    fn player_a() -> BattingLine {
        BattingLine {
            pa: 118,
            ab: 100,
            h: 30,
            doubles: 5,
            triples: 1,
            hr: 4,
            bb: 15,
            hbp: 1,
            so: 20,
            sf: 2,
            ..Default::default()
        }
    }

    #[test]
    fn batting_line_from_counts() {
        let full = compute_full_batting_line(&player_a(), &league(), 1.0, &WobaWeights::default());
        assert!(approx_eq(full.avg, 0.300, 1e-12));
        assert!(approx_eq(full.obp, 46.0 / 118.0, 1e-12));
        assert!(approx_eq(full.slg, 0.49, 1e-12));
        assert!(approx_eq(full.iso, 0.19, 1e-12));
        assert!(full.woba > 0.30 && full.woba < 0.40, "woba {}", full.woba);
        assert!(approx_eq(full.bip_share, 78.0 / 118.0, 1e-12));
        assert!(full.wrc_plus > 0.0);
    }

    #[test]
    fn ops_is_exact_sum() {
        let lines = [
            player_a(),
            BattingLine {
                pa: 23,
                ab: 19,
                h: 7,
                doubles: 3,
                bb: 3,
                hbp: 1,
                so: 4,
                ..Default::default()
            },
            BattingLine {
                pa: 200,
                ab: 171,
                h: 49,
                doubles: 9,
                triples: 2,
                hr: 11,
                bb: 22,
                hbp: 4,
                so: 51,
                sf: 3,
                ..Default::default()
            },
        ];
        for line in &lines {
            let full = compute_full_batting_line(line, &league(), 1.0, &WobaWeights::default());
            assert_eq!(full.ops, full.obp + full.slg);
        }
    }

    #[test]
    fn precomputed_rates_take_precedence() {
        let mut line = player_a();
        line.avg = Some(0.250);
        line.slg = Some(0.400);
        let full = compute_full_batting_line(&line, &league(), 1.0, &WobaWeights::default());
        assert_eq!(full.avg, 0.250);
        assert!(approx_eq(full.iso, 0.150, 1e-12));
    }

    #[test]
    fn more_home_runs_raise_slugging_and_iso() {
        let base = compute_full_batting_line(&player_a(), &league(), 1.0, &WobaWeights::default());
        let mut more = player_a();
        more.hr += 1;
        more.h += 1;
        let bumped = compute_full_batting_line(&more, &league(), 1.0, &WobaWeights::default());
        assert!(bumped.slg > base.slg);
        assert!(bumped.woba > base.woba);
    }

    #[test]
    fn empty_batting_line_is_all_finite() {
        let full = compute_full_batting_line(
            &BattingLine::default(),
            &league(),
            1.0,
            &WobaWeights::default(),
        );
        for v in [full.avg, full.obp, full.slg, full.ops, full.babip, full.woba, full.wrc_plus] {
            assert!(v.is_finite());
        }
    }

    #[test]
    fn pitching_line_with_estimated_batters_faced() {
        let line = PitchingLine {
            ip: 30.0,
            h: 25,
            er: 10,
            bb: 10,
            hbp: 2,
            so: 40,
            hr: 3,
            ..Default::default()
        };
        let full = compute_full_pitching_line(&line, &league(), 1.0, 0.35);
        assert!(approx_eq(full.era, 3.0, 1e-12));
        assert!(approx_eq(full.whip, 35.0 / 30.0, 1e-12));
        assert!(approx_eq(full.batters_faced, 125.0, 1e-12));
        assert!(approx_eq(full.k_pct, 40.0 / 125.0, 1e-12));
        assert!(approx_eq(full.era_minus, 100.0 * 3.0 / 5.4, 1e-9));
        assert!(approx_eq(full.fip, -5.0 / 30.0 + 4.10, 1e-12));
        assert!(full.x_fip.is_finite());
    }

    #[test]
    fn recorded_batters_faced_and_fly_balls_are_used() {
        let line = PitchingLine {
            ip: 30.0,
            h: 25,
            er: 10,
            bb: 10,
            so: 40,
            hr: 3,
            batters_faced: Some(130),
            fly_balls: Some(30),
            ..Default::default()
        };
        let full = compute_full_pitching_line(&line, &league(), 1.0, 0.35);
        assert_eq!(full.batters_faced, 130.0);
        // 30 fly balls at 10% HR/FB == 3 expected homers == actual.
        assert!(approx_eq(full.x_fip, full.fip, 1e-12));
    }

    #[test]
    fn zero_innings_line_is_all_zero_rates() {
        let full = compute_full_pitching_line(&PitchingLine::default(), &league(), 1.0, 0.35);
        assert_eq!(full.era, 0.0);
        assert_eq!(full.fip, 0.0);
        assert_eq!(full.k_per_9, 0.0);
        assert_eq!(full.lob_pct, 0.0);
    }
}
