// League context derivation: one pass over raw rows, qualifying players only.

use savant_core::config::PipelineConfig;
use savant_core::types::{LeagueContext, RawPlayerRow};

use crate::metrics::batting::{self, WobaCounts};
use crate::metrics::calibration::{fip_constant, woba_scale};
use crate::metrics::lines::PitchingLine;
use crate::metrics::{pitching, ratio, thirds_to_ip};

use super::{qualified_innings, qualified_plate_appearances};

/// Summed batting counts over qualifying batters. Sums saturate at
/// `u32::MAX` rather than wrapping.
#[derive(Debug, Default)]
struct BattingTotals {
    players: u32,
    pa: u32,
    ab: u32,
    r: u32,
    h: u32,
    doubles: u32,
    triples: u32,
    hr: u32,
    bb: u32,
    hbp: u32,
    sf: u32,
}

impl BattingTotals {
    fn add(&mut self, row: &RawPlayerRow, pa: u32) {
        self.players += 1;
        self.pa = self.pa.saturating_add(pa);
        self.ab = self.ab.saturating_add(row.ab);
        self.r = self.r.saturating_add(row.r);
        self.h = self.h.saturating_add(row.h);
        self.doubles = self.doubles.saturating_add(row.doubles);
        self.triples = self.triples.saturating_add(row.triples);
        self.hr = self.hr.saturating_add(row.hr);
        self.bb = self.bb.saturating_add(row.bb);
        self.hbp = self.hbp.saturating_add(row.hbp);
        self.sf = self.sf.saturating_add(row.sf);
    }
}

/// Summed pitching counts over qualifying pitchers. Innings stay in thirds
/// until the end so the sum is exact.
#[derive(Debug, Default)]
struct PitchingTotals {
    players: u32,
    ip_thirds: u32,
    er: u32,
    hr: u32,
    bb: u32,
    hbp: u32,
    so: u32,
    fly_balls: f64,
}

impl PitchingTotals {
    fn add(&mut self, row: &RawPlayerRow, ip: f64, fly_ball_rate: f64) {
        self.players += 1;
        self.ip_thirds = self.ip_thirds.saturating_add(row.ip_thirds);
        self.er = self.er.saturating_add(row.er);
        self.hr = self.hr.saturating_add(row.hr_allowed);
        self.bb = self.bb.saturating_add(row.bb_allowed);
        self.hbp = self.hbp.saturating_add(row.hbp_allowed);
        self.so = self.so.saturating_add(row.so_pitch);
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
        self.fly_balls += line.fly_balls(fly_ball_rate);
    }
}

/// Build the season's `LeagueContext` from all qualifying rows.
pub fn derive_league_context(
    rows: &[RawPlayerRow],
    season: u16,
    config: &PipelineConfig,
) -> LeagueContext {
    let mut bat = BattingTotals::default();
    let mut pit = PitchingTotals::default();

    for row in rows {
        if let Some(pa) = qualified_plate_appearances(row, config) {
            bat.add(row, pa);
        }
        if let Some(ip) = qualified_innings(row, config) {
            pit.add(row, ip, config.fly_ball_rate);
        }
    }

    let avg = batting::batting_average(bat.h, bat.ab);
    let obp = batting::on_base_pct(bat.h, bat.bb, bat.hbp, bat.ab, bat.sf);
    let slg = batting::slugging_pct(
        batting::total_bases(bat.h, bat.doubles, bat.triples, bat.hr),
        bat.ab,
    );
    let woba = batting::woba(
        &WobaCounts {
            pa: bat.pa,
            h: bat.h,
            doubles: bat.doubles,
            triples: bat.triples,
            hr: bat.hr,
            bb: bat.bb,
            hbp: bat.hbp,
        },
        &config.woba_weights,
    );
    let runs_per_pa = ratio(bat.r as f64, bat.pa as f64);

    let ip = thirds_to_ip(pit.ip_thirds);
    let era = pitching::era(pit.er, ip);
    // HBP rides with BB so the constant calibrates the same numerator FIP uses.
    let fip_c = fip_constant(
        era,
        pit.hr as f64,
        pit.bb as f64 + pit.hbp as f64,
        pit.so as f64,
        ip,
    );
    let hr_per_fly_ball = if pit.fly_balls > 0.0 {
        ratio(pit.hr as f64, pit.fly_balls)
    } else {
        config.default_hr_per_fly_ball
    };

    LeagueContext {
        season,
        avg,
        obp,
        slg,
        woba,
        era,
        runs_per_pa,
        fip_constant: fip_c,
        woba_scale: woba_scale(obp, woba, avg),
        hr_per_fly_ball,
        batters: bat.players,
        pitchers: pit.players,
        plate_appearances: bat.pa,
        innings_pitched: ip,
    }
}
