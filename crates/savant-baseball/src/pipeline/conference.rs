// Conference strength, computed twice.
//
// The pre-pass works from raw rows and exists only so per-player estimated
// stats can apply a conference adjustment. The final pass works from the
// published batting/pitching rows and produces the published table. The
// final values are not fed back into the pre-pass lookup.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use savant_core::config::PipelineConfig;
use savant_core::types::{
    BattingAdvancedRow, ConferenceStrengthRow, LeagueContext, PitchingAdvancedRow, RawPlayerRow,
    TeamConferenceMap,
};

use crate::metrics::batting::{self, WobaCounts};
use crate::metrics::calibration::{conference_strength, ConferenceInputs};
use crate::metrics::{pitching, ratio, round_to};

use super::{qualified_innings, qualified_plate_appearances, RunStamp};

/// Conference -> preliminary strength index (0-100).
pub type StrengthLookup = HashMap<String, f64>;

/// Running mean.
#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    n: u32,
}

impl Mean {
    fn push(&mut self, v: f64) {
        self.sum += v;
        self.n += 1;
    }

    fn value(&self) -> Option<f64> {
        (self.n > 0).then(|| self.sum / self.n as f64)
    }
}

// ---------------------------------------------------------------------------
// Pre-pass
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct RawConferenceAccumulator {
    woba: Mean,
    era: Mean,
}

/// Preliminary strength per conference from raw rows.
///
/// Averages per-player wOBA (qualified batters) and ERA (qualified pitchers)
/// per conference. A conference missing one side uses the pooled mean across
/// all conferences for that side. Win% and RPI are placeholders.
pub fn preliminary_strength(
    rows: &[RawPlayerRow],
    team_map: &TeamConferenceMap,
    config: &PipelineConfig,
) -> StrengthLookup {
    let mut by_conference: HashMap<&str, RawConferenceAccumulator> = HashMap::new();
    let mut pooled = RawConferenceAccumulator::default();

    for row in rows {
        let Some(team) = team_map.get(&row.team) else {
            continue;
        };
        let acc = by_conference.entry(team.conference.as_str()).or_default();

        if let Some(pa) = qualified_plate_appearances(row, config) {
            let woba = batting::woba(
                &WobaCounts {
                    pa,
                    h: row.h,
                    doubles: row.doubles,
                    triples: row.triples,
                    hr: row.hr,
                    bb: row.bb,
                    hbp: row.hbp,
                },
                &config.woba_weights,
            );
            acc.woba.push(woba);
            pooled.woba.push(woba);
        }
        if let Some(ip) = qualified_innings(row, config) {
            let era = pitching::era(row.er, ip);
            acc.era.push(era);
            pooled.era.push(era);
        }
    }

    let pooled_woba = pooled.woba.value().unwrap_or(0.0);
    let pooled_era = pooled.era.value().unwrap_or(0.0);

    by_conference
        .into_iter()
        .filter(|(_, acc)| acc.woba.n > 0 || acc.era.n > 0)
        .map(|(conference, acc)| {
            let index = conference_strength(&ConferenceInputs {
                inter_conf_win_pct: config.placeholder_win_pct,
                rpi: config.placeholder_rpi,
                avg_woba: acc.woba.value().unwrap_or(pooled_woba),
                avg_era: acc.era.value().unwrap_or(pooled_era),
            });
            (conference.to_string(), index)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Final pass
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct RowConferenceAccumulator<'a> {
    ops: Mean,
    woba: Mean,
    runs_per_game: Mean,
    era: Mean,
    teams: BTreeSet<&'a str>,
}

/// Published conference strength rows from already-computed player rows,
/// sorted by conference name. Rows without a conference are ignored.
pub fn final_strength(
    batting: &[BattingAdvancedRow],
    pitching: &[PitchingAdvancedRow],
    league: &LeagueContext,
    config: &PipelineConfig,
    stamp: &RunStamp<'_>,
) -> Vec<ConferenceStrengthRow> {
    let mut by_conference: BTreeMap<&str, RowConferenceAccumulator<'_>> = BTreeMap::new();

    for row in batting {
        let Some(conference) = row.conference.as_deref() else {
            continue;
        };
        let acc = by_conference.entry(conference).or_default();
        acc.ops.push(row.ops);
        acc.woba.push(row.woba);
        acc.runs_per_game.push(ratio(row.r as f64, row.g as f64));
        acc.teams.insert(row.team.as_str());
    }
    for row in pitching {
        let Some(conference) = row.conference.as_deref() else {
            continue;
        };
        let acc = by_conference.entry(conference).or_default();
        acc.era.push(row.era);
        acc.teams.insert(row.team.as_str());
    }

    by_conference
        .into_iter()
        .map(|(conference, acc)| {
            let avg_woba = acc.woba.value().unwrap_or(league.woba);
            let avg_era = acc.era.value().unwrap_or(league.era);
            let index = conference_strength(&ConferenceInputs {
                inter_conf_win_pct: config.placeholder_win_pct,
                rpi: config.placeholder_rpi,
                avg_woba,
                avg_era,
            });
            ConferenceStrengthRow {
                conference: conference.to_string(),
                season: stamp.season,
                strength_index: round_to(index, 1),
                inter_conf_win_pct: config.placeholder_win_pct,
                rpi_avg: config.placeholder_rpi,
                avg_ops: round_to(acc.ops.value().unwrap_or(league.obp + league.slg), 3),
                avg_woba: round_to(avg_woba, 3),
                avg_era: round_to(avg_era, 2),
                runs_per_game: round_to(acc.runs_per_game.value().unwrap_or(0.0), 2),
                team_count: acc.teams.len() as u32,
                is_power: config.is_power_conference(conference),
                data_source: stamp.data_source.to_string(),
                computed_at: stamp.computed_at,
            }
        })
        .collect()
}
