// Shared data model: raw season rows in, advanced-stat table rows out.
//
// Output row field names match the persisted table columns one-to-one; the
// store in `crate::db` writes them positionally.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// One player's season-accumulated box-score totals.
///
/// Batting and pitching totals live on the same row; two-way players carry
/// both, everyone else has zeros on the side they did not play.
/// Innings pitched are stored as integer thirds (`ip_thirds`) to keep the
/// accumulation exact.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawPlayerRow {
    pub player_id: String,
    pub player_name: String,
    pub team: String,
    pub season: u16,

    // Batting
    pub games_bat: u32,
    pub ab: u32,
    pub r: u32,
    pub h: u32,
    pub doubles: u32,
    pub triples: u32,
    pub hr: u32,
    pub rbi: u32,
    pub bb: u32,
    pub hbp: u32,
    pub so: u32,
    pub sf: u32,
    pub sb: u32,

    // Pitching
    pub games_pitch: u32,
    pub ip_thirds: u32,
    pub h_allowed: u32,
    pub r_allowed: u32,
    pub er: u32,
    pub bb_allowed: u32,
    pub hbp_allowed: u32,
    pub so_pitch: u32,
    pub hr_allowed: u32,
    /// Batters faced, when the source tracks it. Estimated otherwise.
    pub batters_faced: Option<u32>,
}

impl RawPlayerRow {
    /// Plate appearances as the box score allows us to reconstruct them.
    /// Saturates instead of overflowing on corrupt counts.
    pub fn plate_appearances(&self) -> u32 {
        self.ab
            .saturating_add(self.bb)
            .saturating_add(self.hbp)
            .saturating_add(self.sf)
    }
}

/// Conference and home venue for a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamInfo {
    pub conference: String,
    pub stadium: Option<String>,
}

/// Team display name -> conference/stadium lookup.
pub type TeamConferenceMap = HashMap<String, TeamInfo>;

// ---------------------------------------------------------------------------
// League baseline
// ---------------------------------------------------------------------------

/// Season-wide baselines derived from qualifying players.
///
/// Built once per run and read-only afterwards. `fip_constant` is clamped to
/// [3.0, 5.0] and `woba_scale` to [0.8, 1.4].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueContext {
    pub season: u16,
    pub avg: f64,
    pub obp: f64,
    pub slg: f64,
    pub woba: f64,
    pub era: f64,
    pub runs_per_pa: f64,
    pub fip_constant: f64,
    pub woba_scale: f64,
    pub hr_per_fly_ball: f64,
    pub batters: u32,
    pub pitchers: u32,
    pub plate_appearances: u32,
    pub innings_pitched: f64,
}

// ---------------------------------------------------------------------------
// Output rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattingAdvancedRow {
    pub player_id: String,
    pub player_name: String,
    pub team: String,
    pub conference: Option<String>,
    pub season: u16,
    pub g: u32,
    pub pa: u32,
    pub ab: u32,
    pub r: u32,
    pub hr: u32,
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
    pub e_ba: f64,
    pub e_slg: f64,
    pub e_woba: f64,
    pub data_source: String,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchingAdvancedRow {
    pub player_id: String,
    pub player_name: String,
    pub team: String,
    pub conference: Option<String>,
    pub season: u16,
    pub g: u32,
    pub ip: f64,
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
    pub data_source: String,
    pub computed_at: DateTime<Utc>,
}

/// Per-team park factors. Every factor is the neutral 1.0 until home/away
/// splits exist; `methodology` says so explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkFactorRow {
    pub team: String,
    pub venue_name: Option<String>,
    pub conference: Option<String>,
    pub season: u16,
    pub runs_factor: f64,
    pub hits_factor: f64,
    pub hr_factor: f64,
    pub bb_factor: f64,
    pub so_factor: f64,
    pub sample_games: u32,
    pub methodology: String,
    pub data_source: String,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConferenceStrengthRow {
    pub conference: String,
    pub season: u16,
    pub strength_index: f64,
    pub inter_conf_win_pct: f64,
    pub rpi_avg: f64,
    pub avg_ops: f64,
    pub avg_woba: f64,
    pub avg_era: f64,
    pub runs_per_game: f64,
    pub team_count: u32,
    pub is_power: bool,
    pub data_source: String,
    pub computed_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Result envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeSummary {
    pub total_players: usize,
    pub qualified_batters: usize,
    pub qualified_pitchers: usize,
    pub venues: usize,
    pub conferences: usize,
}

/// Everything a single pipeline run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeResult {
    pub batting: Vec<BattingAdvancedRow>,
    pub pitching: Vec<PitchingAdvancedRow>,
    pub park_factors: Vec<ParkFactorRow>,
    pub conference_strength: Vec<ConferenceStrengthRow>,
    pub league: LeagueContext,
    pub summary: ComputeSummary,
}
