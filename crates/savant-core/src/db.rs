// SQLite persistence for computed advanced-stat tables.

use std::sync::{Mutex, MutexGuard};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Transaction};

use crate::types::{
    BattingAdvancedRow, ComputeResult, ConferenceStrengthRow, LeagueContext, ParkFactorRow,
    PitchingAdvancedRow,
};

/// Tables written by `Store::upsert_result`.
pub const TABLES: &[&str] = &[
    "batting_advanced",
    "pitching_advanced",
    "park_factors",
    "conference_strength",
    "league_context",
];

/// Number of rows written per table by one upsert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteCounts {
    pub batting: usize,
    pub pitching: usize,
    pub park_factors: usize,
    pub conference_strength: usize,
}

impl WriteCounts {
    pub fn total(&self) -> usize {
        self.batting + self.pitching + self.park_factors + self.conference_strength
    }
}

/// SQLite-backed store. Every table is keyed so that re-running a season
/// replaces the previous values (last write wins).
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) a database at `path` and ensure all tables exist.
    /// Pass `":memory:"` for an ephemeral database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS batting_advanced (
                player_id   TEXT NOT NULL,
                player_name TEXT NOT NULL,
                team        TEXT NOT NULL,
                conference  TEXT,
                season      INTEGER NOT NULL,
                g           INTEGER NOT NULL,
                pa          INTEGER NOT NULL,
                ab          INTEGER NOT NULL,
                r           INTEGER NOT NULL,
                hr          INTEGER NOT NULL,
                avg         REAL NOT NULL,
                obp         REAL NOT NULL,
                slg         REAL NOT NULL,
                ops         REAL NOT NULL,
                iso         REAL NOT NULL,
                babip       REAL NOT NULL,
                woba        REAL NOT NULL,
                wrc_plus    REAL NOT NULL,
                ops_plus    REAL NOT NULL,
                k_pct       REAL NOT NULL,
                bb_pct      REAL NOT NULL,
                e_ba        REAL NOT NULL,
                e_slg       REAL NOT NULL,
                e_woba      REAL NOT NULL,
                data_source TEXT NOT NULL,
                computed_at TEXT NOT NULL,
                PRIMARY KEY (player_id, season)
            );

            CREATE TABLE IF NOT EXISTS pitching_advanced (
                player_id     TEXT NOT NULL,
                player_name   TEXT NOT NULL,
                team          TEXT NOT NULL,
                conference    TEXT,
                season        INTEGER NOT NULL,
                g             INTEGER NOT NULL,
                ip            REAL NOT NULL,
                era           REAL NOT NULL,
                whip          REAL NOT NULL,
                fip           REAL NOT NULL,
                x_fip         REAL NOT NULL,
                era_minus     REAL NOT NULL,
                k_per_9       REAL NOT NULL,
                bb_per_9      REAL NOT NULL,
                hr_per_9      REAL NOT NULL,
                k_bb          REAL NOT NULL,
                k_pct         REAL NOT NULL,
                bb_pct        REAL NOT NULL,
                babip_against REAL NOT NULL,
                lob_pct       REAL NOT NULL,
                data_source   TEXT NOT NULL,
                computed_at   TEXT NOT NULL,
                PRIMARY KEY (player_id, season)
            );

            CREATE TABLE IF NOT EXISTS park_factors (
                team         TEXT NOT NULL,
                venue_name   TEXT,
                conference   TEXT,
                season       INTEGER NOT NULL,
                runs_factor  REAL NOT NULL,
                hits_factor  REAL NOT NULL,
                hr_factor    REAL NOT NULL,
                bb_factor    REAL NOT NULL,
                so_factor    REAL NOT NULL,
                sample_games INTEGER NOT NULL,
                methodology  TEXT NOT NULL,
                data_source  TEXT NOT NULL,
                computed_at  TEXT NOT NULL,
                PRIMARY KEY (team, season)
            );

            CREATE TABLE IF NOT EXISTS conference_strength (
                conference         TEXT NOT NULL,
                season             INTEGER NOT NULL,
                strength_index     REAL NOT NULL,
                inter_conf_win_pct REAL NOT NULL,
                rpi_avg            REAL NOT NULL,
                avg_ops            REAL NOT NULL,
                avg_woba           REAL NOT NULL,
                avg_era            REAL NOT NULL,
                runs_per_game      REAL NOT NULL,
                team_count         INTEGER NOT NULL,
                is_power           INTEGER NOT NULL,
                data_source        TEXT NOT NULL,
                computed_at        TEXT NOT NULL,
                PRIMARY KEY (conference, season)
            );

            CREATE TABLE IF NOT EXISTS league_context (
                season            INTEGER PRIMARY KEY,
                avg               REAL NOT NULL,
                obp               REAL NOT NULL,
                slg               REAL NOT NULL,
                woba              REAL NOT NULL,
                era               REAL NOT NULL,
                runs_per_pa       REAL NOT NULL,
                fip_constant      REAL NOT NULL,
                woba_scale        REAL NOT NULL,
                hr_per_fly_ball   REAL NOT NULL,
                batters           INTEGER NOT NULL,
                pitchers          INTEGER NOT NULL,
                plate_appearances INTEGER NOT NULL,
                innings_pitched   REAL NOT NULL
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Write every row of a pipeline result in one transaction.
    pub fn upsert_result(&self, result: &ComputeResult) -> Result<WriteCounts> {
        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .context("failed to begin upsert transaction")?;

        for row in &result.batting {
            upsert_batting(&tx, row)?;
        }
        for row in &result.pitching {
            upsert_pitching(&tx, row)?;
        }
        for row in &result.park_factors {
            upsert_park_factor(&tx, row)?;
        }
        for row in &result.conference_strength {
            upsert_conference(&tx, row)?;
        }
        upsert_league(&tx, &result.league)?;

        tx.commit().context("failed to commit upsert transaction")?;

        Ok(WriteCounts {
            batting: result.batting.len(),
            pitching: result.pitching.len(),
            park_factors: result.park_factors.len(),
            conference_strength: result.conference_strength.len(),
        })
    }

    /// Row count for one season of a known table.
    pub fn count_rows(&self, table: &str, season: u16) -> Result<usize> {
        if !TABLES.contains(&table) {
            bail!("unknown table `{table}`");
        }
        let conn = self.conn();
        let sql = format!("SELECT COUNT(*) FROM {table} WHERE season = ?1");
        let n: i64 = conn
            .query_row(&sql, params![season], |row| row.get(0))
            .with_context(|| format!("failed to count rows in {table}"))?;
        Ok(n as usize)
    }

    /// Load one season of batting rows, ordered by player id.
    pub fn load_batting(&self, season: u16) -> Result<Vec<BattingAdvancedRow>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT player_id, player_name, team, conference, season, g, pa, ab, r, hr,
                        avg, obp, slg, ops, iso, babip, woba, wrc_plus, ops_plus, k_pct, bb_pct,
                        e_ba, e_slg, e_woba, data_source, computed_at
                 FROM batting_advanced WHERE season = ?1 ORDER BY player_id",
            )
            .context("failed to prepare load_batting query")?;

        let rows = stmt
            .query_map(params![season], |row| {
                Ok(BattingAdvancedRow {
                    player_id: row.get(0)?,
                    player_name: row.get(1)?,
                    team: row.get(2)?,
                    conference: row.get(3)?,
                    season: row.get(4)?,
                    g: row.get(5)?,
                    pa: row.get(6)?,
                    ab: row.get(7)?,
                    r: row.get(8)?,
                    hr: row.get(9)?,
                    avg: row.get(10)?,
                    obp: row.get(11)?,
                    slg: row.get(12)?,
                    ops: row.get(13)?,
                    iso: row.get(14)?,
                    babip: row.get(15)?,
                    woba: row.get(16)?,
                    wrc_plus: row.get(17)?,
                    ops_plus: row.get(18)?,
                    k_pct: row.get(19)?,
                    bb_pct: row.get(20)?,
                    e_ba: row.get(21)?,
                    e_slg: row.get(22)?,
                    e_woba: row.get(23)?,
                    data_source: row.get(24)?,
                    computed_at: timestamp_column(row, 25)?,
                })
            })
            .context("failed to query batting rows")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map batting rows")?;

        Ok(rows)
    }

    /// Load one season of conference strength rows, ordered by conference.
    pub fn load_conference_strength(&self, season: u16) -> Result<Vec<ConferenceStrengthRow>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT conference, season, strength_index, inter_conf_win_pct, rpi_avg, avg_ops,
                        avg_woba, avg_era, runs_per_game, team_count, is_power, data_source,
                        computed_at
                 FROM conference_strength WHERE season = ?1 ORDER BY conference",
            )
            .context("failed to prepare load_conference_strength query")?;

        let rows = stmt
            .query_map(params![season], |row| {
                Ok(ConferenceStrengthRow {
                    conference: row.get(0)?,
                    season: row.get(1)?,
                    strength_index: row.get(2)?,
                    inter_conf_win_pct: row.get(3)?,
                    rpi_avg: row.get(4)?,
                    avg_ops: row.get(5)?,
                    avg_woba: row.get(6)?,
                    avg_era: row.get(7)?,
                    runs_per_game: row.get(8)?,
                    team_count: row.get(9)?,
                    is_power: row.get(10)?,
                    data_source: row.get(11)?,
                    computed_at: timestamp_column(row, 12)?,
                })
            })
            .context("failed to query conference strength rows")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map conference strength rows")?;

        Ok(rows)
    }

    /// Load the stored league context for a season, if any.
    pub fn load_league_context(&self, season: u16) -> Result<Option<LeagueContext>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT season, avg, obp, slg, woba, era, runs_per_pa, fip_constant, woba_scale,
                        hr_per_fly_ball, batters, pitchers, plate_appearances, innings_pitched
                 FROM league_context WHERE season = ?1",
            )
            .context("failed to prepare load_league_context query")?;

        let mut rows = stmt
            .query_map(params![season], |row| {
                Ok(LeagueContext {
                    season: row.get(0)?,
                    avg: row.get(1)?,
                    obp: row.get(2)?,
                    slg: row.get(3)?,
                    woba: row.get(4)?,
                    era: row.get(5)?,
                    runs_per_pa: row.get(6)?,
                    fip_constant: row.get(7)?,
                    woba_scale: row.get(8)?,
                    hr_per_fly_ball: row.get(9)?,
                    batters: row.get(10)?,
                    pitchers: row.get(11)?,
                    plate_appearances: row.get(12)?,
                    innings_pitched: row.get(13)?,
                })
            })
            .context("failed to query league context")?;

        match rows.next() {
            Some(row) => Ok(Some(row.context("failed to read league context row")?)),
            None => Ok(None),
        }
    }
}

// ---------------------------------------------------------------------------
// Row writers
// ---------------------------------------------------------------------------

fn upsert_batting(tx: &Transaction<'_>, row: &BattingAdvancedRow) -> Result<()> {
    tx.execute(
        "INSERT OR REPLACE INTO batting_advanced
            (player_id, player_name, team, conference, season, g, pa, ab, r, hr,
             avg, obp, slg, ops, iso, babip, woba, wrc_plus, ops_plus, k_pct, bb_pct,
             e_ba, e_slg, e_woba, data_source, computed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                 ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26)",
        params![
            row.player_id,
            row.player_name,
            row.team,
            row.conference,
            row.season,
            row.g,
            row.pa,
            row.ab,
            row.r,
            row.hr,
            row.avg,
            row.obp,
            row.slg,
            row.ops,
            row.iso,
            row.babip,
            row.woba,
            row.wrc_plus,
            row.ops_plus,
            row.k_pct,
            row.bb_pct,
            row.e_ba,
            row.e_slg,
            row.e_woba,
            row.data_source,
            row.computed_at.to_rfc3339(),
        ],
    )
    .with_context(|| format!("failed to upsert batting row for {}", row.player_id))?;
    Ok(())
}

fn upsert_pitching(tx: &Transaction<'_>, row: &PitchingAdvancedRow) -> Result<()> {
    tx.execute(
        "INSERT OR REPLACE INTO pitching_advanced
            (player_id, player_name, team, conference, season, g, ip, era, whip, fip, x_fip,
             era_minus, k_per_9, bb_per_9, hr_per_9, k_bb, k_pct, bb_pct, babip_against,
             lob_pct, data_source, computed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                 ?17, ?18, ?19, ?20, ?21, ?22)",
        params![
            row.player_id,
            row.player_name,
            row.team,
            row.conference,
            row.season,
            row.g,
            row.ip,
            row.era,
            row.whip,
            row.fip,
            row.x_fip,
            row.era_minus,
            row.k_per_9,
            row.bb_per_9,
            row.hr_per_9,
            row.k_bb,
            row.k_pct,
            row.bb_pct,
            row.babip_against,
            row.lob_pct,
            row.data_source,
            row.computed_at.to_rfc3339(),
        ],
    )
    .with_context(|| format!("failed to upsert pitching row for {}", row.player_id))?;
    Ok(())
}

fn upsert_park_factor(tx: &Transaction<'_>, row: &ParkFactorRow) -> Result<()> {
    tx.execute(
        "INSERT OR REPLACE INTO park_factors
            (team, venue_name, conference, season, runs_factor, hits_factor, hr_factor,
             bb_factor, so_factor, sample_games, methodology, data_source, computed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            row.team,
            row.venue_name,
            row.conference,
            row.season,
            row.runs_factor,
            row.hits_factor,
            row.hr_factor,
            row.bb_factor,
            row.so_factor,
            row.sample_games,
            row.methodology,
            row.data_source,
            row.computed_at.to_rfc3339(),
        ],
    )
    .with_context(|| format!("failed to upsert park factor row for {}", row.team))?;
    Ok(())
}

fn upsert_conference(tx: &Transaction<'_>, row: &ConferenceStrengthRow) -> Result<()> {
    tx.execute(
        "INSERT OR REPLACE INTO conference_strength
            (conference, season, strength_index, inter_conf_win_pct, rpi_avg, avg_ops,
             avg_woba, avg_era, runs_per_game, team_count, is_power, data_source, computed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            row.conference,
            row.season,
            row.strength_index,
            row.inter_conf_win_pct,
            row.rpi_avg,
            row.avg_ops,
            row.avg_woba,
            row.avg_era,
            row.runs_per_game,
            row.team_count,
            row.is_power,
            row.data_source,
            row.computed_at.to_rfc3339(),
        ],
    )
    .with_context(|| format!("failed to upsert conference row for {}", row.conference))?;
    Ok(())
}

fn upsert_league(tx: &Transaction<'_>, ctx: &LeagueContext) -> Result<()> {
    tx.execute(
        "INSERT OR REPLACE INTO league_context
            (season, avg, obp, slg, woba, era, runs_per_pa, fip_constant, woba_scale,
             hr_per_fly_ball, batters, pitchers, plate_appearances, innings_pitched)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            ctx.season,
            ctx.avg,
            ctx.obp,
            ctx.slg,
            ctx.woba,
            ctx.era,
            ctx.runs_per_pa,
            ctx.fip_constant,
            ctx.woba_scale,
            ctx.hr_per_fly_ball,
            ctx.batters,
            ctx.pitchers,
            ctx.plate_appearances,
            ctx.innings_pitched,
        ],
    )
    .context("failed to upsert league context")?;
    Ok(())
}

fn timestamp_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
