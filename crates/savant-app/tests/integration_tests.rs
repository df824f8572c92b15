// Integration tests for the seed driver.
//
// Each test writes a small season snapshot to a temporary directory, runs the
// driver end-to-end, and checks what landed in SQLite and on disk.

use std::path::{Path, PathBuf};

use savant_app::run;
use savant_core::config::{parse_config, Config, DataPaths, DatabaseConfig, PipelineConfig};
use savant_core::db::Store;

// ===========================================================================
// Test helpers
// ===========================================================================

const PLAYERS_CSV: &str = "\
player_id,player_name,team,season,games_bat,ab,r,h,doubles,triples,hr,rbi,bb,hbp,so,sf,sb,games_pitch,ip_thirds,h_allowed,r_allowed,er,bb_allowed,hbp_allowed,so_pitch,hr_allowed,batters_faced
tx-1,Jace Hollis,Texas,2025,32,100,24,30,5,1,4,21,15,1,20,2,4,0,0,0,0,0,0,0,0,0,
tx-2,Reid Calder,Texas,2025,9,12,2,3,1,0,0,1,2,0,4,0,0,0,0,0,0,0,0,0,0,0,
tx-3,Owen Pratt,Texas,2025,0,0,0,0,0,0,0,0,0,0,0,0,0,14,121,98,40,35,30,4,110,8,520
lsu-1,Cole Wren,LSU,2025,28,90,15,24,6,0,3,17,10,2,25,1,1,0,0,0,0,0,0,0,0,0,
lsu-2,Eli Marsh,LSU,2025,0,0,0,0,0,0,0,0,0,0,0,0,0,3,12,14,12,12,9,1,2,3,
ind-1,Tate Rowe,Independent Tech,2025,20,70,9,18,2,1,1,8,6,0,15,0,2,0,0,0,0,0,0,0,0,0,
bad-1,Bad Row,Texas,2025,10,-5,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
";

const TEAMS_CSV: &str = "\
team,conference,stadium
Texas,SEC,UFCU Disch-Falk Field
LSU,SEC,Alex Box Stadium
Rice,American,
";

/// Fresh scratch directory under the system temp dir.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("savant-app-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_inputs(dir: &Path) -> (PathBuf, PathBuf) {
    let players = dir.join("players.csv");
    let teams = dir.join("teams.csv");
    std::fs::write(&players, PLAYERS_CSV).unwrap();
    std::fs::write(&teams, TEAMS_CSV).unwrap();
    (players, teams)
}

fn config_for(dir: &Path, json: bool) -> Config {
    let (players, teams) = write_inputs(dir);
    Config {
        season: 2025,
        pipeline: PipelineConfig::default(),
        data_paths: DataPaths {
            players: players.display().to_string(),
            teams: teams.display().to_string(),
            json_output: json.then(|| dir.join("out").join("savant.json").display().to_string()),
        },
        database: DatabaseConfig {
            path: dir.join("savant.db").display().to_string(),
            retry_attempts: 2,
            retry_backoff_ms: 0,
        },
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[test]
fn run_persists_all_tables() {
    let dir = scratch_dir("persist");
    let config = config_for(&dir, false);

    let report = run(&config).unwrap();
    // bad-1 is dropped at ingest.
    assert_eq!(report.summary.total_players, 6);
    assert_eq!(report.summary.qualified_batters, 3);
    assert_eq!(report.summary.qualified_pitchers, 1);
    assert_eq!(report.writes.batting, 3);
    assert_eq!(report.writes.pitching, 1);
    assert_eq!(report.unmapped_teams, vec!["Independent Tech".to_string()]);
    assert_eq!(report.json_output, None);

    let store = Store::open(&config.database.path).unwrap();
    assert_eq!(store.count_rows("batting_advanced", 2025).unwrap(), 3);
    assert_eq!(store.count_rows("pitching_advanced", 2025).unwrap(), 1);
    assert_eq!(store.count_rows("park_factors", 2025).unwrap(), 3);
    assert_eq!(store.count_rows("conference_strength", 2025).unwrap(), 1);
    assert_eq!(store.count_rows("league_context", 2025).unwrap(), 1);

    let batting = store.load_batting(2025).unwrap();
    let hollis = batting.iter().find(|r| r.player_id == "tx-1").unwrap();
    assert_eq!(hollis.avg, 0.3);
    assert_eq!(hollis.conference.as_deref(), Some("SEC"));
    let rowe = batting.iter().find(|r| r.player_id == "ind-1").unwrap();
    assert_eq!(rowe.conference, None);

    let league = store.load_league_context(2025).unwrap().unwrap();
    assert!((3.0..=5.0).contains(&league.fip_constant));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn rerun_replaces_rows_instead_of_duplicating() {
    let dir = scratch_dir("rerun");
    let config = config_for(&dir, false);

    run(&config).unwrap();
    let second = run(&config).unwrap();
    assert_eq!(second.writes.batting, 3);

    let store = Store::open(&config.database.path).unwrap();
    assert_eq!(store.count_rows("batting_advanced", 2025).unwrap(), 3);
    assert_eq!(store.count_rows("conference_strength", 2025).unwrap(), 1);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn run_writes_json_when_configured() {
    let dir = scratch_dir("json");
    let config = config_for(&dir, true);

    let report = run(&config).unwrap();
    let path = report.json_output.expect("json path reported");
    let text = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["batting"].as_array().unwrap().len(), 3);
    assert_eq!(value["summary"]["venues"], 3);
    assert!(value["league"]["woba_scale"].as_f64().is_some());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_player_file_is_an_error() {
    let dir = scratch_dir("missing");
    let mut config = config_for(&dir, false);
    config.data_paths.players = dir.join("nope.csv").display().to_string();

    let err = run(&config).unwrap_err();
    assert!(format!("{err:#}").contains("failed to load player rows"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn config_file_drives_thresholds() {
    let dir = scratch_dir("toml");
    let (players, teams) = write_inputs(&dir);
    let text = format!(
        r#"
[run]
season = 2025

[pipeline]
min_pa = 100

[data_paths]
players = "{}"
teams = "{}"

[database]
path = "{}"
"#,
        players.display(),
        teams.display(),
        dir.join("savant.db").display()
    );
    let config = parse_config(&text, Path::new("inline.toml")).unwrap();
    let report = run(&config).unwrap();
    // Only tx-1 (118 PA) and lsu-1 (103 PA) clear 100.
    assert_eq!(report.summary.qualified_batters, 2);

    let _ = std::fs::remove_dir_all(&dir);
}
