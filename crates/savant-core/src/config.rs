// Configuration loading and parsing (config/savant.toml).
//
// `PipelineConfig` is also usable on its own: every field has a default, so
// the pure pipeline can run without any file on disk.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Pipeline constants
// ---------------------------------------------------------------------------

pub const DEFAULT_MIN_PA: u32 = 20;
pub const DEFAULT_MIN_IP: f64 = 5.0;
pub const DEFAULT_DATA_SOURCE: &str = "ncaa-box-scores";

/// Linear weights for wOBA. Defaults are the standard MLB table; college
/// run environments differ but no college-specific table exists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WobaWeights {
    pub bb: f64,
    pub hbp: f64,
    pub single: f64,
    pub double: f64,
    pub triple: f64,
    pub hr: f64,
}

impl Default for WobaWeights {
    fn default() -> Self {
        WobaWeights {
            bb: 0.69,
            hbp: 0.72,
            single: 0.89,
            double: 1.27,
            triple: 1.62,
            hr: 2.10,
        }
    }
}

/// Thresholds, weight tables, and regression knobs read by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum plate appearances for a batter to be published or counted
    /// toward league baselines.
    pub min_pa: u32,
    /// Minimum innings pitched (decimal) for a pitcher.
    pub min_ip: f64,
    pub woba_weights: WobaWeights,
    /// League-mean BABIP that estimated stats regress toward.
    pub league_babip: f64,
    /// Fraction of a player's BABIP replaced by the league mean.
    pub babip_regression: f64,
    /// Inter-conference win% fed to the strength composite until real
    /// inter-conference records are available.
    pub placeholder_win_pct: f64,
    pub placeholder_rpi: f64,
    /// Share of non-K/BB/HBP plate appearances assumed to be fly balls.
    pub fly_ball_rate: f64,
    pub default_hr_per_fly_ball: f64,
    /// Home games required before a measured park factor is trusted.
    pub min_park_home_games: u32,
    pub power_conferences: Vec<String>,
    pub data_source: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            min_pa: DEFAULT_MIN_PA,
            min_ip: DEFAULT_MIN_IP,
            woba_weights: WobaWeights::default(),
            league_babip: 0.300,
            babip_regression: 0.40,
            placeholder_win_pct: 0.50,
            placeholder_rpi: 0.50,
            fly_ball_rate: 0.35,
            default_hr_per_fly_ball: 0.10,
            min_park_home_games: 20,
            power_conferences: ["SEC", "ACC", "Big 12", "Big Ten", "Pac-12"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            data_source: DEFAULT_DATA_SOURCE.to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn is_power_conference(&self, conference: &str) -> bool {
        self.power_conferences.iter().any(|c| c == conference)
    }
}

// ---------------------------------------------------------------------------
// Driver config (savant.toml)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub season: u16,
    pub pipeline: PipelineConfig,
    pub data_paths: DataPaths,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct SavantFile {
    run: RunSection,
    #[serde(default)]
    pipeline: PipelineConfig,
    data_paths: DataPaths,
    database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct RunSection {
    season: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub players: String,
    pub teams: String,
    /// Where to write the full result as JSON. Skipped when absent.
    #[serde(default)]
    pub json_output: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    250
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/savant.toml` relative to `base_dir`.
///
/// Does not copy defaults; see `load_config()`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join("savant.toml");
    let text = read_file(&path)?;
    parse_config(&text, &path)
}

/// Parse config text. `path` is only used for error messages.
pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let file: SavantFile = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = Config {
        season: file.run.season,
        pipeline: file.pipeline,
        data_paths: file.data_paths,
        database: file.database,
    };

    validate(&config)?;
    Ok(config)
}

/// Copy any file in `defaults/` that is missing from `config/`.
/// Returns the list of files that were copied.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if config_dir.exists() {
            return Ok(Vec::new());
        }
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither {} nor {} exists",
                defaults_dir.display(),
                config_dir.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create {}: {e}", config_dir.display()),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read {}: {e}", defaults_dir.display()),
    })?;

    let mut copied = Vec::new();
    for entry in entries.flatten() {
        let src = entry.path();
        if !src.is_file() {
            continue;
        }
        let Some(name) = src.file_name() else {
            continue;
        };
        let dest = config_dir.join(name);
        if dest.exists() {
            continue;
        }
        std::fs::copy(&src, &dest).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to copy {} -> {}: {e}", src.display(), dest.display()),
        })?;
        copied.push(dest);
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory,
/// copying defaults first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.season == 0 {
        return Err(invalid("run.season", "must be greater than 0"));
    }
    if config.database.retry_attempts == 0 {
        return Err(invalid("database.retry_attempts", "must be > 0"));
    }
    validate_pipeline(&config.pipeline)
}

/// Validate pipeline knobs. Exposed so callers building a `PipelineConfig`
/// by hand get the same checks as the file loader.
pub fn validate_pipeline(p: &PipelineConfig) -> Result<(), ConfigError> {
    if p.min_pa == 0 {
        return Err(invalid("pipeline.min_pa", "must be > 0"));
    }
    if !p.min_ip.is_finite() || p.min_ip <= 0.0 {
        return Err(invalid(
            "pipeline.min_ip",
            format!("must be > 0, got {}", p.min_ip),
        ));
    }

    let w = &p.woba_weights;
    let weight_fields: &[(&str, f64)] = &[
        ("pipeline.woba_weights.bb", w.bb),
        ("pipeline.woba_weights.hbp", w.hbp),
        ("pipeline.woba_weights.single", w.single),
        ("pipeline.woba_weights.double", w.double),
        ("pipeline.woba_weights.triple", w.triple),
        ("pipeline.woba_weights.hr", w.hr),
    ];
    for (name, val) in weight_fields {
        if !val.is_finite() || *val <= 0.0 {
            return Err(invalid(name, format!("must be > 0, got {val}")));
        }
    }

    let unit_fields: &[(&str, f64)] = &[
        ("pipeline.babip_regression", p.babip_regression),
        ("pipeline.placeholder_win_pct", p.placeholder_win_pct),
        ("pipeline.placeholder_rpi", p.placeholder_rpi),
    ];
    for (name, val) in unit_fields {
        if !(0.0..=1.0).contains(val) {
            return Err(invalid(
                name,
                format!("must be between 0.0 and 1.0 inclusive, got {val}"),
            ));
        }
    }

    if !(p.league_babip > 0.0 && p.league_babip < 1.0) {
        return Err(invalid(
            "pipeline.league_babip",
            format!("must be strictly between 0 and 1, got {}", p.league_babip),
        ));
    }
    if !(p.fly_ball_rate > 0.0 && p.fly_ball_rate <= 1.0) {
        return Err(invalid(
            "pipeline.fly_ball_rate",
            format!("must be in (0, 1], got {}", p.fly_ball_rate),
        ));
    }
    if !p.default_hr_per_fly_ball.is_finite() || p.default_hr_per_fly_ball < 0.0 {
        return Err(invalid(
            "pipeline.default_hr_per_fly_ball",
            format!("must be >= 0, got {}", p.default_hr_per_fly_ball),
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
