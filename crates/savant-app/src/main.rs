// Savant seed entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file)
// 2. Load config (copying defaults on first run)
// 3. Run the pipeline and persist the tables
// 4. Print a one-line summary

use anyhow::Context;
use tracing::{error, info};

use savant_core::config;

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("Savant compute starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: season {}, players {}, teams {}, database {}",
        config.season, config.data_paths.players, config.data_paths.teams, config.database.path
    );

    // 3. Run
    let report = match savant_app::run(&config) {
        Ok(report) => report,
        Err(e) => {
            error!("Run failed: {:#}", e);
            return Err(e);
        }
    };

    // 4. Summary
    let s = &report.summary;
    println!(
        "season {}: {} players, {} batters, {} pitchers, {} venues, {} conferences; {} rows written",
        report.season,
        s.total_players,
        s.qualified_batters,
        s.qualified_pitchers,
        s.venues,
        s.conferences,
        report.writes.total()
    );
    if !report.unmapped_teams.is_empty() {
        println!(
            "warning: {} teams missing from the team map",
            report.unmapped_teams.len()
        );
    }
    if let Some(path) = &report.json_output {
        println!("JSON written to {}", path.display());
    }

    info!("Savant compute finished");
    Ok(())
}

/// Initialize tracing to write to `logs/savant.log`.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("savant.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("savant=info,savant_app=info,savant_baseball=info,savant_core=info,warn")
        }))
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
