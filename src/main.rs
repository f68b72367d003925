// Courtside entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr, env-filtered)
// 2. Load config
// 3. Build the court region model (fatal on invalid geometry constants)
// 4. Load the tracking / event / possession feeds
// 5. Run the analysis pipeline
// 6. Write the JSON report

use std::path::Path;

use anyhow::Context;
use tracing::info;

use court_analysis::analysis;
use court_analysis::config;
use court_analysis::court::CourtRegions;
use court_analysis::io::{events, possessions, tracking};

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("courtside starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: bin size {} ft, {} game filter entries",
        config.analysis.density_bin_size,
        config.analysis.games.len()
    );

    // 3. Region model; any failure here is a geometry-constant bug.
    let regions = CourtRegions::build().context("failed to build court regions")?;
    info!("Court region model built");

    // 4. Load feeds
    let games = &config.analysis.games;
    let tracking_rows = tracking::load_tracking(Path::new(&config.data.tracking), games)
        .context("failed to load tracking data")?;
    let event_rows = events::load_events(Path::new(&config.data.events), games)
        .context("failed to load event data")?;
    let possession_rows = possessions::load_possessions(Path::new(&config.data.possessions), games)
        .context("failed to load possession data")?;
    info!(
        "Loaded {} tracking rows, {} events, {} possessions",
        tracking_rows.len(),
        event_rows.len(),
        possession_rows.len()
    );

    // 5. Run the pipeline
    let report = analysis::run(
        &config,
        &regions,
        &tracking_rows,
        &event_rows,
        &possession_rows,
    );
    info!(
        "Analyzed {} shots across {} games ({} unclassified)",
        report.shots.len(),
        report.games.len(),
        report.unclassified_shots
    );

    // 6. Write the report
    let out_path = Path::new(&config.output.report);
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
    std::fs::write(out_path, json)
        .with_context(|| format!("failed to write report to {}", out_path.display()))?;
    info!("Report written to {}", out_path.display());

    Ok(())
}

/// Initialize tracing to stderr with RUST_LOG-style filtering.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("court_analysis=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
