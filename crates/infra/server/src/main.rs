//! Day Planner API server binary.
//!
//! Usage: `dayplanner-server [CONFIG_PATH]`

use dayplanner_server::config::{AppConfig, CONFIG_ENV, resolve_path};
use dayplanner_server::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (path, explicit) = resolve_path(std::env::args().nth(1), std::env::var(CONFIG_ENV).ok());
    let mut config = AppConfig::from_file(&path, explicit)?;
    let rejected = config.apply_env();

    init_tracing(&config.server);

    for override_error in &rejected {
        tracing::warn!(error = %override_error, "Ignoring invalid environment override");
    }
    tracing::info!(config = %path.display(), "Configuration loaded");

    dayplanner_server::run(config).await?;
    Ok(())
}
