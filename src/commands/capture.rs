//! Immediate capture, for checking that cameras still work.

use anyhow::{Context, Result};
use tracing::info;

use analemma::registry::CelestialObject;

use super::App;

/// Capture every camera of `location` now.
pub async fn execute(app: &App, location: &str, object: CelestialObject) -> Result<()> {
    let location = app.registry.get(location)?;
    let orchestrator = app.orchestrator()?;

    info!(location = %location.id, object = %object, "Immediate capture");
    let files = orchestrator
        .capture_location(location, object)
        .await
        .with_context(|| format!("Capture failed for '{}'", location.id))?;

    println!("Captured {} file(s):", files.len());
    for file in &files {
        println!("  {}", file.display());
    }
    Ok(())
}
