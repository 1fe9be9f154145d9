//! One check-and-capture pass over every location.
//!
//! Exit status is success whenever the pass completes, whether or not any
//! location had something due or failed along the way.

use anyhow::Result;
use tracing::info;

use analemma::scheduler::Scheduler;

use super::App;

/// Execute the pass.
pub async fn execute(app: &App) -> Result<()> {
    info!(
        host_offset = %app.host_offset,
        host_timezone = %app.settings.host_timezone,
        locations = app.registry.len(),
        "Starting scheduler pass"
    );

    let scheduler = Scheduler::new(
        app.schedule_source(),
        app.orchestrator()?,
        app.clock.clone(),
        app.host_offset,
    )
    .with_window(app.settings.window()?);

    let report = scheduler
        .check_and_capture(app.registry.locations())
        .await;

    info!(
        files = report.files().len(),
        failed_locations = report.failed_locations().len(),
        failed_captures = report.failed_captures(),
        "Scheduler pass complete"
    );
    Ok(())
}
