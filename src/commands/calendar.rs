//! iCalendar export of upcoming captures.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use analemma::export::render_ics;
use analemma::schedule::schedule_range;

use super::App;

/// Write an `.ics` with every location's entries.
pub async fn execute(app: &App, from: Option<NaiveDate>, days: u32, output: &Path) -> Result<()> {
    let from = from.unwrap_or_else(|| app.host_today());
    let source = app.schedule_source();

    let mut entries = Vec::new();
    for location in app.registry.locations() {
        entries.extend(schedule_range(&source, location, from, days).await?);
    }
    entries.sort_by_key(|entry| (entry.host_date, entry.host_time));

    let ics = render_ics(&entries, &app.settings.host_timezone, "Analemma captures");
    tokio::fs::write(output, ics)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Wrote {} event(s) to {}", entries.len(), output.display());
    Ok(())
}
