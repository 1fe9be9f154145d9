//! Print resolved schedule entries.

use anyhow::Result;
use chrono::NaiveDate;

use analemma::schedule::schedule_range;

use super::App;

/// Print entries for `days` local dates from `from`.
pub async fn execute(
    app: &App,
    location: Option<&str>,
    from: Option<NaiveDate>,
    days: u32,
    json: bool,
) -> Result<()> {
    let from = from.unwrap_or_else(|| app.host_today());
    let source = app.schedule_source();

    let mut entries = Vec::new();
    for location in app.registry.select(location)? {
        entries.extend(schedule_range(&source, location, from, days).await?);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!(
        "{:<24} {:<5} {:<10} {:<5}   {:<10} {:<5}",
        "LOCATION", "OBJ", "HOST DATE", "TIME", "LOCAL DATE", "TIME"
    );
    for entry in &entries {
        println!(
            "{:<24} {:<5} {:<10} {:<5}   {:<10} {:<5}",
            entry.location_id,
            entry.object.as_str(),
            entry.host_date.to_string(),
            entry.host_time_label(),
            entry.target_date.to_string(),
            entry.target_time_label()
        );
    }
    Ok(())
}
