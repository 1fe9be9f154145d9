//! Where the scheduler gets its entries from.

use async_trait::async_trait;
use chrono::{Days, NaiveDate};

use super::entry::ScheduleEntry;
use super::resolver::resolve_day;
use crate::error::Result;
use crate::registry::{Location, UtcOffset};

/// Lookup of resolved entries for a location on one local date.
///
/// Implementations must be thread-safe; the scheduler queries locations
/// concurrently.
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Entries whose target date at the location is `local_date`.
    ///
    /// # Errors
    ///
    /// Returns an error when the location's data cannot be resolved.
    async fn schedule(&self, location: &Location, local_date: NaiveDate)
    -> Result<Vec<ScheduleEntry>>;
}

/// Resolves the fixed local times configured on each location.
#[derive(Debug, Clone, Copy)]
pub struct ConfigScheduleSource {
    host_offset: UtcOffset,
}

impl ConfigScheduleSource {
    pub fn new(host_offset: UtcOffset) -> Self {
        Self { host_offset }
    }

    pub fn host_offset(&self) -> UtcOffset {
        self.host_offset
    }
}

#[async_trait]
impl ScheduleSource for ConfigScheduleSource {
    async fn schedule(
        &self,
        location: &Location,
        local_date: NaiveDate,
    ) -> Result<Vec<ScheduleEntry>> {
        resolve_day(location, local_date, self.host_offset)
    }
}

/// Entries for `days` consecutive local dates starting at `from`, ordered by
/// host date and time.
pub async fn schedule_range<S: ScheduleSource + ?Sized>(
    source: &S,
    location: &Location,
    from: NaiveDate,
    days: u32,
) -> Result<Vec<ScheduleEntry>> {
    let mut entries = Vec::new();
    for offset in 0..u64::from(days) {
        let Some(date) = from.checked_add_days(Days::new(offset)) else {
            break;
        };
        entries.extend(source.schedule(location, date).await?);
    }
    entries.sort_by_key(|entry| (entry.host_date, entry.host_time));
    Ok(entries)
}
