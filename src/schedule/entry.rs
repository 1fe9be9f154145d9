//! Resolved schedule entries.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::registry::{CelestialObject, UtcOffset};

/// One capture event, expressed both in host and location terms.
///
/// Entries are computed on demand and dropped after a poll cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub object: CelestialObject,
    pub location_id: String,
    /// Date on the host wall clock.
    pub host_date: NaiveDate,
    /// Time on the host wall clock.
    #[serde(with = "hhmm")]
    pub host_time: NaiveTime,
    /// Date at the location.
    pub target_date: NaiveDate,
    /// Time at the location.
    #[serde(with = "hhmm")]
    pub target_time: NaiveTime,
}

impl ScheduleEntry {
    /// The instant this entry is due, on a host clock at `host_offset`.
    pub fn host_instant(&self, host_offset: UtcOffset) -> Option<DateTime<FixedOffset>> {
        host_offset
            .fixed()
            .from_local_datetime(&self.host_date.and_time(self.host_time))
            .single()
    }

    /// `HH:MM` on the host clock.
    pub fn host_time_label(&self) -> String {
        self.host_time.format("%H:%M").to_string()
    }

    /// `HH:MM` at the location.
    pub fn target_time_label(&self) -> String {
        self.target_time.format("%H:%M").to_string()
    }
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::registry::parse_time_of_day;

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let value = String::deserialize(deserializer)?;
        parse_time_of_day(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid HH:MM time '{value}'")))
    }
}
