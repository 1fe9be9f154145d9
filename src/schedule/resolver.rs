//! Conversion of a location's local capture time into host wall-clock time.
//!
//! The host date may differ from the location date by one day when the
//! offset difference pushes the time across midnight.

use chrono::{Duration, NaiveDate};

use super::entry::ScheduleEntry;
use crate::error::Result;
use crate::registry::{CelestialObject, Location, UtcOffset};

/// Resolve the capture of `object` at `location` on `local_date` into host
/// date and time.
///
/// Pure: identical inputs always produce identical entries.
///
/// # Errors
///
/// Returns a configuration error when the location offset or capture time
/// is malformed.
pub fn resolve(
    location: &Location,
    object: CelestialObject,
    local_date: NaiveDate,
    host_offset: UtcOffset,
) -> Result<ScheduleEntry> {
    let location_offset = location.utc_offset()?;
    let target_time = location.capture_time(object)?;

    let diff_hours = i64::from(host_offset.hours() - location_offset.hours());
    let host = local_date.and_time(target_time) + Duration::hours(diff_hours);

    Ok(ScheduleEntry {
        object,
        location_id: location.id.clone(),
        host_date: host.date(),
        host_time: host.time(),
        target_date: local_date,
        target_time,
    })
}

/// Resolve every object for one local date.
pub fn resolve_day(
    location: &Location,
    local_date: NaiveDate,
    host_offset: UtcOffset,
) -> Result<Vec<ScheduleEntry>> {
    CelestialObject::ALL
        .iter()
        .map(|&object| resolve(location, object, local_date, host_offset))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Camera, CameraDirection};
    use chrono::{NaiveTime, Timelike};
    use proptest::prelude::*;

    fn location(offset: &str, sun: &str, moon: &str) -> Location {
        Location {
            id: "test".to_string(),
            name: "Test".to_string(),
            timezone: "Etc/Test".to_string(),
            offset: offset.to_string(),
            country: String::new(),
            state: String::new(),
            city: String::new(),
            sun_time: sun.to_string(),
            moon_time: moon.to_string(),
            cameras: vec![Camera::new(CameraDirection::North, "https://cam")],
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn host() -> UtcOffset {
        UtcOffset::parse("UTC-4").unwrap()
    }

    #[test]
    fn test_same_day_conversion() {
        let phoenix = location("UTC-7", "15:30", "21:00");
        let entry = resolve(&phoenix, CelestialObject::Sun, date(2026, 2, 1), host()).unwrap();

        assert_eq!(entry.host_date, date(2026, 2, 1));
        assert_eq!(entry.host_time, time(18, 30));
        assert_eq!(entry.target_date, date(2026, 2, 1));
        assert_eq!(entry.target_time, time(15, 30));
    }

    #[test]
    fn test_rolls_forward_past_midnight() {
        let phoenix = location("UTC-7", "15:30", "21:00");
        let entry = resolve(&phoenix, CelestialObject::Moon, date(2026, 2, 1), host()).unwrap();

        assert_eq!(entry.host_date, date(2026, 2, 2));
        assert_eq!(entry.host_time, time(0, 0));
        assert_eq!(entry.target_date, date(2026, 2, 1));
    }

    #[test]
    fn test_rolls_back_before_midnight() {
        let tokyo = location("UTC+9", "10:00", "02:00");
        let entry = resolve(&tokyo, CelestialObject::Sun, date(2026, 2, 9), host()).unwrap();

        assert_eq!(entry.host_date, date(2026, 2, 8));
        assert_eq!(entry.host_time, time(21, 0));
    }

    #[test]
    fn test_rolls_across_year_end() {
        let kiribati = location("UTC+14", "06:00", "20:00");
        let entry = resolve(&kiribati, CelestialObject::Sun, date(2026, 1, 1), host()).unwrap();

        assert_eq!(entry.host_date, date(2025, 12, 31));
        assert_eq!(entry.host_time, time(12, 0));
    }

    #[test]
    fn test_malformed_offset_fails_fast() {
        let broken = location("GMT-7", "15:30", "21:00");
        let err = resolve(&broken, CelestialObject::Sun, date(2026, 2, 1), host()).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_malformed_time_fails_fast() {
        let broken = location("UTC-7", "3pm", "21:00");
        let err = resolve(&broken, CelestialObject::Sun, date(2026, 2, 1), host()).unwrap_err();
        assert!(err.is_config());
        // The other object is unaffected.
        assert!(resolve(&broken, CelestialObject::Moon, date(2026, 2, 1), host()).is_ok());
    }

    #[test]
    fn test_resolve_day_returns_both_objects() {
        let phoenix = location("UTC-7", "16:00", "21:00");
        let entries = resolve_day(&phoenix, date(2026, 2, 1), host()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].object, CelestialObject::Sun);
        assert_eq!(entries[0].host_time, time(19, 0));
        assert_eq!(entries[1].object, CelestialObject::Moon);
        assert_eq!(entries[1].host_time, time(0, 0));
    }

    proptest! {
        #[test]
        fn host_time_is_local_time_shifted_mod_24h(
            location_hours in -12i32..=14,
            host_hours in -12i32..=14,
            hour in 0u32..24,
            minute in 0u32..60,
            day in 1u32..=28,
        ) {
            let label = UtcOffset::from_hours(location_hours).unwrap().to_string();
            let sun = format!("{hour:02}:{minute:02}");
            let place = location(&label, &sun, "00:00");
            let host_offset = UtcOffset::from_hours(host_hours).unwrap();
            let local = date(2026, 3, day);

            let entry = resolve(&place, CelestialObject::Sun, local, host_offset).unwrap();

            let shifted = i64::from(hour) * 60 + i64::from(minute)
                + i64::from(host_hours - location_hours) * 60;
            let expected_minutes = shifted.rem_euclid(24 * 60);
            let expected_day_shift = shifted.div_euclid(24 * 60);

            let actual_minutes = i64::from(entry.host_time.hour() * 60 + entry.host_time.minute());
            prop_assert_eq!(actual_minutes, expected_minutes);
            prop_assert_eq!((entry.host_date - local).num_days(), expected_day_shift);

            let again = resolve(&place, CelestialObject::Sun, local, host_offset).unwrap();
            prop_assert_eq!(entry, again);
        }
    }
}
