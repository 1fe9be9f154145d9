//! iCalendar export of resolved schedule entries.
//!
//! Produces one `VEVENT` per entry, in the host timezone, so the operator can
//! see upcoming captures in a calendar app.

use chrono::{Duration, NaiveDateTime};

use crate::constants::CALENDAR_EVENT_MINUTES;
use crate::registry::CelestialObject;
use crate::schedule::ScheduleEntry;

const PRODUCT_ID: &str = "-//Analemma Sky Photographer//EN";

/// Fixed stamp so re-exports of the same schedule are byte-identical.
const DTSTAMP: &str = "20260101T000000Z";

/// Render `entries` as an iCalendar document with CRLF line endings.
pub fn render_ics(entries: &[ScheduleEntry], host_timezone: &str, calendar_name: &str) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{PRODUCT_ID}"),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:PUBLISH".to_string(),
        format!("X-WR-CALNAME:{}", escape(calendar_name)),
        format!("X-WR-TIMEZONE:{host_timezone}"),
    ];

    for entry in entries {
        let start = entry.host_date.and_time(entry.host_time);
        let end = start + Duration::minutes(CALENDAR_EVENT_MINUTES);
        let (summary, category) = match entry.object {
            CelestialObject::Sun => ("Sun capture", "Solar"),
            CelestialObject::Moon => ("Moon capture", "Lunar"),
        };

        lines.extend([
            "BEGIN:VEVENT".to_string(),
            format!("UID:{}", uid(entry)),
            format!("DTSTAMP:{DTSTAMP}"),
            format!("DTSTART;TZID={host_timezone}:{}", stamp(start)),
            format!("DTEND;TZID={host_timezone}:{}", stamp(end)),
            format!("SUMMARY:{}", escape(&format!("{summary} - {}", entry.location_id))),
            format!(
                "DESCRIPTION:{}",
                escape(&format!(
                    "Local time at {}: {} {}",
                    entry.location_id,
                    entry.target_date,
                    entry.target_time_label()
                ))
            ),
            format!("CATEGORIES:{category}"),
            "END:VEVENT".to_string(),
        ]);
    }

    lines.push("END:VCALENDAR".to_string());

    let mut out = lines.join("\r\n");
    out.push_str("\r\n");
    out
}

fn uid(entry: &ScheduleEntry) -> String {
    format!(
        "{}-{}-{}-{}@analemma",
        entry.host_date,
        entry.host_time.format("%H%M"),
        entry.location_id,
        entry.object
    )
}

fn stamp(at: NaiveDateTime) -> String {
    at.format("%Y%m%dT%H%M%S").to_string()
}

/// Escape TEXT values per RFC 5545.
fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn entry(object: CelestialObject, date: (u32, u32), time: (u32, u32)) -> ScheduleEntry {
        ScheduleEntry {
            object,
            location_id: "usa-arizona-phoenix".to_string(),
            host_date: NaiveDate::from_ymd_opt(2026, date.0, date.1).unwrap(),
            host_time: NaiveTime::from_hms_opt(time.0, time.1, 0).unwrap(),
            target_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            target_time: NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_event_fields() {
        let ics = render_ics(
            &[entry(CelestialObject::Moon, (2, 2), (0, 0))],
            "America/La_Paz",
            "Analemma captures",
        );

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert!(ics.contains("UID:2026-02-02-0000-usa-arizona-phoenix-moon@analemma\r\n"));
        assert!(ics.contains("DTSTART;TZID=America/La_Paz:20260202T000000\r\n"));
        assert!(ics.contains("DTEND;TZID=America/La_Paz:20260202T000500\r\n"));
        assert!(ics.contains("SUMMARY:Moon capture - usa-arizona-phoenix\r\n"));
        assert!(ics.contains("CATEGORIES:Lunar\r\n"));
        assert!(ics.contains("2026-02-01 21:00"));
    }

    #[test]
    fn test_event_end_rolls_over_midnight() {
        let ics = render_ics(
            &[entry(CelestialObject::Sun, (3, 31), (23, 58))],
            "America/La_Paz",
            "Analemma captures",
        );
        assert!(ics.contains("DTEND;TZID=America/La_Paz:20260401T000300\r\n"));
    }

    #[test]
    fn test_escapes_text() {
        assert_eq!(escape("a,b;c\\d"), "a\\,b\\;c\\\\d");
    }
}
