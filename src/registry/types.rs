//! Location and camera records.
//!
//! Records are immutable after construction and live for the whole process.
//! Offsets and capture times are kept as the configured labels and parsed on
//! use, so a data-entry defect only disables the affected location.

use std::fmt;
use std::str::FromStr;

use chrono::{FixedOffset, NaiveTime, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Object being photographed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CelestialObject {
    Sun,
    Moon,
}

impl CelestialObject {
    /// Both objects, in capture-directory order.
    pub const ALL: [CelestialObject; 2] = [CelestialObject::Sun, CelestialObject::Moon];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sun => "sun",
            Self::Moon => "moon",
        }
    }
}

impl fmt::Display for CelestialObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CelestialObject {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sun" | "solar" => Ok(Self::Sun),
            "moon" | "lunar" => Ok(Self::Moon),
            other => Err(format!("unknown object '{other}': expected sun or moon")),
        }
    }
}

/// Compass direction a camera faces; also the capture subdirectory name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraDirection {
    North,
    South,
    East,
    West,
    Northeast,
    Northwest,
    Southeast,
    Southwest,
    /// Split-screen feed showing several views.
    Multiple,
}

impl CameraDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
            Self::Northeast => "northeast",
            Self::Northwest => "northwest",
            Self::Southeast => "southeast",
            Self::Southwest => "southwest",
            Self::Multiple => "multiple",
        }
    }
}

impl fmt::Display for CameraDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CameraDirection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let direction = match s.trim().to_ascii_lowercase().as_str() {
            "north" => Self::North,
            "south" => Self::South,
            "east" => Self::East,
            "west" => Self::West,
            "northeast" => Self::Northeast,
            "northwest" => Self::Northwest,
            "southeast" => Self::Southeast,
            "southwest" => Self::Southwest,
            "multiple" => Self::Multiple,
            other => return Err(format!("unknown camera direction '{other}'")),
        };
        Ok(direction)
    }
}

/// Signed whole-hour offset from UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtcOffset(i32);

impl UtcOffset {
    pub const UTC: UtcOffset = UtcOffset(0);

    /// Create an offset from whole hours (`-12..=14`).
    pub fn from_hours(hours: i32) -> Result<Self> {
        if (-12..=14).contains(&hours) {
            Ok(Self(hours))
        } else {
            Err(Error::invalid_offset(format!("UTC{hours:+}")))
        }
    }

    /// Parse a label such as `UTC-7`, `UTC+5` or `UTC`.
    pub fn parse(label: &str) -> Result<Self> {
        let trimmed = label.trim();
        let rest = trimmed
            .strip_prefix("UTC")
            .or_else(|| trimmed.strip_prefix("utc"))
            .ok_or_else(|| Error::invalid_offset(label))?;

        if rest.is_empty() {
            return Ok(Self::UTC);
        }

        let (sign, digits) = match rest.as_bytes()[0] {
            b'+' => (1, &rest[1..]),
            b'-' => (-1, &rest[1..]),
            _ => return Err(Error::invalid_offset(label)),
        };

        if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::invalid_offset(label));
        }

        let hours: i32 = digits.parse().map_err(|_| Error::invalid_offset(label))?;
        Self::from_hours(sign * hours).map_err(|_| Error::invalid_offset(label))
    }

    pub fn hours(self) -> i32 {
        self.0
    }

    /// The same offset as a chrono [`FixedOffset`].
    pub fn fixed(self) -> FixedOffset {
        // Range is checked on construction.
        FixedOffset::east_opt(self.0 * 3600).unwrap_or_else(|| Utc.fix())
    }
}

impl fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            f.write_str("UTC")
        } else {
            write!(f, "UTC{:+}", self.0)
        }
    }
}

impl FromStr for UtcOffset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A webcam at a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Camera {
    pub direction: CameraDirection,
    pub url: String,
}

impl Camera {
    pub fn new(direction: CameraDirection, url: impl Into<String>) -> Self {
        Self {
            direction,
            url: url.into(),
        }
    }
}

/// A photographed place with its local capture times and cameras.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    /// IANA timezone name, informational.
    pub timezone: String,
    /// Offset label, e.g. `UTC-7`.
    pub offset: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub city: String,
    /// Local sun capture time, `HH:MM`.
    pub sun_time: String,
    /// Local moon capture time, `HH:MM`.
    pub moon_time: String,
    #[serde(default)]
    pub cameras: Vec<Camera>,
}

impl Location {
    /// Configured local time label for `object`.
    pub fn capture_time_label(&self, object: CelestialObject) -> &str {
        match object {
            CelestialObject::Sun => &self.sun_time,
            CelestialObject::Moon => &self.moon_time,
        }
    }

    /// Parsed local capture time for `object`.
    pub fn capture_time(&self, object: CelestialObject) -> Result<NaiveTime> {
        parse_time_of_day(self.capture_time_label(object))
            .ok_or_else(|| Error::invalid_time(&self.id, self.capture_time_label(object)))
    }

    /// Parsed UTC offset.
    pub fn utc_offset(&self) -> Result<UtcOffset> {
        UtcOffset::parse(&self.offset)
    }
}

/// Parse a strict `HH:MM` time of day.
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let (hours, minutes) = value.trim().split_once(':')?;
    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }
    NaiveTime::from_hms_opt(hours.parse().ok()?, minutes.parse().ok()?, 0)
}
