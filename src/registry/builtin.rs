//! Locations used when the settings file declares none.

use super::types::{Camera, CameraDirection, Location};

/// The Phoenix rooftop cameras the project started with.
pub fn builtin_locations() -> Vec<Location> {
    vec![Location {
        id: "usa-arizona-phoenix".to_string(),
        name: "Ahwatukee - Phoenix".to_string(),
        timezone: "America/Phoenix".to_string(),
        offset: "UTC-7".to_string(),
        country: "USA".to_string(),
        state: "Arizona".to_string(),
        city: "Phoenix".to_string(),
        sun_time: "16:00".to_string(),
        moon_time: "21:00".to_string(),
        cameras: vec![
            Camera::new(
                CameraDirection::West,
                "https://myearthcam.com/insideoutaerial",
            ),
            Camera::new(
                CameraDirection::North,
                "https://www.myearthcam.com/insideoutaerial/lowercam2",
            ),
            Camera::new(
                CameraDirection::Northeast,
                "https://www.myearthcam.com/insideoutaerial/lowercam3",
            ),
            Camera::new(
                CameraDirection::Multiple,
                "https://www.myearthcam.com/insideoutaerial/phxweather",
            ),
        ],
    }]
}
