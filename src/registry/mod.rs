//! Read-only registry of photographed locations.
//!
//! The registry is built once per process from the settings file (or the
//! builtin list) and shared by reference; nothing mutates it afterwards.

mod builtin;
mod types;

pub use builtin::builtin_locations;
pub use types::{
    Camera, CameraDirection, CelestialObject, Location, UtcOffset, parse_time_of_day,
};

use crate::error::{Error, Result};

/// Ordered set of locations.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    locations: Vec<Location>,
}

impl Registry {
    pub fn new(locations: Vec<Location>) -> Self {
        Self { locations }
    }

    /// Registry with the builtin locations.
    pub fn builtin() -> Self {
        Self::new(builtin_locations())
    }

    /// Look up a location by id.
    pub fn get(&self, id: &str) -> Result<&Location> {
        self.locations
            .iter()
            .find(|location| location.id == id)
            .ok_or_else(|| Error::location_not_found(id))
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Locations matching an optional id filter.
    pub fn select(&self, id: Option<&str>) -> Result<Vec<&Location>> {
        match id {
            Some(id) => Ok(vec![self.get(id)?]),
            None => Ok(self.locations.iter().collect()),
        }
    }
}
