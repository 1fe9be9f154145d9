//! Settings for the capture pass.
//!
//! Settings come from an optional TOML file:
//!
//! ```toml
//! host_offset = "UTC-4"
//! captures_dir = "captures"
//! stream_warm_up_secs = 180
//! window_minutes = 60
//!
//! [[locations]]
//! id = "usa-arizona-phoenix"
//! name = "Ahwatukee - Phoenix"
//! timezone = "America/Phoenix"
//! offset = "UTC-7"
//! sun_time = "16:00"
//! moon_time = "21:00"
//!
//! [[locations.cameras]]
//! direction = "west"
//! url = "https://myearthcam.com/insideoutaerial"
//! ```
//!
//! Every field has a default; without `[[locations]]` the builtin registry
//! is used.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::capture::Viewport;
use crate::constants;
use crate::registry::{CelestialObject, Location, Registry, UtcOffset};
use crate::schedule::PollingWindow;

/// Result of settings validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Non-fatal warnings that should be logged but don't prevent operation.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Returns true if there are any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// analemma.toml structure.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub host_offset: String,
    pub host_timezone: String,
    pub captures_dir: PathBuf,
    pub animations_dir: PathBuf,
    pub stream_warm_up_secs: u64,
    pub navigation_timeout_secs: u64,
    pub window_minutes: u32,
    pub webdriver_url: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub headless: bool,
    pub log_format: LogFormat,
    pub log_level: String,
    pub locations: Vec<Location>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host_offset: constants::DEFAULT_HOST_OFFSET.to_string(),
            host_timezone: constants::DEFAULT_HOST_TIMEZONE.to_string(),
            captures_dir: PathBuf::from(constants::DEFAULT_CAPTURES_DIR),
            animations_dir: PathBuf::from(constants::DEFAULT_ANIMATIONS_DIR),
            stream_warm_up_secs: constants::DEFAULT_STREAM_WARM_UP_SECS,
            navigation_timeout_secs: constants::DEFAULT_NAVIGATION_TIMEOUT_SECS,
            window_minutes: constants::DEFAULT_WINDOW_MINUTES,
            webdriver_url: constants::DEFAULT_WEBDRIVER_URL.to_string(),
            viewport_width: constants::DEFAULT_VIEWPORT_WIDTH,
            viewport_height: constants::DEFAULT_VIEWPORT_HEIGHT,
            headless: true,
            log_format: LogFormat::Text,
            log_level: "info".to_string(),
            locations: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings, resolving the file location.
    ///
    /// Resolution order:
    /// 1. `explicit` path (from `--config`)
    /// 2. `ANALEMMA_CONFIG` environment variable
    /// 3. `analemma.toml` in the working directory
    /// 4. `<config dir>/analemma/analemma.toml`
    ///
    /// An explicitly named file must exist; otherwise a missing file yields
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a named file cannot be read or any file contains
    /// invalid TOML.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        if let Ok(path) = std::env::var(constants::CONFIG_ENV_VAR)
            && !path.is_empty()
        {
            return Self::load_from(path);
        }

        let candidates = std::iter::once(PathBuf::from(constants::CONFIG_FILE_NAME)).chain(
            dirs::config_dir().map(|dir| dir.join("analemma").join(constants::CONFIG_FILE_NAME)),
        );
        for candidate in candidates {
            if candidate.is_file() {
                return Self::load_from(candidate);
            }
        }

        Ok(Self::default())
    }

    /// Load settings from the specified path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read (IO error)
    /// - The file contains invalid TOML syntax
    /// - Fields have invalid types
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(settings)
    }

    /// Validate settings with comprehensive checks.
    ///
    /// Malformed location offsets and capture times are warnings: they only
    /// disable the affected location when it is resolved.
    ///
    /// # Errors
    ///
    /// Returns an error listing every structural problem:
    /// - Malformed host offset
    /// - A zero navigation timeout or a window that does not divide a day
    ///
    /// A zero warm-up is only a warning.
    /// - Empty or duplicate location ids, locations without cameras
    /// - Empty camera URLs
    pub fn validate(&self) -> Result<ValidationResult> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        // 1. Host clock
        if let Err(e) = UtcOffset::parse(&self.host_offset) {
            errors.push(format!("host_offset: {e}"));
        }

        // 2. Timing
        if self.stream_warm_up_secs == 0 {
            warnings.push(
                "stream_warm_up_secs is 0\n  \
                 Screenshots will be taken as soon as pages load, before streams stabilise"
                    .to_string(),
            );
        }
        if self.navigation_timeout_secs == 0 {
            errors.push("navigation_timeout_secs cannot be 0".to_string());
        }
        if let Err(e) = PollingWindow::new(self.window_minutes) {
            errors.push(format!("window_minutes: {e}"));
        }
        if self.stream_warm_up_secs > u64::from(self.window_minutes) * 60 {
            warnings.push(format!(
                "stream_warm_up_secs ({}) is longer than the polling window ({} min)\n  \
                 Captures early in a window will start late",
                self.stream_warm_up_secs, self.window_minutes
            ));
        }

        // 3. Browser
        if self.webdriver_url.is_empty() {
            errors.push("webdriver_url cannot be empty".to_string());
        }
        if self.viewport_width == 0 || self.viewport_height == 0 {
            errors.push("viewport dimensions must be positive".to_string());
        }

        // 4. Locations
        let mut seen = HashSet::new();
        for location in &self.locations {
            if location.id.is_empty() {
                errors.push("location id cannot be empty".to_string());
            } else if !seen.insert(location.id.as_str()) {
                errors.push(format!("duplicate location id '{}'", location.id));
            }

            if location.cameras.is_empty() {
                errors.push(format!("location '{}' has no cameras", location.id));
            }
            for camera in &location.cameras {
                if camera.url.is_empty() {
                    errors.push(format!(
                        "camera '{}' of location '{}' has an empty url",
                        camera.direction, location.id
                    ));
                }
            }

            if let Err(e) = location.utc_offset() {
                warnings.push(format!(
                    "location '{}' will be skipped: {e}",
                    location.id
                ));
            }
            for object in CelestialObject::ALL {
                if let Err(e) = location.capture_time(object) {
                    warnings.push(format!("location '{}' will be skipped: {e}", location.id));
                }
            }
        }

        if !errors.is_empty() {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }

        Ok(ValidationResult { warnings })
    }

    /// Parsed host offset.
    ///
    /// # Errors
    ///
    /// Returns an error if `host_offset` is malformed.
    pub fn host_offset(&self) -> Result<UtcOffset> {
        UtcOffset::parse(&self.host_offset)
            .with_context(|| format!("Invalid host_offset '{}'", self.host_offset))
    }

    /// Parsed polling window.
    ///
    /// # Errors
    ///
    /// Returns an error if `window_minutes` does not divide a day.
    pub fn window(&self) -> Result<PollingWindow> {
        Ok(PollingWindow::new(self.window_minutes)?)
    }

    pub fn stream_warm_up(&self) -> Duration {
        Duration::from_secs(self.stream_warm_up_secs)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.viewport_width,
            height: self.viewport_height,
        }
    }

    /// Location registry: configured locations, or the builtin ones.
    pub fn registry(&self) -> Registry {
        if self.locations.is_empty() {
            Registry::builtin()
        } else {
            Registry::new(self.locations.clone())
        }
    }
}
