//! Typed errors for scheduling and capture.
//!
//! Per-camera and per-location failures are caught at their fan-out
//! boundary and logged; these variants carry enough context for that log
//! line to be useful on its own.

use std::path::PathBuf;

/// Result type for analemma operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the resolver, scheduler and capture orchestrator.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Offset label is not of the form `UTC`, `UTC+H` or `UTC-H`.
    #[error("invalid UTC offset '{value}': expected UTC, UTC+H or UTC-H with whole hours")]
    InvalidOffset { value: String },

    /// Capture time is not a valid `HH:MM`.
    #[error("invalid capture time '{value}' for location '{location}': expected HH:MM")]
    InvalidTime { location: String, value: String },

    /// No location with this id exists in the registry.
    #[error("location not found: {id}")]
    LocationNotFound { id: String },

    /// Settings are structurally invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The automation backend could not open a browser session.
    #[error("failed to open browser session for camera '{camera}': {reason}")]
    SessionOpen { camera: String, reason: String },

    /// Page navigation failed before the timeout.
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// Page navigation did not finish in time.
    #[error("navigation to {url} timed out after {timeout_secs}s")]
    NavigationTimeout { url: String, timeout_secs: u64 },

    /// Screenshot could not be taken or written.
    #[error("screenshot to {path:?} failed: {reason}")]
    Screenshot { path: PathBuf, reason: String },

    /// No camera of a location could be prepared.
    #[error("no camera could be prepared for '{location}' ({failed} failed)")]
    PreparationFailed { location: String, failed: usize },

    /// WebDriver protocol error.
    #[error("webdriver error: {0}")]
    WebDriver(String),

    /// External encoder failed.
    #[error("encoder '{program}' failed: {reason}")]
    Encoder { program: String, reason: String },

    /// IO error with context.
    #[error("IO error in {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an invalid offset error.
    pub fn invalid_offset(value: impl Into<String>) -> Self {
        Self::InvalidOffset {
            value: value.into(),
        }
    }

    /// Create an invalid capture time error.
    pub fn invalid_time(location: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidTime {
            location: location.into(),
            value: value.into(),
        }
    }

    /// Create a location not found error.
    pub fn location_not_found(id: impl Into<String>) -> Self {
        Self::LocationNotFound { id: id.into() }
    }

    /// Create a navigation error.
    pub fn navigation(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Navigation {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a navigation timeout error.
    pub fn navigation_timeout(url: impl Into<String>, timeout_secs: u64) -> Self {
        Self::NavigationTimeout {
            url: url.into(),
            timeout_secs,
        }
    }

    /// Create a screenshot error.
    pub fn screenshot(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Screenshot {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns true for data-entry defects rather than runtime conditions.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::InvalidOffset { .. }
                | Self::InvalidTime { .. }
                | Self::LocationNotFound { .. }
                | Self::Config(_)
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::WebDriver(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_classification() {
        assert!(Error::invalid_offset("GMT+3").is_config());
        assert!(Error::invalid_time("phoenix", "25:00").is_config());
        assert!(Error::location_not_found("nowhere").is_config());
        assert!(!Error::navigation_timeout("https://cam", 120).is_config());
        assert!(
            !Error::PreparationFailed {
                location: "phoenix".to_string(),
                failed: 3
            }
            .is_config()
        );
    }

    #[test]
    fn test_messages_carry_context() {
        let err = Error::navigation_timeout("https://cam.example/north", 120);
        let msg = err.to_string();
        assert!(msg.contains("https://cam.example/north"));
        assert!(msg.contains("120s"));

        let err = Error::io(
            "listing captures/phoenix",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("listing captures/phoenix"));
    }
}
