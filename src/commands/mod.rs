//! CLI command implementations.
//!
//! - [`run`] - One check-and-capture pass (the default)
//! - [`capture`] - Immediate capture of one location
//! - [`schedule`] - Print resolved schedule entries
//! - [`calendar`] - iCalendar export
//! - [`animate`] - ffmpeg animations of captured images

pub mod animate;
pub mod calendar;
pub mod capture;
pub mod run;
pub mod schedule;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::warn;

use analemma::capture::{CaptureOrchestrator, CaptureStore, WebDriver};
use analemma::clock::{Clock, SystemClock};
use analemma::config::Settings;
use analemma::registry::{Registry, UtcOffset};
use analemma::schedule::ConfigScheduleSource;

/// Settings and derived state shared by every command.
pub struct App {
    pub settings: Settings,
    pub registry: Registry,
    pub host_offset: UtcOffset,
    pub clock: Arc<dyn Clock>,
}

impl App {
    /// Load and validate settings, then install logging.
    pub fn load(config: Option<&Path>) -> Result<Self> {
        let settings = Settings::load(config)?;
        let validation = settings.validate()?;

        analemma::logging::init(settings.log_format, &settings.log_level)?;
        for warning in &validation.warnings {
            warn!("{warning}");
        }

        let host_offset = settings.host_offset()?;
        let registry = settings.registry();

        Ok(Self {
            settings,
            registry,
            host_offset,
            clock: Arc::new(SystemClock),
        })
    }

    /// Today's date on the host wall clock.
    pub fn host_today(&self) -> NaiveDate {
        self.clock
            .now()
            .with_timezone(&self.host_offset.fixed())
            .date_naive()
    }

    pub fn schedule_source(&self) -> ConfigScheduleSource {
        ConfigScheduleSource::new(self.host_offset)
    }

    /// Orchestrator backed by the configured WebDriver endpoint.
    pub fn orchestrator(&self) -> Result<CaptureOrchestrator<WebDriver>> {
        let driver = WebDriver::new(
            &self.settings.webdriver_url,
            self.settings.viewport(),
            self.settings.headless,
        )?;

        Ok(CaptureOrchestrator::new(
            driver,
            CaptureStore::new(&self.settings.captures_dir),
            self.host_offset,
        )
        .with_warm_up(self.settings.stream_warm_up())
        .with_navigation_timeout(self.settings.navigation_timeout())
        .with_clock(Arc::clone(&self.clock)))
    }
}
