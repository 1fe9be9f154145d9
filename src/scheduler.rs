//! One check-and-capture pass over every location.
//!
//! Each location is handled independently and concurrently:
//!
//! ```text
//! IDLE -> RESOLVING -> NONE_DUE
//!                   -> DUE -> [WAITING ->] CAPTURING -> DONE
//! any state -> ERROR
//! ```
//!
//! A location is checked against its previous, current and next local day,
//! read from the location's own clock, since the offset difference can move
//! an event onto a neighbouring host date. Failures never leave their
//! location's branch.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::capture::Capturer;
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::registry::{Location, UtcOffset};
use crate::schedule::{PollingWindow, ScheduleEntry, ScheduleSource};

/// Outcome of capturing one due entry.
#[derive(Debug)]
pub struct CaptureAttempt {
    pub entry: ScheduleEntry,
    pub files: Result<Vec<PathBuf>>,
}

/// Where a location's branch ended up.
#[derive(Debug)]
pub enum LocationStatus {
    /// Nothing falls in the current window.
    NoneDue,
    /// One or more entries were due; each has its own outcome.
    Due(Vec<CaptureAttempt>),
    /// The schedule could not be resolved.
    Failed(Error),
}

/// Per-location result of a pass.
#[derive(Debug)]
pub struct LocationReport {
    pub location_id: String,
    pub status: LocationStatus,
}

/// Result of [`Scheduler::check_and_capture`].
#[derive(Debug, Default)]
pub struct PassReport {
    pub locations: Vec<LocationReport>,
}

impl PassReport {
    /// Every file written during the pass.
    pub fn files(&self) -> Vec<&PathBuf> {
        self.locations
            .iter()
            .filter_map(|report| match &report.status {
                LocationStatus::Due(attempts) => Some(attempts),
                _ => None,
            })
            .flatten()
            .filter_map(|attempt| attempt.files.as_ref().ok())
            .flatten()
            .collect()
    }

    /// Locations whose schedule could not be resolved.
    pub fn failed_locations(&self) -> Vec<&str> {
        self.locations
            .iter()
            .filter(|report| matches!(report.status, LocationStatus::Failed(_)))
            .map(|report| report.location_id.as_str())
            .collect()
    }

    /// Number of capture attempts that returned an error.
    pub fn failed_captures(&self) -> usize {
        self.locations
            .iter()
            .filter_map(|report| match &report.status {
                LocationStatus::Due(attempts) => Some(attempts),
                _ => None,
            })
            .flatten()
            .filter(|attempt| attempt.files.is_err())
            .count()
    }
}

/// Matches resolved entries against the host clock and triggers captures.
pub struct Scheduler<S, C> {
    source: S,
    capturer: C,
    clock: Arc<dyn Clock>,
    host_offset: UtcOffset,
    window: PollingWindow,
}

impl<S: ScheduleSource, C: Capturer> Scheduler<S, C> {
    pub fn new(source: S, capturer: C, clock: Arc<dyn Clock>, host_offset: UtcOffset) -> Self {
        Self {
            source,
            capturer,
            clock,
            host_offset,
            window: PollingWindow::default(),
        }
    }

    #[must_use]
    pub fn with_window(mut self, window: PollingWindow) -> Self {
        self.window = window;
        self
    }

    pub fn window(&self) -> PollingWindow {
        self.window
    }

    /// Current instant on the host wall clock.
    pub fn host_now(&self) -> DateTime<FixedOffset> {
        self.clock.now().with_timezone(&self.host_offset.fixed())
    }

    /// Whether `entry` is due in the window containing `now`.
    pub fn is_due(&self, entry: &ScheduleEntry, now: DateTime<FixedOffset>) -> bool {
        entry.host_date == now.date_naive() && self.window.contains(now.time(), entry.host_time)
    }

    /// Check every location once and capture whatever is due.
    ///
    /// Never fails as a whole: each location's errors are logged and
    /// reported in its [`LocationReport`].
    pub async fn check_and_capture(&self, locations: &[Location]) -> PassReport {
        let now = self.host_now();
        info!(
            host_time = %now.format("%Y-%m-%d %H:%M:%S %:z"),
            window_minutes = self.window.minutes(),
            locations = locations.len(),
            "Checking schedules"
        );

        let reports = join_all(locations.iter().map(|location| async move {
            let status = match self.check_location(location, now).await {
                Ok(status) => status,
                Err(err) => {
                    error!(location = %location.id, error = %err, "Schedule check failed");
                    LocationStatus::Failed(err)
                },
            };
            LocationReport {
                location_id: location.id.clone(),
                status,
            }
        }))
        .await;

        PassReport { locations: reports }
    }

    async fn check_location(
        &self,
        location: &Location,
        now: DateTime<FixedOffset>,
    ) -> Result<LocationStatus> {
        debug!(location = %location.id, state = "resolving");

        // Location date of "now"; its neighbours cover any host/location gap.
        let today = now
            .with_timezone(&location.utc_offset()?.fixed())
            .date_naive();
        let mut due = Vec::new();
        for local_date in [today.pred_opt(), Some(today), today.succ_opt()]
            .into_iter()
            .flatten()
        {
            let entries = self.source.schedule(location, local_date).await?;
            due.extend(entries.into_iter().filter(|entry| self.is_due(entry, now)));
        }

        if due.is_empty() {
            info!(
                location = %location.id,
                window_start = %self.window.slice_start(now.time()).format("%H:%M"),
                "No capture scheduled this window"
            );
            return Ok(LocationStatus::NoneDue);
        }

        due.sort_by_key(|entry| (entry.host_date, entry.host_time, entry.object));
        due.dedup();

        let mut attempts = Vec::with_capacity(due.len());
        for entry in due {
            info!(
                location = %location.id,
                object = %entry.object,
                host_time = %entry.host_time_label(),
                target_date = %entry.target_date,
                target_time = %entry.target_time_label(),
                "Found scheduled capture"
            );
            let files = self.execute(location, &entry).await;
            if let Err(err) = &files {
                error!(
                    location = %location.id,
                    object = %entry.object,
                    error = %err,
                    "Capture failed"
                );
            }
            attempts.push(CaptureAttempt { entry, files });
        }

        Ok(LocationStatus::Due(attempts))
    }

    /// Wait until the capture must start, then capture.
    ///
    /// The capturer spends its warm-up before the screenshot, so it is started
    /// that much earlier than the scheduled instant.
    async fn execute(&self, location: &Location, entry: &ScheduleEntry) -> Result<Vec<PathBuf>> {
        let scheduled = entry.host_instant(self.host_offset).ok_or_else(|| {
            Error::Config(format!(
                "{} {} is not a valid host time",
                entry.host_date,
                entry.host_time_label()
            ))
        })?;

        let total_wait = (scheduled - self.host_now())
            .to_std()
            .unwrap_or(Duration::ZERO);
        let start_delay = total_wait.saturating_sub(self.capturer.warm_up());

        info!(
            location = %location.id,
            object = %entry.object,
            wait_secs = total_wait.as_secs(),
            warm_up_secs = self.capturer.warm_up().as_secs(),
            start_in_secs = start_delay.as_secs(),
            "Timing calculated"
        );

        if !start_delay.is_zero() {
            debug!(location = %location.id, state = "waiting");
            tokio::time::sleep(start_delay).await;
        }

        debug!(location = %location.id, state = "capturing");
        let files = self.capturer.capture(location, entry.object).await?;

        if files.is_empty() {
            warn!(location = %location.id, object = %entry.object, "No camera produced an image");
        } else {
            info!(
                location = %location.id,
                object = %entry.object,
                files = files.len(),
                "Capture done"
            );
        }
        Ok(files)
    }
}
