//! Synchronized multi-camera capture.
//!
//! A capture runs in four phases:
//!
//! 1. **Prepare** - one session per camera, opened and navigated concurrently.
//!    Failed cameras are dropped; if none succeed the capture aborts.
//! 2. **Warm-up** - a single shared sleep so every stream has stabilised for
//!    the same amount of time.
//! 3. **Capture** - screenshots taken concurrently; a failed screenshot is
//!    logged and omitted from the result.
//! 4. **Teardown** - every prepared session is closed, whatever happened
//!    before.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::time::{Instant, timeout_at};
use tracing::{error, info, warn};

use super::automation::{Automation, Session};
use super::store::CaptureStore;
use crate::clock::{Clock, SystemClock};
use crate::constants::{DEFAULT_NAVIGATION_TIMEOUT_SECS, DEFAULT_STREAM_WARM_UP_SECS};
use crate::error::{Error, Result};
use crate::registry::{Camera, CelestialObject, Location, UtcOffset};

/// Something that can photograph every camera of a location.
///
/// The scheduler depends on this rather than on [`CaptureOrchestrator`]
/// directly.
#[async_trait]
pub trait Capturer: Send + Sync {
    /// Capture all cameras of `location`, returning the written files.
    ///
    /// An empty list is a valid outcome.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PreparationFailed`] when no camera could be
    /// prepared.
    async fn capture(&self, location: &Location, object: CelestialObject) -> Result<Vec<PathBuf>>;

    /// Time between the start of [`capture`](Self::capture) and the
    /// screenshots.
    fn warm_up(&self) -> Duration;
}

/// A camera whose page loaded and is waiting for its screenshot.
struct PreparedCamera<'a> {
    camera: &'a Camera,
    session: Box<dyn Session>,
}

/// Drives an [`Automation`] backend through the capture phases.
pub struct CaptureOrchestrator<A> {
    automation: A,
    store: CaptureStore,
    host_offset: UtcOffset,
    warm_up: Duration,
    navigation_timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl<A: Automation> CaptureOrchestrator<A> {
    pub fn new(automation: A, store: CaptureStore, host_offset: UtcOffset) -> Self {
        Self {
            automation,
            store,
            host_offset,
            warm_up: Duration::from_secs(DEFAULT_STREAM_WARM_UP_SECS),
            navigation_timeout: Duration::from_secs(DEFAULT_NAVIGATION_TIMEOUT_SECS),
            clock: Arc::new(SystemClock),
        }
    }

    #[must_use]
    pub fn with_warm_up(mut self, warm_up: Duration) -> Self {
        self.warm_up = warm_up;
        self
    }

    #[must_use]
    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_store(mut self, store: CaptureStore) -> Self {
        self.store = store;
        self
    }

    pub fn store(&self) -> &CaptureStore {
        &self.store
    }

    /// Open a session for `camera` and load its page.
    ///
    /// Opening and navigating share one navigation-timeout budget. A session
    /// that opened but failed to navigate is closed before the error is
    /// returned.
    async fn prepare<'a>(&self, camera: &'a Camera) -> Result<PreparedCamera<'a>> {
        info!(camera = %camera.direction, url = %camera.url, "Launching browser session");
        let deadline = Instant::now() + self.navigation_timeout;

        let opened = match timeout_at(deadline, self.automation.open_session()).await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(_) => Err(format!(
                "timed out after {}s",
                self.navigation_timeout.as_secs()
            )),
        };
        let mut session = opened.map_err(|reason| Error::SessionOpen {
            camera: camera.direction.to_string(),
            reason,
        })?;

        let remaining = deadline.saturating_duration_since(Instant::now());
        let navigation = session.navigate(&camera.url, remaining);
        let navigated = match timeout_at(deadline, navigation).await {
            Ok(result) => result,
            Err(_) => Err(Error::navigation_timeout(
                &camera.url,
                self.navigation_timeout.as_secs(),
            )),
        };

        if let Err(err) = navigated {
            close_session(camera, session.as_mut()).await;
            return Err(err);
        }

        info!(camera = %camera.direction, "Page loaded, waiting for stream");
        Ok(PreparedCamera { camera, session })
    }

    /// Screenshot one prepared camera into its next capture file.
    async fn shoot(
        &self,
        location: &Location,
        object: CelestialObject,
        prepared: &mut PreparedCamera<'_>,
        at: chrono::NaiveDateTime,
    ) -> Result<PathBuf> {
        let direction = prepared.camera.direction;
        let path = self.store.reserve(&location.id, object, direction, at).await?;

        if let Err(err) = prepared.session.screenshot(&path).await {
            CaptureStore::discard(&path).await;
            return Err(err);
        }

        info!(
            camera = %direction,
            path = %path.display(),
            "Saved capture"
        );
        Ok(path)
    }

    /// Run all four phases for `location`.
    pub async fn capture_location(
        &self,
        location: &Location,
        object: CelestialObject,
    ) -> Result<Vec<PathBuf>> {
        let directions: Vec<_> = location
            .cameras
            .iter()
            .map(|c| c.direction.as_str())
            .collect();
        info!(
            location = %location.id,
            object = %object,
            cameras = %directions.join(", "),
            warm_up_secs = self.warm_up.as_secs(),
            "Starting parallel capture"
        );

        // Phase 1: prepare
        let outcomes = join_all(location.cameras.iter().map(|camera| self.prepare(camera))).await;

        let mut prepared = Vec::with_capacity(outcomes.len());
        let mut failed = 0usize;
        for (camera, outcome) in location.cameras.iter().zip(outcomes) {
            match outcome {
                Ok(ready) => prepared.push(ready),
                Err(err) => {
                    failed += 1;
                    warn!(
                        location = %location.id,
                        camera = %camera.direction,
                        error = %err,
                        "Camera preparation failed"
                    );
                },
            }
        }

        if prepared.is_empty() {
            error!(location = %location.id, failed, "No camera could be prepared");
            return Err(Error::PreparationFailed {
                location: location.id.clone(),
                failed,
            });
        }

        info!(
            location = %location.id,
            ready = prepared.len(),
            failed,
            "Browsers ready"
        );

        // Phase 2: shared warm-up
        info!(warm_up_secs = self.warm_up.as_secs(), "Waiting for streams to stabilise");
        tokio::time::sleep(self.warm_up).await;

        // Phase 3: capture
        let captured_at = self.clock.now().with_timezone(&self.host_offset.fixed());
        info!(
            location = %location.id,
            at = %captured_at.format("%Y-%m-%d %H:%M:%S %:z"),
            "Taking screenshots"
        );
        let local_at = captured_at.naive_local();

        let shots = join_all(
            prepared
                .iter_mut()
                .map(|ready| self.shoot(location, object, ready, local_at)),
        )
        .await;

        let mut paths = Vec::with_capacity(shots.len());
        for (ready, shot) in prepared.iter().zip(shots) {
            match shot {
                Ok(path) => paths.push(path),
                Err(err) => warn!(
                    location = %location.id,
                    camera = %ready.camera.direction,
                    error = %err,
                    "Screenshot failed"
                ),
            }
        }

        // Phase 4: teardown
        info!(sessions = prepared.len(), "Closing browser sessions");
        join_all(
            prepared
                .iter_mut()
                .map(|ready| close_session(ready.camera, ready.session.as_mut())),
        )
        .await;

        match location.utc_offset() {
            Ok(offset) => info!(
                location = %location.id,
                host_time = %captured_at.format("%H:%M"),
                local_time = %captured_at.with_timezone(&offset.fixed()).format("%H:%M"),
                timezone = %location.timezone,
                "Capture complete"
            ),
            Err(err) => warn!(location = %location.id, error = %err, "Capture complete"),
        }

        Ok(paths)
    }
}

#[async_trait]
impl<A: Automation> Capturer for CaptureOrchestrator<A> {
    async fn capture(&self, location: &Location, object: CelestialObject) -> Result<Vec<PathBuf>> {
        self.capture_location(location, object).await
    }

    fn warm_up(&self) -> Duration {
        self.warm_up
    }
}

async fn close_session(camera: &Camera, session: &mut dyn Session) {
    if let Err(err) = session.close().await {
        warn!(camera = %camera.direction, error = %err, "Failed to close browser session");
    }
}
