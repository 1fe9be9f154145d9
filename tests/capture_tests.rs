//! Orchestrator behavior against an in-memory browser.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use analemma::Error;
use analemma::capture::{Automation, CaptureOrchestrator, CaptureStore, Session};
use analemma::clock::FixedClock;
use analemma::registry::{Camera, CameraDirection, CelestialObject, Location, UtcOffset};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tempfile::TempDir;

const HANG: &str = "https://cams.test/hang";
const BROKEN_SCREENSHOT: &str = "https://cams.test/broken-screenshot";
const UNREACHABLE: &str = "https://cams.test/unreachable";

#[derive(Default)]
struct Events {
    opened: usize,
    closed: usize,
}

#[derive(Clone, Default)]
struct FakeBrowser {
    events: Arc<Mutex<Events>>,
    hang_on_open: bool,
}

impl FakeBrowser {
    fn opened(&self) -> usize {
        self.events.lock().unwrap().opened
    }

    fn closed(&self) -> usize {
        self.events.lock().unwrap().closed
    }
}

#[async_trait]
impl Automation for FakeBrowser {
    async fn open_session(&self) -> analemma::Result<Box<dyn Session>> {
        self.events.lock().unwrap().opened += 1;
        if self.hang_on_open {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        Ok(Box::new(FakeSession {
            events: Arc::clone(&self.events),
            url: None,
        }))
    }
}

struct FakeSession {
    events: Arc<Mutex<Events>>,
    url: Option<String>,
}

#[async_trait]
impl Session for FakeSession {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> analemma::Result<()> {
        match url {
            HANG => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            },
            UNREACHABLE => Err(Error::navigation(url, "connection refused")),
            _ => {
                self.url = Some(url.to_string());
                Ok(())
            },
        }
    }

    async fn screenshot(&mut self, path: &Path) -> analemma::Result<()> {
        if self.url.as_deref() == Some(BROKEN_SCREENSHOT) {
            return Err(Error::screenshot(path, "renderer crashed"));
        }
        tokio::fs::write(path, b"\x89PNG")
            .await
            .map_err(|e| Error::io("writing screenshot", e))
    }

    async fn close(&mut self) -> analemma::Result<()> {
        self.events.lock().unwrap().closed += 1;
        Ok(())
    }
}

fn location(urls: &[(CameraDirection, &str)]) -> Location {
    Location {
        id: "test-site".to_string(),
        name: "Test Site".to_string(),
        timezone: "America/Phoenix".to_string(),
        offset: "UTC-7".to_string(),
        country: String::new(),
        state: String::new(),
        city: String::new(),
        sun_time: "16:00".to_string(),
        moon_time: "21:00".to_string(),
        cameras: urls
            .iter()
            .map(|(direction, url)| Camera::new(*direction, *url))
            .collect(),
    }
}

fn orchestrator(browser: FakeBrowser, root: &Path) -> CaptureOrchestrator<FakeBrowser> {
    // 19:00 host (UTC-4) on Feb 1.
    let now = Utc.with_ymd_and_hms(2026, 2, 1, 23, 0, 0).unwrap();
    CaptureOrchestrator::new(
        browser,
        CaptureStore::new(root),
        UtcOffset::parse("UTC-4").unwrap(),
    )
    .with_warm_up(Duration::from_millis(20))
    .with_navigation_timeout(Duration::from_millis(100))
    .with_clock(Arc::new(FixedClock::new(now)))
}

#[tokio::test]
async fn test_hanging_camera_is_dropped() {
    let temp = TempDir::new().unwrap();
    let browser = FakeBrowser::default();
    let site = location(&[
        (CameraDirection::West, "https://cams.test/west"),
        (CameraDirection::North, HANG),
        (CameraDirection::East, "https://cams.test/east"),
    ]);

    let files = orchestrator(browser.clone(), temp.path())
        .capture_location(&site, CelestialObject::Sun)
        .await
        .unwrap();

    assert_eq!(files.len(), 2);
    for file in &files {
        assert!(file.exists());
    }
    assert_eq!(browser.opened(), 3);
    assert_eq!(browser.closed(), 3);

    let west = temp.path().join("test-site/sun/west/001_20260201_1900.png");
    let east = temp.path().join("test-site/sun/east/001_20260201_1900.png");
    assert!(files.contains(&west));
    assert!(files.contains(&east));
    assert!(!temp.path().join("test-site/sun/north").exists());
}

#[tokio::test]
async fn test_no_camera_prepared_is_an_error() {
    let temp = TempDir::new().unwrap();
    let browser = FakeBrowser::default();
    let site = location(&[
        (CameraDirection::West, UNREACHABLE),
        (CameraDirection::North, HANG),
    ]);

    let err = orchestrator(browser.clone(), temp.path())
        .capture_location(&site, CelestialObject::Moon)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::PreparationFailed { ref location, failed: 2 } if location == "test-site"
    ));
    assert_eq!(browser.closed(), 2);
}

#[tokio::test]
async fn test_failed_screenshot_is_omitted() {
    let temp = TempDir::new().unwrap();
    let browser = FakeBrowser::default();
    let site = location(&[
        (CameraDirection::West, "https://cams.test/west"),
        (CameraDirection::Multiple, BROKEN_SCREENSHOT),
    ]);

    let files = orchestrator(browser.clone(), temp.path())
        .capture_location(&site, CelestialObject::Sun)
        .await
        .unwrap();

    assert_eq!(
        files,
        vec![temp.path().join("test-site/sun/west/001_20260201_1900.png")]
    );
    assert_eq!(browser.closed(), 2);

    // The placeholder for the broken camera is removed.
    let broken_dir = temp.path().join("test-site/sun/multiple");
    let leftovers = CaptureStore::list_images(&broken_dir).await.unwrap();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_sequence_continues_across_captures() {
    let temp = TempDir::new().unwrap();
    let site = location(&[(CameraDirection::West, "https://cams.test/west")]);
    let orchestrator = orchestrator(FakeBrowser::default(), temp.path());

    let first = orchestrator
        .capture_location(&site, CelestialObject::Sun)
        .await
        .unwrap();
    let second = orchestrator
        .capture_location(&site, CelestialObject::Sun)
        .await
        .unwrap();

    let name = |files: &[PathBuf]| {
        files[0]
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned()
    };
    assert_eq!(name(&first), "001_20260201_1900.png");
    assert_eq!(name(&second), "002_20260201_1900.png");
}

#[tokio::test]
async fn test_location_without_cameras() {
    let temp = TempDir::new().unwrap();
    let browser = FakeBrowser::default();

    let err = orchestrator(browser.clone(), temp.path())
        .capture_location(&location(&[]), CelestialObject::Sun)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::PreparationFailed { failed: 0, .. }));
    assert_eq!(browser.opened(), 0);
}

#[tokio::test]
async fn test_hanging_session_open_is_bounded() {
    let temp = TempDir::new().unwrap();
    let browser = FakeBrowser {
        hang_on_open: true,
        ..FakeBrowser::default()
    };
    let site = location(&[
        (CameraDirection::West, "https://cams.test/west"),
        (CameraDirection::East, "https://cams.test/east"),
    ]);

    let orchestrator = orchestrator(browser.clone(), temp.path());
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        orchestrator.capture_location(&site, CelestialObject::Sun),
    )
    .await
    .expect("preparation should give up after the navigation timeout");

    assert!(matches!(
        result,
        Err(Error::PreparationFailed { failed: 2, .. })
    ));
    assert_eq!(browser.opened(), 2);
    // Nothing was opened, so nothing is closed.
    assert_eq!(browser.closed(), 0);
}
