//! Browser automation seam.
//!
//! The orchestrator only talks to these traits; [`super::WebDriver`] is the
//! production backend and tests plug in in-memory fakes.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Opens independent browser sessions.
#[async_trait]
pub trait Automation: Send + Sync {
    /// Launch a fresh session.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser could not be started.
    async fn open_session(&self) -> Result<Box<dyn Session>>;
}

/// One browser session showing one camera page.
#[async_trait]
pub trait Session: Send {
    /// Load `url`, giving up after `timeout`.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// Write a PNG of the current viewport to `path`.
    async fn screenshot(&mut self, path: &Path) -> Result<()>;

    /// Release the session. Must be safe to call after a failed navigate or
    /// screenshot.
    async fn close(&mut self) -> Result<()>;
}

/// Browser viewport in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: crate::constants::DEFAULT_VIEWPORT_WIDTH,
            height: crate::constants::DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}
