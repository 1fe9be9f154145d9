//! W3C WebDriver backend.
//!
//! Talks to a running chromedriver (or any W3C-compliant driver) over HTTP.
//! Each [`Automation::open_session`] call creates a separate browser, so
//! cameras never share a tab.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};
use tracing::debug;

use super::automation::{Automation, Session, Viewport};
use crate::constants::BROWSER_USER_AGENT;
use crate::error::{Error, Result};

/// Slack added to HTTP requests on top of the page-load timeout so the
/// driver reports its own timeout first.
const REQUEST_SLACK: Duration = Duration::from_secs(10);

/// Timeout for session management calls.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for a WebDriver endpoint.
#[derive(Debug, Clone)]
pub struct WebDriver {
    client: reqwest::Client,
    endpoint: String,
    viewport: Viewport,
    headless: bool,
}

impl WebDriver {
    /// Create a client for the driver at `endpoint` (e.g. `http://127.0.0.1:9515`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, viewport: Viewport, headless: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            viewport,
            headless,
        })
    }

    /// Chrome capabilities for a capture session.
    pub fn capabilities(&self) -> Value {
        let mut args = vec![
            "--no-sandbox".to_string(),
            "--disable-setuid-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-gpu".to_string(),
            "--disable-blink-features=AutomationControlled".to_string(),
            format!(
                "--window-size={},{}",
                self.viewport.width, self.viewport.height
            ),
            format!("--user-agent={BROWSER_USER_AGENT}"),
        ];
        if self.headless {
            args.insert(0, "--headless=new".to_string());
        }

        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args }
                }
            }
        })
    }
}

#[async_trait]
impl Automation for WebDriver {
    async fn open_session(&self) -> Result<Box<dyn Session>> {
        let request = self
            .client
            .post(format!("{}/session", self.endpoint))
            .timeout(COMMAND_TIMEOUT)
            .json(&self.capabilities());
        let value = send(request).await?;

        let id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::WebDriver("new session response has no sessionId".to_string()))?;

        debug!(session = %id, "WebDriver session opened");
        Ok(Box::new(WebDriverSession {
            client: self.client.clone(),
            base: format!("{}/session/{id}", self.endpoint),
            closed: false,
        }))
    }
}

/// An open WebDriver session.
struct WebDriverSession {
    client: reqwest::Client,
    base: String,
    closed: bool,
}

#[async_trait]
impl Session for WebDriverSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        let page_load_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        let timeouts = self
            .client
            .post(format!("{}/timeouts", self.base))
            .timeout(COMMAND_TIMEOUT)
            .json(&json!({ "pageLoad": page_load_ms }));
        send(timeouts).await?;

        let navigate = self
            .client
            .post(format!("{}/url", self.base))
            .timeout(timeout + REQUEST_SLACK)
            .json(&json!({ "url": url }));
        send(navigate).await.map_err(|e| Error::navigation(url, e))?;
        Ok(())
    }

    async fn screenshot(&mut self, path: &Path) -> Result<()> {
        let request = self
            .client
            .get(format!("{}/screenshot", self.base))
            .timeout(COMMAND_TIMEOUT);
        let value = send(request)
            .await
            .map_err(|e| Error::screenshot(path, e))?;

        let encoded = value
            .as_str()
            .ok_or_else(|| Error::screenshot(path, "response is not a base64 string"))?;
        let png = STANDARD
            .decode(encoded)
            .map_err(|e| Error::screenshot(path, e))?;

        tokio::fs::write(path, png)
            .await
            .map_err(|e| Error::io(format!("writing {}", path.display()), e))
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        let request = self.client.delete(&self.base).timeout(COMMAND_TIMEOUT);
        send(request).await?;
        self.closed = true;
        Ok(())
    }
}

/// Send a command and unwrap the `value` member of the response.
async fn send(request: reqwest::RequestBuilder) -> Result<Value> {
    let response = request.send().await?;
    let status = response.status();
    let body: Value = response.json().await?;
    let value = body.get("value").cloned().unwrap_or(Value::Null);

    if let Some(kind) = value.get("error").and_then(Value::as_str) {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default();
        return Err(Error::WebDriver(format!("{kind}: {message}")));
    }

    if !status.is_success() {
        return Err(Error::WebDriver(format!("unexpected status {status}")));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_headless() {
        let driver = WebDriver::new("http://127.0.0.1:9515/", Viewport::default(), true).unwrap();
        let caps = driver.capabilities();
        let args = caps["capabilities"]["alwaysMatch"]["goog:chromeOptions"]["args"]
            .as_array()
            .unwrap();

        assert_eq!(args[0], "--headless=new");
        assert!(args.iter().any(|a| a == "--window-size=1024,690"));
        assert_eq!(driver.endpoint, "http://127.0.0.1:9515");
    }

    #[test]
    fn test_capabilities_headed() {
        let viewport = Viewport {
            width: 1920,
            height: 1080,
        };
        let driver = WebDriver::new("http://localhost:4444", viewport, false).unwrap();
        let caps = driver.capabilities();
        let args = caps["capabilities"]["alwaysMatch"]["goog:chromeOptions"]["args"]
            .as_array()
            .unwrap();

        assert!(!args.iter().any(|a| a == "--headless=new"));
        assert!(args.iter().any(|a| a == "--window-size=1920,1080"));
    }
}
