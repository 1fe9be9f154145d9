//! Default values shared across the crate.
//!
//! Every default can be overridden from `analemma.toml`; see [`crate::config`].

/// Default settings file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "analemma.toml";

/// Environment variable naming an explicit settings file.
pub const CONFIG_ENV_VAR: &str = "ANALEMMA_CONFIG";

/// Offset of the machine running the scheduler.
pub const DEFAULT_HOST_OFFSET: &str = "UTC-4";

/// IANA name of the host timezone (label only, used in exports).
pub const DEFAULT_HOST_TIMEZONE: &str = "America/La_Paz";

/// Root directory for captured images.
pub const DEFAULT_CAPTURES_DIR: &str = "captures";

/// Root directory for generated animations.
pub const DEFAULT_ANIMATIONS_DIR: &str = "animations";

/// How long a camera stream needs before a screenshot is meaningful.
pub const DEFAULT_STREAM_WARM_UP_SECS: u64 = 3 * 60;

/// Upper bound for loading a camera page.
pub const DEFAULT_NAVIGATION_TIMEOUT_SECS: u64 = 2 * 60;

/// Width of the polling window, in minutes.
pub const DEFAULT_WINDOW_MINUTES: u32 = 60;

/// Minutes in a calendar day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// chromedriver's default listening address.
pub const DEFAULT_WEBDRIVER_URL: &str = "http://127.0.0.1:9515";

pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1024;
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 690;

/// Desktop user agent; some camera hosts refuse headless agents.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Default frames per second for generated animations.
pub const DEFAULT_ANIMATION_FPS: u32 = 4;

/// Length of an exported calendar event.
pub const CALENDAR_EVENT_MINUTES: i64 = 5;

/// Extension of files written by the capture orchestrator.
pub const CAPTURE_EXTENSION: &str = "png";

/// Zero-padding width of capture sequence numbers.
pub const SEQUENCE_WIDTH: usize = 3;
