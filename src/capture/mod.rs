//! Camera capture: automation seam, orchestrator, and file layout.

mod automation;
mod orchestrator;
mod store;
mod webdriver;

pub use automation::{Automation, Session, Viewport};
pub use orchestrator::{CaptureOrchestrator, Capturer};
pub use store::CaptureStore;
pub use webdriver::WebDriver;
