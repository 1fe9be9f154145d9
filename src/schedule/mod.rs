//! Schedule resolution: local capture times to host wall-clock entries.

mod entry;
mod resolver;
mod source;
mod window;

pub use entry::ScheduleEntry;
pub use resolver::{resolve, resolve_day};
pub use source::{ConfigScheduleSource, ScheduleSource, schedule_range};
pub use window::PollingWindow;
