//! Scheduled sun and moon captures from fixed webcams.
//!
//! Each location defines a local capture time per object. The
//! [`schedule`] module converts those into the host machine's wall clock,
//! the [`scheduler`] decides what is due in the current polling window, and
//! the [`capture`] module photographs every camera of a location at nearly
//! the same instant.
//!
//! One invocation performs one pass and exits; an external periodic trigger
//! provides the cadence.

pub mod animation;
pub mod capture;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod logging;
pub mod registry;
pub mod schedule;
pub mod scheduler;

pub use error::{Error, Result};
