//! SHINJU DATE Core - Domain logic and models
//!
//! This crate contains pure domain logic with no I/O operations: the live
//! classifier, calendar event synthesis, timeline grouping, and the models
//! they operate on.

pub mod calendar;
pub mod config;
pub mod date;
pub mod duration;
pub mod error;
pub mod live;
pub mod models;
pub mod timeline;
pub mod timezone;

pub use calendar::{CalendarEvent, synthesize_events};
pub use duration::VideoDuration;
pub use error::{CoreError, CoreResult};
pub use live::is_live_now;
pub use timezone::{default_timezone, parse_timezone, validate_timezone};
