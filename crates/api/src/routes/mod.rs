//! API route modules

pub mod calendar;
pub mod channels;
pub mod docs;
pub mod groups;
pub mod health;
mod ical;
mod params;
pub mod videos;
