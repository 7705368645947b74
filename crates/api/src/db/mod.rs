//! Database repository modules

pub mod channels;
pub mod groups;
pub mod videos;
