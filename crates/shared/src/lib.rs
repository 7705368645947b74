//! Process bootstrap shared by the SHINJU DATE binaries

pub mod bootstrap;

pub use bootstrap::{init_db, init_env, init_tracing, run_migrations};
