//! CLI command handlers
//!
//! Each subcommand loads configuration, builds [`AppState`](crate::state::AppState)
//! and hands off to the matching trigger.

pub mod scan;
pub mod schedule;
pub mod serve;

pub use scan::{OutputFormat, ScanArgs};
pub use schedule::ScheduleArgs;
pub use serve::ServeArgs;
