//! Scheduler module
//!
//! Runs one scan per weekday at a fixed America/New_York wall-clock time
//! and writes the HTML report to disk.

mod daily_scan;

pub use daily_scan::{duration_until_next_run, report_file_name, DailyScanScheduler};
