//! Daily scheduler trigger

use crate::config::ScanConfig;
use crate::error::{Result, ScanError};
use crate::scheduler::DailyScanScheduler;
use crate::state::AppState;
use chrono::NaiveTime;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct ScheduleArgs {
    /// Path to a JSON configuration file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Run time in America/New_York, HH:MM (overrides configuration)
    #[arg(long)]
    pub at: Option<String>,

    /// Directory for report files (overrides configuration)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

/// Parse `HH:MM`
pub fn parse_run_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| ScanError::Validation(format!("Invalid run time '{}', expected HH:MM", value)))
}

pub async fn run(args: ScheduleArgs) -> Result<()> {
    let config = ScanConfig::load(args.config.as_deref())?;

    let at = match &args.at {
        Some(value) => parse_run_time(value)?,
        None => NaiveTime::from_hms_opt(config.schedule.hour, config.schedule.minute, 0)
            .ok_or_else(|| ScanError::Config("Invalid schedule time".to_string()))?,
    };
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.schedule.output_dir));

    let state = AppState::new(config)?;
    DailyScanScheduler::new(state, at, output_dir).run_forever().await;
    Ok(())
}
