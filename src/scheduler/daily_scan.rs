//! Daily scan scheduler
//!
//! Fires on weekdays only. Times are resolved in America/New_York so the
//! run tracks the US session across DST changes.

use crate::error::Result;
use crate::report::render_html;
use crate::services::ScanClock;
use crate::state::AppState;
use chrono::{DateTime, Datelike, Duration as ChronoDuration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::America::New_York;
use chrono_tz::Tz;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

/// `bw-scan-YYYY-MM-DD.html`
pub fn report_file_name(date: NaiveDate) -> String {
    format!("bw-scan-{}.html", date.format("%Y-%m-%d"))
}

/// Time from `now` until the next weekday occurrence of `at` in `now`'s time zone
pub fn duration_until_next_run(now: DateTime<Tz>, at: NaiveTime) -> Duration {
    let tz = now.timezone();

    for offset in 0..=7 {
        let date = now.date_naive() + ChronoDuration::days(offset);
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            continue;
        }

        // A wall time skipped by DST has no mapping; that day is passed over
        let Some(target) = tz.from_local_datetime(&date.and_time(at)).earliest() else {
            continue;
        };

        if target > now {
            if let Ok(duration) = (target - now).to_std() {
                return duration;
            }
        }
    }

    Duration::from_secs(24 * 3600)
}

/// Weekday report writer
pub struct DailyScanScheduler {
    state: AppState,
    at: NaiveTime,
    output_dir: PathBuf,
}

impl DailyScanScheduler {
    pub fn new(state: AppState, at: NaiveTime, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            state,
            at,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Run one scan and write its report, returning the file written
    pub async fn run_once(&self, clock: &ScanClock) -> Result<PathBuf> {
        let result = self.state.scan_at(clock).await?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_dir.join(report_file_name(clock.today));
        tokio::fs::write(&path, render_html(&result)).await?;

        info!("Report written to {}", path.display());
        Ok(path)
    }

    /// Sleep until each weekday run time, scan, repeat. Scan failures are
    /// logged and the next run is still scheduled.
    pub async fn run_forever(self) {
        info!(
            "Daily scan scheduler started ({} America/New_York, weekdays)",
            self.at.format("%H:%M")
        );

        loop {
            let duration = duration_until_next_run(Utc::now().with_timezone(&New_York), self.at);
            info!(
                "Next scan in {} hours {} minutes",
                duration.as_secs() / 3600,
                (duration.as_secs() % 3600) / 60
            );

            tokio::time::sleep(duration).await;

            if let Err(e) = self.run_once(&ScanClock::now()).await {
                error!("Scheduled scan failed: {}", e);
            }
        }
    }
}
