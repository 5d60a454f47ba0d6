//! Maintenance rate limiting.
//!
//! `cleanup_database` is meant to be safe to call from anywhere — a cron
//! job, an admin endpoint, a startup hook — so it throttles itself
//! through a single timestamp file instead of trusting the caller.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

/// Default minimum gap between maintenance runs: 30 days.
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// A last-run timestamp persisted to one file.
///
/// The file holds a single decimal epoch-millisecond value. A missing or
/// unreadable value counts as "never ran", so a corrupted file heals on
/// the next run instead of wedging maintenance forever.
#[derive(Debug, Clone)]
pub struct MaintenanceLog {
    path: PathBuf,
    min_interval: Duration,
}

impl MaintenanceLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            min_interval: DEFAULT_MIN_INTERVAL,
        }
    }

    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// Whether enough time has passed since the recorded run.
    pub async fn due(&self, now_ms: u64) -> Result<bool, io::Error> {
        let last = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text.trim().parse::<u64>().ok(),
            Err(error) if error.kind() == io::ErrorKind::NotFound => None,
            Err(error) => return Err(error),
        };
        match last {
            Some(last) => {
                let elapsed = now_ms.saturating_sub(last);
                Ok(elapsed >= self.min_interval.as_millis() as u64)
            }
            None => {
                debug!(path = %self.path.display(), "no usable last-run record");
                Ok(true)
            }
        }
    }

    /// Records `now_ms` as the last run.
    pub async fn record(&self, now_ms: u64) -> Result<(), io::Error> {
        tokio::fs::write(&self.path, now_ms.to_string()).await
    }
}
