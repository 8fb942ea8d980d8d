use anyhow::{anyhow, Result};
use std::env;
use std::time::Duration;

/// Maximum look-ahead the loop will commit to sleeping through in one step.
/// Sleep primitives degrade on very long durations, so timers further out
/// are picked up on a later pass instead of being slept toward directly.
pub const DEFAULT_HORIZON_DAYS: i64 = 40;

/// Pause between retries after a storage failure inside the loop.
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 5;

/// Runtime configuration for the scheduler: storage location, look-ahead
/// horizon, and failure backoff.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub db_path: String,
    pub horizon_days: i64,
    pub retry_delay_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            db_path: "data/tempo.db".to_string(),
            horizon_days: DEFAULT_HORIZON_DAYS,
            retry_delay_secs: DEFAULT_RETRY_DELAY_SECS,
        }
    }
}

impl SchedulerConfig {
    pub fn from_env() -> Result<Self> {
        let db_path = env::var("TEMPO_DB_PATH")
            .unwrap_or_else(|_| "data/tempo.db".into())
            .trim()
            .to_string();

        let horizon_days = match env::var("TEMPO_HORIZON_DAYS") {
            Ok(v) => v
                .trim()
                .parse::<i64>()
                .map_err(|e| anyhow!("Invalid TEMPO_HORIZON_DAYS: {}", e))?,
            Err(_) => DEFAULT_HORIZON_DAYS,
        };
        if horizon_days <= 0 {
            return Err(anyhow!("TEMPO_HORIZON_DAYS must be positive, got {}", horizon_days));
        }

        let retry_delay_secs = match env::var("TEMPO_RETRY_DELAY_SECS") {
            Ok(v) => v
                .trim()
                .parse::<u64>()
                .map_err(|e| anyhow!("Invalid TEMPO_RETRY_DELAY_SECS: {}", e))?,
            Err(_) => DEFAULT_RETRY_DELAY_SECS,
        };

        Ok(Self {
            db_path,
            horizon_days,
            retry_delay_secs,
        })
    }

    /// Horizon as a query bound offset.
    pub fn horizon(&self) -> chrono::Duration {
        chrono::Duration::days(self.horizon_days)
    }

    /// Horizon as the longest single sleep the loop will take.
    pub fn sleep_ceiling(&self) -> Duration {
        Duration::from_secs(self.horizon_days as u64 * 86_400)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    /// Log-friendly one-liner.
    pub fn summary(&self) -> String {
        format!(
            "db_path={}, horizon_days={}, retry_delay_secs={}",
            self.db_path, self.horizon_days, self.retry_delay_secs
        )
    }
}
