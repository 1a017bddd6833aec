//! Retention Config

use std::time::Duration;

use clap::Args;

/// Sweeper settings.
#[derive(Debug, Args)]
pub struct RetentionConfig {
    /// Seconds between two retention sweeps
    #[arg(
        long,
        env = "RETENTION_INTERVAL_SECONDS",
        default_value_t = 86_400,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub retention_interval_seconds: u64,
}

impl RetentionConfig {
    /// Pause between sweeps.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.retention_interval_seconds)
    }
}
