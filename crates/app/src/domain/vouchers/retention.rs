//! Voucher Retention
//!
//! Vouchers that have been redeemed, or that expired without being redeemed,
//! are kept for one calendar year and then purged by a periodic sweep.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
    time::Duration,
};

use jiff::{Timestamp, ToSpan, tz::TimeZone};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::domain::vouchers::{VouchersService, VouchersServiceError};

/// Pause between two sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Instant before which terminal vouchers are purged: `now` minus one
/// calendar year, computed in UTC.
///
/// # Errors
///
/// Returns an error when the subtraction leaves the supported range.
pub fn retention_cutoff(now: Timestamp) -> Result<Timestamp, jiff::Error> {
    Ok(now.to_zoned(TimeZone::UTC).checked_sub(1.year())?.timestamp())
}

/// Periodically deletes vouchers past their retention period.
pub struct RetentionSweeper {
    vouchers: Arc<dyn VouchersService>,
    interval: Duration,
}

impl Debug for RetentionSweeper {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("RetentionSweeper")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

impl RetentionSweeper {
    #[must_use]
    pub fn new(vouchers: Arc<dyn VouchersService>) -> Self {
        Self {
            vouchers,
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run one sweep.
    ///
    /// # Errors
    ///
    /// Returns the service error when the deletion fails.
    pub async fn sweep(&self) -> Result<u64, VouchersServiceError> {
        info!(started_at = %Timestamp::now(), "starting voucher cleanup");

        let deleted = self.vouchers.delete_old_vouchers().await?;

        info!(deleted, completed_at = %Timestamp::now(), "voucher cleanup completed");

        Ok(deleted)
    }

    /// Sweep, wait for the interval, and repeat until `cancel` fires.
    ///
    /// A failed sweep is logged and the loop carries on with the next one.
    pub async fn run(self, cancel: CancellationToken) {
        info!(interval = ?self.interval, "voucher retention sweeper starting");

        while !cancel.is_cancelled() {
            if let Err(error) = self.sweep().await {
                error!(error = %error, "voucher cleanup failed");
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(self.interval) => {}
            }
        }

        info!("voucher retention sweeper stopping");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use jiff::{SignedDuration, civil::date};
    use testresult::TestResult;

    use crate::domain::vouchers::MockVouchersService;

    use super::*;

    #[test]
    fn cutoff_is_one_calendar_year_earlier() -> TestResult {
        let now = date(2026, 10, 19).at(8, 30, 0, 0).to_zoned(TimeZone::UTC)?.timestamp();
        let expected = date(2025, 10, 19).at(8, 30, 0, 0).to_zoned(TimeZone::UTC)?.timestamp();

        assert_eq!(retention_cutoff(now)?, expected);

        Ok(())
    }

    #[test]
    fn cutoff_spans_a_leap_day() -> TestResult {
        let now = date(2024, 3, 1).at(0, 0, 0, 0).to_zoned(TimeZone::UTC)?.timestamp();

        let cutoff = retention_cutoff(now)?;

        assert_eq!(now.duration_since(cutoff), SignedDuration::from_hours(366 * 24));

        Ok(())
    }

    #[test]
    fn cutoff_from_leap_day_clamps_to_end_of_february() -> TestResult {
        let now = date(2024, 2, 29).at(12, 0, 0, 0).to_zoned(TimeZone::UTC)?.timestamp();
        let expected = date(2023, 2, 28).at(12, 0, 0, 0).to_zoned(TimeZone::UTC)?.timestamp();

        assert_eq!(retention_cutoff(now)?, expected);

        Ok(())
    }

    #[tokio::test]
    async fn sweep_reports_deleted_count() -> TestResult {
        let mut vouchers = MockVouchersService::new();

        vouchers
            .expect_delete_old_vouchers()
            .times(1)
            .returning(|| Ok(3));

        let sweeper = RetentionSweeper::new(Arc::new(vouchers));

        assert_eq!(sweeper.sweep().await?, 3);

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn run_survives_failed_sweeps_and_repeats_on_interval() -> TestResult {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut vouchers = MockVouchersService::new();

        let counter = Arc::clone(&calls);
        vouchers.expect_delete_old_vouchers().returning(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(VouchersServiceError::Sql(sqlx::Error::PoolTimedOut))
        });

        let cancel = CancellationToken::new();
        let sweeper = RetentionSweeper::new(Arc::new(vouchers)).with_interval(Duration::from_secs(60));

        let handle = tokio::spawn(sweeper.run(cancel.clone()));

        tokio::time::sleep(Duration::from_secs(150)).await;
        cancel.cancel();
        handle.await?;

        assert_eq!(calls.load(Ordering::SeqCst), 3, "expected sweeps at 0s, 60s and 120s");

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_the_wait() -> TestResult {
        let mut vouchers = MockVouchersService::new();

        vouchers
            .expect_delete_old_vouchers()
            .times(1)
            .returning(|| Ok(0));

        let cancel = CancellationToken::new();
        let sweeper = RetentionSweeper::new(Arc::new(vouchers));

        let handle = tokio::spawn(sweeper.run(cancel.clone()));

        tokio::time::sleep(Duration::from_secs(1)).await;

        let started = tokio::time::Instant::now();
        cancel.cancel();
        handle.await?;

        assert!(
            started.elapsed() < DEFAULT_SWEEP_INTERVAL,
            "sweeper kept waiting after cancellation"
        );

        Ok(())
    }

    #[tokio::test]
    async fn cancelled_token_skips_sweeping() -> TestResult {
        let mut vouchers = MockVouchersService::new();

        vouchers.expect_delete_old_vouchers().times(0);

        let cancel = CancellationToken::new();
        cancel.cancel();

        RetentionSweeper::new(Arc::new(vouchers)).run(cancel).await;

        Ok(())
    }
}
