use crate::fetcher::RateFetcher;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, info};

pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Owns the repeating poll task until [`Scheduler::shutdown`] is called.
///
/// Every tick spawns its own cycle, so a slow fetch does not hold back the
/// next one and cycles may overlap.
pub struct Scheduler {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Scheduler {
    /// The first cycle runs one full `period` after start.
    pub fn start(fetcher: Arc<RateFetcher>, period: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        debug!("Starting poll cycle");
                        let fetcher = Arc::clone(&fetcher);
                        tokio::spawn(async move {
                            fetcher.run_cycle().await;
                        });
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
            debug!("Poll loop stopped");
        });

        info!(?period, "Scheduled rate polling");
        Self {
            shutdown_tx,
            handle,
        }
    }

    /// Stops scheduling new cycles. Cycles already in flight are left to
    /// finish on their own.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.handle.await {
            error!(error = %e, "Poll loop terminated abnormally");
        }
        info!("Rate polling stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::RestartAction;
    use crate::core::rate::{RateSource, Record};
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PERIOD: Duration = Duration::from_secs(10);

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
        delay: Duration,
        fail: bool,
    }

    #[async_trait]
    impl RateSource for CountingSource {
        async fn fetch_series(&self) -> Result<Vec<Record>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(anyhow!("timeout"));
            }
            Ok(vec![Record::new("15/10/2026", "5.47")])
        }
    }

    #[derive(Default)]
    struct CountingAction(AtomicUsize);

    #[async_trait]
    impl RestartAction for CountingAction {
        async fn restart(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn start(source: Arc<CountingSource>, action: Arc<CountingAction>) -> Scheduler {
        let fetcher = RateFetcher::with_today(source, action, || "16/10/2026".to_string());
        Scheduler::start(Arc::new(fetcher), PERIOD)
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_cycle_waits_one_period() {
        let source = Arc::new(CountingSource::default());
        let action = Arc::new(CountingAction::default());
        let scheduler = start(source.clone(), action.clone());

        tokio::time::sleep(Duration::from_secs(9)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(action.0.load(Ordering::SeqCst), 1);

        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycles_repeat_every_period() {
        let source = Arc::new(CountingSource::default());
        let action = Arc::new(CountingAction::default());
        let scheduler = start(source.clone(), action.clone());

        tokio::time::sleep(Duration::from_secs(35)).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert_eq!(action.0.load(Ordering::SeqCst), 3);
        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_cycles_overlap() {
        let source = Arc::new(CountingSource {
            delay: Duration::from_secs(25),
            ..Default::default()
        });
        let action = Arc::new(CountingAction::default());
        let scheduler = start(source.clone(), action.clone());

        tokio::time::sleep(Duration::from_secs(31)).await;

        // Ticks at 10s, 20s and 30s all started; only the first has finished
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert_eq!(action.0.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(action.0.load(Ordering::SeqCst), 1);
        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_cycles_do_not_stop_the_timer() {
        let source = Arc::new(CountingSource {
            fail: true,
            ..Default::default()
        });
        let action = Arc::new(CountingAction::default());
        let scheduler = start(source.clone(), action.clone());

        tokio::time::sleep(Duration::from_secs(25)).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(action.0.load(Ordering::SeqCst), 0);
        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_future_cycles() {
        let source = Arc::new(CountingSource::default());
        let action = Arc::new(CountingAction::default());
        let scheduler = start(source.clone(), action.clone());

        tokio::time::sleep(Duration::from_secs(15)).await;
        scheduler.shutdown().await;

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
