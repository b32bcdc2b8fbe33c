//! Periodic removal of idle identifiers.
//!
//! Off by default: without it the registry keeps one entry per identifier
//! ever seen. When enabled, each tick prunes every entry and drops those with
//! nothing left in the window, which cannot change any admission decision.

use std::time::Duration;
use tokio::sync::broadcast;

use crate::observability::metrics;
use crate::throttle::RequestThrottle;

/// Background task sweeping a [`RequestThrottle`].
#[derive(Debug, Clone)]
pub struct Sweeper {
    throttle: RequestThrottle,
    window: Duration,
    interval: Duration,
}

impl Sweeper {
    pub fn new(throttle: RequestThrottle, window: Duration, interval: Duration) -> Self {
        Self {
            throttle,
            window,
            interval,
        }
    }

    /// Run one sweep and record it.
    pub fn sweep_once(&self) -> usize {
        let removed = self.throttle.sweep(self.window);
        let remaining = self.throttle.len();
        metrics::record_sweep(removed, remaining);

        if removed > 0 {
            tracing::debug!(removed, remaining, "Swept idle throttle entries");
        }
        removed
    }

    /// Sweep every `interval` until `shutdown` fires.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        tracing::info!(interval = ?self.interval, "Throttle sweeper started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep_once();
                }
                _ = shutdown.recv() => break,
            }
        }
        tracing::info!("Throttle sweeper stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Shutdown;
    use crate::throttle::ManualClock;

    const WINDOW: Duration = Duration::from_millis(1000);

    #[test]
    fn test_sweep_once_keeps_active_entries() {
        let clock = ManualClock::new(0);
        let throttle = RequestThrottle::with_clock(clock.clone());
        throttle.try_admit("old", 5, WINDOW);
        clock.set(800);
        throttle.try_admit("new", 5, WINDOW);

        clock.set(1500);
        let sweeper = Sweeper::new(throttle.clone(), WINDOW, Duration::from_secs(60));
        assert_eq!(sweeper.sweep_once(), 1);
        assert_eq!(throttle.remaining_quota("new", 5, WINDOW), 4);
    }

    #[tokio::test]
    async fn test_run_sweeps_until_shutdown() {
        let clock = ManualClock::new(0);
        let throttle = RequestThrottle::with_clock(clock.clone());
        throttle.try_admit("idle", 5, WINDOW);
        clock.set(5_000);

        let shutdown = Shutdown::new();
        let sweeper = Sweeper::new(throttle.clone(), WINDOW, Duration::from_millis(10));
        let handle = tokio::spawn(sweeper.run(shutdown.subscribe()));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(throttle.is_empty());

        shutdown.trigger();
        handle.await.unwrap();
    }
}
