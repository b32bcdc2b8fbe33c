//! Per-identifier fixed-window request counter.
//!
//! # Responsibilities
//! - Track admission timestamps per identifier
//! - Prune timestamps that fell out of the trailing window before every decision
//! - Report remaining quota and time until the next slot frees up
//!
//! # Design Decisions
//! - The window is always relative to "now", never aligned to calendar boundaries
//! - A timestamp exactly `window` old is outside the window
//! - Each identifier's entry is mutated under the map's shard guard, so
//!   prune + check + append is atomic per identifier
//! - Entries are only removed by `clear`, `clear_all` or an explicit `sweep`

use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use crate::throttle::clock::{Clock, SystemClock};

/// Default number of admissions per window.
pub const DEFAULT_MAX_REQUESTS: u32 = 10;

/// Default trailing window.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(60_000);

/// Limit applied to one identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottlePolicy {
    /// Admissions permitted within one window. Zero denies everything.
    pub max_requests: u32,
    /// Length of the trailing window.
    pub window: Duration,
}

impl ThrottlePolicy {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }
}

/// Outcome of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub allowed: bool,
    /// Quota left in the window once the decision is applied.
    pub remaining: u32,
}

/// Admission history for one identifier.
#[derive(Debug, Clone)]
pub struct ThrottleEntry {
    timestamps: VecDeque<u64>,
    last_reset: u64,
}

impl ThrottleEntry {
    fn new(now: u64) -> Self {
        Self {
            timestamps: VecDeque::new(),
            last_reset: now,
        }
    }

    /// Drop every timestamp that is not strictly younger than `window_ms`.
    fn prune(&mut self, now: u64, window_ms: u64) {
        self.timestamps
            .retain(|&ts| now.saturating_sub(ts) < window_ms);
    }

    /// Admission instants still retained, oldest first.
    pub fn timestamps(&self) -> impl Iterator<Item = u64> + '_ {
        self.timestamps.iter().copied()
    }

    /// Instant the entry was created.
    pub fn last_reset(&self) -> u64 {
        self.last_reset
    }
}

/// Registry of throttle entries keyed by identifier.
///
/// Cloning is cheap and clones share state.
#[derive(Debug, Clone)]
pub struct RequestThrottle {
    entries: Arc<DashMap<String, ThrottleEntry>>,
    clock: Arc<dyn Clock>,
}

impl Default for RequestThrottle {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestThrottle {
    /// Create an empty registry reading the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Create an empty registry reading `clock`.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            clock: Arc::new(clock),
        }
    }

    /// Admit or deny one request for `identifier`.
    ///
    /// Stale timestamps are pruned on both paths; only an admission appends.
    pub fn try_admit(&self, identifier: &str, max_requests: u32, window: Duration) -> bool {
        self.check(identifier, max_requests, window).allowed
    }

    /// [`try_admit`](Self::try_admit), also reporting the quota left after
    /// the decision. Both come from the same guard on the entry.
    pub fn check(&self, identifier: &str, max_requests: u32, window: Duration) -> Admission {
        let now = self.clock.now_millis();
        let window_ms = window_millis(window);

        let mut entry = self
            .entries
            .entry(identifier.to_owned())
            .or_insert_with(|| ThrottleEntry::new(now));
        entry.prune(now, window_ms);

        let allowed = entry.timestamps.len() < max_requests as usize;
        if allowed {
            entry.timestamps.push_back(now);
        }

        let used = u32::try_from(entry.timestamps.len()).unwrap_or(u32::MAX);
        Admission {
            allowed,
            remaining: max_requests.saturating_sub(used),
        }
    }

    /// [`try_admit`](Self::try_admit) with a policy value.
    pub fn admit(&self, identifier: &str, policy: &ThrottlePolicy) -> bool {
        self.try_admit(identifier, policy.max_requests, policy.window)
    }

    /// Admissions still available to `identifier` in the current window.
    pub fn remaining_quota(&self, identifier: &str, max_requests: u32, window: Duration) -> u32 {
        let Some(mut entry) = self.entries.get_mut(identifier) else {
            return max_requests;
        };

        entry.prune(self.clock.now_millis(), window_millis(window));
        let used = u32::try_from(entry.timestamps.len()).unwrap_or(u32::MAX);
        max_requests.saturating_sub(used)
    }

    /// Time until the oldest retained admission leaves the window.
    ///
    /// Returns `None` when nothing is retained for `identifier`.
    pub fn retry_after(&self, identifier: &str, window: Duration) -> Option<Duration> {
        let mut entry = self.entries.get_mut(identifier)?;
        let now = self.clock.now_millis();
        let window_ms = window_millis(window);

        entry.prune(now, window_ms);
        let oldest = entry.timestamps.iter().copied().min()?;
        let expires_at = oldest.saturating_add(window_ms);
        Some(Duration::from_millis(expires_at.saturating_sub(now)))
    }

    /// Snapshot of the entry for `identifier`, if one exists.
    pub fn entry(&self, identifier: &str) -> Option<ThrottleEntry> {
        self.entries.get(identifier).map(|e| e.value().clone())
    }

    /// Forget everything about `identifier`.
    pub fn clear(&self, identifier: &str) {
        self.entries.remove(identifier);
    }

    /// Forget every identifier.
    pub fn clear_all(&self) {
        self.entries.clear();
    }

    /// Prune every entry and drop the ones left empty.
    ///
    /// Returns how many identifiers were removed.
    pub fn sweep(&self, window: Duration) -> usize {
        let now = self.clock.now_millis();
        let window_ms = window_millis(window);
        let mut removed = 0;

        self.entries.retain(|_, entry| {
            entry.prune(now, window_ms);
            let keep = !entry.timestamps.is_empty();
            if !keep {
                removed += 1;
            }
            keep
        });

        removed
    }

    /// Number of identifiers currently tracked.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn window_millis(window: Duration) -> u64 {
    u64::try_from(window.as_millis()).unwrap_or(u64::MAX)
}
