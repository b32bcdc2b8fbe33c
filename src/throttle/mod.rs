//! Request throttling subsystem.
//!
//! # Data Flow
//! ```text
//! request handler / middleware
//!     → try_admit(identifier, max_requests, window)
//!     → registry.rs (prune stale timestamps, count, append on admit)
//!     → allow / deny
//!
//! Optional sweeper task:
//!     → sweep(window) drops identifiers with nothing left in the window
//! ```
//!
//! The module-level functions operate on one lazily created, process-wide
//! registry. Code that wants isolated state (tests, multiple limits) builds
//! its own [`RequestThrottle`].

pub mod clock;
pub mod registry;
pub mod sweeper;

use std::sync::OnceLock;
use std::time::Duration;

pub use clock::{Clock, ManualClock, SystemClock};
pub use registry::{
    Admission, RequestThrottle, ThrottleEntry, ThrottlePolicy, DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW,
};
pub use sweeper::Sweeper;

static GLOBAL: OnceLock<RequestThrottle> = OnceLock::new();

/// The process-wide registry.
pub fn global() -> &'static RequestThrottle {
    GLOBAL.get_or_init(RequestThrottle::new)
}

/// Admit or deny a request against the process-wide registry.
pub fn try_admit(identifier: &str, max_requests: u32, window: Duration) -> bool {
    global().try_admit(identifier, max_requests, window)
}

/// Remaining quota in the process-wide registry.
pub fn remaining_quota(identifier: &str, max_requests: u32, window: Duration) -> u32 {
    global().remaining_quota(identifier, max_requests, window)
}

/// Forget `identifier` in the process-wide registry.
pub fn clear(identifier: &str) {
    global().clear(identifier);
}

/// Empties the process-wide registry.
pub fn clear_all() {
    global().clear_all();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_registry_round_trip() {
        let id = "global-registry-test";

        assert_eq!(remaining_quota(id, DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW), 10);
        assert!(try_admit(id, DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW));
        assert!(try_admit(id, DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW));
        assert_eq!(remaining_quota(id, DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW), 8);

        clear(id);
        assert_eq!(remaining_quota(id, DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW), 10);
    }

    #[test]
    fn test_global_is_shared() {
        let id = "global-shared-test";
        assert!(global().try_admit(id, 1, DEFAULT_WINDOW));
        assert!(!try_admit(id, 1, DEFAULT_WINDOW));
        clear(id);
    }
}
