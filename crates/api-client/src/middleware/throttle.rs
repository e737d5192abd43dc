//! Minimum-interval throttle for upstream calls
//!
//! The upstream rejects clients that call it too often, so every request a
//! client issues goes through one shared [`Throttle`]:
//! - only one call holds the throttle at a time
//! - a call may start no earlier than `interval` after the previous call
//!   started, however quickly that call returned
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use tikwm_api_client::middleware::Throttle;
//!
//! # async fn demo() {
//! let throttle = Throttle::new(Duration::from_millis(1100));
//!
//! let permit = throttle.acquire().await;
//! // issue the request while holding the permit
//! drop(permit);
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::Instant;

/// Serializing gate that spaces call starts by a fixed interval
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    next_slot: Arc<Mutex<Instant>>,
}

impl Throttle {
    /// Create a throttle whose first slot is available immediately
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Configured spacing between call starts
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for the next slot and take exclusive ownership of it
    ///
    /// The slot after this one is reserved at `now + interval` as soon as the
    /// permit is granted, so a cancelled or failed call still consumes its
    /// slot. Waiters are not served in any guaranteed order.
    pub async fn acquire(&self) -> ThrottlePermit {
        let mut slot = Arc::clone(&self.next_slot).lock_owned().await;
        tokio::time::sleep_until(*slot).await;

        let started = Instant::now();
        *slot = started + self.interval;

        ThrottlePermit {
            _slot: slot,
            started,
        }
    }
}

/// Exclusive right to issue one upstream call; released on drop
#[derive(Debug)]
pub struct ThrottlePermit {
    _slot: OwnedMutexGuard<Instant>,
    started: Instant,
}

impl ThrottlePermit {
    /// When the permit was granted
    #[must_use]
    pub fn started(&self) -> Instant {
        self.started
    }
}
