//! Per-client rate limit state and admission decisions.

use std::time::{Duration, Instant};

/// Default number of requests allowed per window.
pub const DEFAULT_MAX_REQUESTS: u64 = 10;
/// Default sliding window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(60_000);
/// Default block applied once a client exceeds the threshold.
pub const DEFAULT_BLOCK_DURATION: Duration = Duration::from_millis(3_600_000);
/// Default capacity of the client store.
pub const DEFAULT_MAX_ENTRIES: usize = 5_000;
/// Default period of the background sweep.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_millis(300_000);

/// Parameters of a [`RateLimiter`](super::RateLimiter), fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSettings {
    /// Requests allowed before a client is blocked
    pub max_requests: u64,
    /// Gap after which a client's counter starts over
    pub window: Duration,
    /// How long a client stays blocked after exceeding `max_requests`
    pub block_duration: Duration,
    /// Number of clients kept after a sweep
    pub max_entries: usize,
    /// Period of the background sweep
    pub sweep_interval: Duration,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_MAX_REQUESTS,
            window: DEFAULT_WINDOW,
            block_duration: DEFAULT_BLOCK_DURATION,
            max_entries: DEFAULT_MAX_ENTRIES,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

/// Rate limit state tracked for one client identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientRecord {
    /// Requests observed in the current window
    pub count: u64,
    /// Time of the most recent counted request
    pub last_request: Instant,
    /// End of an active or expired block, if one was ever set
    pub blocked_until: Option<Instant>,
}

impl ClientRecord {
    /// A record for a client seen for the first time at `now`.
    pub fn first_seen(now: Instant) -> Self {
        Self {
            count: 1,
            last_request: now,
            blocked_until: None,
        }
    }

    /// Whether the client is blocked at `now`.
    ///
    /// An expired `blocked_until` behaves exactly like an absent one.
    pub fn is_blocked(&self, now: Instant) -> bool {
        self.blocked_until.is_some_and(|until| until > now)
    }

    /// Count a request made at `now`, restarting the window when the gap
    /// since the previous request exceeds `window`.
    pub fn observe(&mut self, now: Instant, window: Duration) {
        if now.saturating_duration_since(self.last_request) > window {
            self.count = 1;
        } else {
            self.count += 1;
        }
        self.last_request = now;
    }
}

/// Outcome of an admission check.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The request may continue down the pipeline
    Admitted,
    /// The request is refused; the client should wait `retry_after_secs`
    Rejected { retry_after_secs: u64 },
}

impl Decision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Decision::Admitted)
    }

    /// Retry guidance in whole seconds, present only on rejection.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Decision::Admitted => None,
            Decision::Rejected { retry_after_secs } => Some(*retry_after_secs),
        }
    }
}

/// Round a duration up to whole seconds.
pub(crate) fn ceil_secs(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}
