//! Core rate limiter implementation.

use std::collections::HashMap;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::record::{ceil_secs, ClientRecord, Decision, RateLimitSettings};

/// Result of one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Clients dropped because the store was over capacity
    pub evicted: usize,
    /// Expired blocks that were cleared
    pub unblocked: usize,
    /// Clients left in the store
    pub remaining: usize,
}

/// Per-client sliding window rate limiter with temporary blocking.
///
/// All state lives behind a single lock, so every `admit` is one atomic
/// read-modify-write and a `sweep` never interleaves with it.
pub struct RateLimiter {
    settings: RateLimitSettings,
    /// Client state indexed by client identifier
    clients: Mutex<HashMap<String, ClientRecord>>,
}

impl RateLimiter {
    /// Create a rate limiter with the given settings.
    pub fn new(settings: RateLimitSettings) -> Self {
        Self {
            settings,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &RateLimitSettings {
        &self.settings
    }

    /// Decide whether a request from `client_id` arriving at `now` may proceed.
    ///
    /// A client that is currently blocked is rejected without touching its
    /// counter. Otherwise the request is counted first, and the client is
    /// blocked for `block_duration` if that pushes it over `max_requests`.
    pub fn admit(&self, client_id: &str, now: Instant) -> Decision {
        let mut clients = self.clients.lock();

        if let Some(record) = clients.get(client_id) {
            if let Some(until) = record.blocked_until.filter(|until| *until > now) {
                let retry_after_secs = ceil_secs(until - now);
                trace!(
                    client_id = %client_id,
                    retry_after_secs,
                    "Rejecting blocked client"
                );
                return Decision::Rejected { retry_after_secs };
            }
        }

        let window = self.settings.window;
        let record = clients
            .entry(client_id.to_owned())
            .and_modify(|record| record.observe(now, window))
            .or_insert_with(|| ClientRecord::first_seen(now));

        if record.count > self.settings.max_requests {
            record.blocked_until = Some(now + self.settings.block_duration);
            debug!(
                client_id = %client_id,
                count = record.count,
                block_secs = self.settings.block_duration.as_secs(),
                "Rate limit exceeded, blocking client"
            );
            return Decision::Rejected {
                retry_after_secs: ceil_secs(self.settings.block_duration),
            };
        }

        trace!(client_id = %client_id, count = record.count, "Request admitted");
        Decision::Admitted
    }

    /// Evict the least recently active clients beyond `max_entries` and
    /// clear blocks that have expired by `now`.
    ///
    /// Clients with the same `last_request` are ranked by identifier so the
    /// survivors are deterministic.
    pub fn sweep(&self, now: Instant) -> SweepReport {
        let mut clients = self.clients.lock();
        let mut report = SweepReport::default();

        if clients.len() > self.settings.max_entries {
            let mut ranked: Vec<(Instant, String)> = clients
                .iter()
                .map(|(id, record)| (record.last_request, id.clone()))
                .collect();
            ranked.sort_unstable_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

            for (_, id) in ranked.into_iter().skip(self.settings.max_entries) {
                clients.remove(&id);
                report.evicted += 1;
            }
        }

        for record in clients.values_mut() {
            if record.blocked_until.is_some_and(|until| until <= now) {
                record.blocked_until = None;
                report.unblocked += 1;
            }
        }

        report.remaining = clients.len();
        report
    }

    /// Get a snapshot of the state tracked for a client.
    ///
    /// Returns `None` if the client has never been seen or was evicted.
    pub fn record(&self, client_id: &str) -> Option<ClientRecord> {
        self.clients.lock().get(client_id).copied()
    }

    /// Get the number of tracked clients.
    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    /// Forget every client.
    ///
    /// This is primarily useful for testing.
    pub fn clear(&self) {
        self.clients.lock().clear();
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitSettings::default())
    }
}
