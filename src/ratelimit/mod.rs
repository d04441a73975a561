//! Per-client rate limiting: admission decisions, state and background sweep.

mod limiter;
mod record;
mod sweeper;

pub use limiter::{RateLimiter, SweepReport};
pub use record::{ClientRecord, Decision, RateLimitSettings};
pub use sweeper::SweeperHandle;
