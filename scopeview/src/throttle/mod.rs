//! Viewport change rate limiting.
//!
//! Plot widgets emit range changes on every mouse move. Recomputing the
//! visible tile set that often is wasted work, so changes are coalesced
//! to a fixed rate with the latest range winning.
//!
//! - [`RateLimiter`] - Clock-injected coalescer, no I/O
//! - [`spawn_viewport_pump`] - Tokio task feeding a viewer from a channel

mod limiter;
mod pump;

pub use limiter::RateLimiter;
pub use pump::{spawn_viewport_pump, PumpStats, DEFAULT_RATE_LIMIT_HZ};
