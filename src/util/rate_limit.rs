//! Rate limiting utilities

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter type alias
pub type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Create a rate limiter with the specified requests per second
pub fn create_limiter(requests_per_second: u32) -> Arc<Limiter> {
    let quota = Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

/// Camera frame rate limit per session. The client streams at ten
/// frames per second; the headroom absorbs bursts after a stall.
pub const FRAME_RATE_LIMIT: u32 = 20;

/// Per-session rate limiter state
#[derive(Clone)]
pub struct SessionRateLimiter {
    frame_limiter: Arc<Limiter>,
}

impl SessionRateLimiter {
    pub fn new() -> Self {
        Self {
            frame_limiter: create_limiter(FRAME_RATE_LIMIT),
        }
    }

    /// Check if a camera frame is allowed (returns true if allowed)
    pub fn check_frame(&self) -> bool {
        self.frame_limiter.check().is_ok()
    }
}

impl Default for SessionRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_burst_past_the_quota_is_denied() {
        let limiter = SessionRateLimiter::new();
        let allowed = (0..FRAME_RATE_LIMIT * 2)
            .filter(|_| limiter.check_frame())
            .count() as u32;
        // The full burst allowance passes, the excess does not
        assert!(allowed >= FRAME_RATE_LIMIT);
        assert!(allowed < FRAME_RATE_LIMIT * 2);
    }

    #[test]
    fn separate_sessions_do_not_share_a_quota() {
        let first = SessionRateLimiter::new();
        for _ in 0..FRAME_RATE_LIMIT * 2 {
            first.check_frame();
        }
        assert!(SessionRateLimiter::new().check_frame());
    }
}
