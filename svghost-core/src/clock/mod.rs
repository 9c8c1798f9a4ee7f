//! `performance.timeOrigin` / `performance.now()` for the guest.
//!
//! The origin is wall-clock milliseconds since the UNIX epoch, captured once. `now` is
//! monotonic milliseconds elapsed since that capture, with sub-millisecond precision.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

#[derive(Copy, Clone, Debug)]
pub struct Clock {
    origin_ms: f64,
    start: Instant,
}

impl Clock {
    pub fn start() -> Self {
        let origin_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64()
            * 1e3;
        Self {
            origin_ms,
            start: Instant::now(),
        }
    }

    /// Milliseconds since the UNIX epoch at the moment the clock started.
    pub fn time_origin(&self) -> f64 {
        self.origin_ms
    }

    /// Milliseconds since [`Clock::time_origin`].
    pub fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1e3
    }
}
