use std::time::{Duration, Instant};

use embedded_hal_async::delay::DelayNs;
use sentry_common::Clock;
use tokio::time::sleep;

/// Milliseconds since the simulator started.
pub struct HostClock {
    boot: Instant,
}

impl HostClock {
    pub fn new() -> Self {
        Self {
            boot: Instant::now(),
        }
    }
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for HostClock {
    fn now_ms(&self) -> f64 {
        self.boot.elapsed().as_secs_f64() * 1e3
    }
}

pub struct Delay;

impl DelayNs for Delay {
    async fn delay_ns(&mut self, ns: u32) {
        sleep(Duration::from_nanos(ns as u64)).await;
    }

    async fn delay_ms(&mut self, ms: u32) {
        sleep(Duration::from_millis(ms as u64)).await;
    }
}
