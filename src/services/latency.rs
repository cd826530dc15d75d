//! Simulated network latency.
//!
//! Every persistence and encryption call suspends through [`Latency::wait`],
//! so callers always observe an asynchronous, non-instant operation even
//! though the backing store is local.

use std::time::Duration;

use ring::rand::{SecureRandom, SystemRandom};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Latency {
    base: Duration,
    jitter: Duration,
}

impl Latency {
    /// Yields to the scheduler but lets no time pass.
    pub const NONE: Latency = Latency {
        base: Duration::ZERO,
        jitter: Duration::ZERO,
    };

    pub fn from_millis(base_ms: u64, jitter_ms: u64) -> Self {
        Self {
            base: Duration::from_millis(base_ms),
            jitter: Duration::from_millis(jitter_ms),
        }
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    /// Suspends the calling task for `base` plus a random share of `jitter`.
    pub async fn wait(&self) {
        let delay = self.base + self.sample_jitter();
        if delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(delay).await;
        }
    }

    fn sample_jitter(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return Duration::ZERO;
        }
        let mut bytes = [0u8; 8];
        // A failed draw only loses the jitter, never the base delay.
        if SystemRandom::new().fill(&mut bytes).is_err() {
            return Duration::ZERO;
        }
        Duration::from_millis(u64::from_le_bytes(bytes) % (jitter_ms + 1))
    }
}
