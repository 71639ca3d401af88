//! Virtual clock implementing [`Environment`].
//!
//! Time only moves when a test calls [`SimEnv::advance`] or awaits
//! [`Environment::sleep`], which advances the clock by the requested amount
//! and completes immediately. Clones share one clock, so a test can hold a
//! handle while an engine owns another.

use std::{
    future::{Future, ready},
    ops::Sub,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tessera_core::Environment;

/// Wall-clock value reported at virtual time zero (2024-01-01T00:00:00Z).
pub const SIM_EPOCH_MILLIS: u64 = 1_704_067_200_000;

/// Point on the virtual timeline, as nanoseconds since the clock started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SimInstant(u64);

impl SimInstant {
    /// Time elapsed since the clock started.
    pub fn since_start(self) -> Duration {
        Duration::from_nanos(self.0)
    }
}

impl Sub for SimInstant {
    type Output = Duration;

    fn sub(self, earlier: Self) -> Duration {
        Duration::from_nanos(self.0.saturating_sub(earlier.0))
    }
}

/// Deterministic environment for tests.
#[derive(Debug, Clone, Default)]
pub struct SimEnv {
    nanos: Arc<AtomicU64>,
}

impl SimEnv {
    /// Clock at virtual time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward.
    pub fn advance(&self, duration: Duration) {
        self.nanos.fetch_add(to_nanos(duration), Ordering::SeqCst);
    }

    /// Time elapsed since the clock started.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

impl Environment for SimEnv {
    type Instant = SimInstant;

    fn now(&self) -> SimInstant {
        SimInstant(self.nanos.load(Ordering::SeqCst))
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        self.advance(duration);
        ready(())
    }

    fn wall_clock_millis(&self) -> u64 {
        SIM_EPOCH_MILLIS + self.elapsed().as_millis() as u64
    }

    fn deadline_after(&self, from: SimInstant, duration: Duration) -> SimInstant {
        SimInstant(from.0.saturating_add(to_nanos(duration)))
    }
}

fn to_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_only_moves_when_advanced() {
        let env = SimEnv::new();
        let start = env.now();
        assert_eq!(env.now(), start);

        env.advance(Duration::from_millis(1500));
        assert_eq!(env.now() - start, Duration::from_millis(1500));
        assert_eq!(env.wall_clock_millis(), SIM_EPOCH_MILLIS + 1500);
    }

    #[test]
    fn clones_share_the_clock() {
        let env = SimEnv::new();
        let handle = env.clone();
        handle.advance(Duration::from_secs(2));
        assert_eq!(env.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn sleep_advances_virtual_time() {
        let env = SimEnv::new();
        env.sleep(Duration::from_millis(250)).await;
        assert_eq!(env.elapsed(), Duration::from_millis(250));
    }

    #[test]
    fn deadlines_saturate() {
        let env = SimEnv::new();
        let far = env.deadline_after(env.now(), Duration::MAX);
        assert!(far > env.now());
    }
}
