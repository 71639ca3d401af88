//! Environment abstraction for deterministic testing.
//!
//! Decouples pattern engines from system time. Timer-driven engines (the
//! toast queue) read the clock through this trait, so simulation can use a
//! virtual clock advanced explicitly while production uses real system time.

use std::{future::Future, ops::Sub, time::Duration};

/// Abstract environment providing time and async sleeping.
///
/// # Invariants
///
/// Implementations MUST guarantee that `now()` never goes backwards.
pub trait Environment: Clone + Send + Sync + 'static {
    /// The specific instant type used by this environment.
    ///
    /// Production environments use `std::time::Instant`, while simulation
    /// environments use virtual time.
    type Instant: Copy + Ord + Send + Sync + std::fmt::Debug + Sub<Output = Duration>;

    /// Current time (monotonic).
    ///
    /// Subsequent calls must return times >= previous calls.
    fn now(&self) -> Self::Instant;

    /// Sleeps for the specified duration.
    ///
    /// Only used by host driver code that waits for the next timer deadline,
    /// never by the engines themselves.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;

    /// Wall-clock milliseconds since the Unix epoch.
    ///
    /// Used for creation timestamps shown to users and for identifier
    /// generation. Not required to be monotonic.
    fn wall_clock_millis(&self) -> u64;

    /// Add a duration to an instant.
    ///
    /// Separate from `Self::Instant: Add` so virtual clocks can keep their
    /// instant type opaque.
    fn deadline_after(&self, from: Self::Instant, duration: Duration) -> Self::Instant;
}

/// Production environment using system time.
///
/// Uses `std::time::Instant::now()` for time and `tokio::time::sleep()` for
/// async sleeping.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    type Instant = std::time::Instant;

    #[allow(clippy::disallowed_methods)]
    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    #[allow(clippy::disallowed_methods)]
    fn wall_clock_millis(&self) -> u64 {
        // A clock set before 1970 reports zero rather than failing.
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis() as u64)
    }

    fn deadline_after(&self, from: Self::Instant, duration: Duration) -> Self::Instant {
        from + duration
    }
}
