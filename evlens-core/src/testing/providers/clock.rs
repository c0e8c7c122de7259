//! Clock provider for time abstraction.
//!
//! The ingest loop measures its time slices through a [`ClockProvider`], so
//! tests can drive slicing with a [`MockClock`] while production code uses
//! the [`RealClock`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Provider trait for time operations.
pub trait ClockProvider: Send + Sync {
    /// Get a monotonic instant in nanoseconds (for measuring durations).
    fn now(&self) -> u64;

    /// Advance time by the specified duration (mock-only operation).
    ///
    /// Real implementations do nothing.
    fn advance(&self, duration: Duration);

    /// Time elapsed since an earlier [`now`](Self::now) reading.
    fn elapsed_since(&self, start: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(start))
    }
}

/// Real clock backed by a monotonic [`Instant`].
#[derive(Debug, Clone)]
pub struct RealClock {
    start: Instant,
}

impl RealClock {
    /// Create a new real clock.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for RealClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockProvider for RealClock {
    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }

    fn advance(&self, _duration: Duration) {
        // Real clock cannot be manually advanced
    }
}

/// Mock clock for testing with controllable time.
///
/// Starts at zero and only moves when [`advance`](ClockProvider::advance)
/// is called.
#[derive(Debug, Default)]
pub struct MockClock {
    /// Current time in nanoseconds since start.
    current_nanos: AtomicU64,
}

impl MockClock {
    /// Create a mock clock starting at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current monotonic time in nanoseconds.
    pub fn current_nanos(&self) -> u64 {
        self.current_nanos.load(Ordering::SeqCst)
    }
}

impl ClockProvider for MockClock {
    fn now(&self) -> u64 {
        self.current_nanos.load(Ordering::SeqCst)
    }

    fn advance(&self, duration: Duration) {
        self.current_nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_clock_advances() {
        let clock = RealClock::new();
        let t1 = clock.now();
        std::thread::sleep(Duration::from_millis(10));
        let t2 = clock.now();
        assert!(t2 > t1);
        assert!(clock.elapsed_since(t1) >= Duration::from_millis(10));
    }

    #[test]
    fn mock_clock_does_not_advance_automatically() {
        let clock = MockClock::new();
        let t1 = clock.now();
        std::thread::sleep(Duration::from_millis(10));
        let t2 = clock.now();
        assert_eq!(t1, t2);
    }

    #[test]
    fn mock_clock_advance() {
        let clock = MockClock::new();
        assert_eq!(clock.now(), 0);

        clock.advance(Duration::from_secs(1));
        assert_eq!(clock.now(), 1_000_000_000);

        clock.advance(Duration::from_millis(500));
        assert_eq!(clock.current_nanos(), 1_500_000_000);
        assert_eq!(clock.elapsed_since(1_000_000_000), Duration::from_millis(500));
    }
}
