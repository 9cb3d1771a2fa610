use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, Utc};

/// A simple clock abstraction for deterministic time in services and tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

/// Time-based id source: millisecond timestamps, bumped so that no value is
/// handed out twice even when the clock stands still.
#[derive(Debug, Default)]
pub struct IdSequence {
    last: AtomicI64,
}

impl IdSequence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id, `>= clock.now()` in milliseconds and strictly greater than the previous one.
    pub fn next(&self, clock: &Clock) -> i64 {
        let now = clock.now().timestamp_millis();
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_strictly_increasing_on_fixed_clock() {
        let seq = IdSequence::new();
        let clock = fixed_clock();
        let a = seq.next(&clock);
        let b = seq.next(&clock);
        assert_eq!(a, FIXED_TEST_TIMESTAMP * 1000);
        assert_eq!(b, a + 1);
    }

    #[test]
    fn sequence_follows_clock_forward() {
        let seq = IdSequence::new();
        let mut clock = fixed_clock();
        let a = seq.next(&clock);
        clock.advance(Duration::seconds(1));
        assert_eq!(seq.next(&clock), a + 1000);
    }
}
