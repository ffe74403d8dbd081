//! Exponential backoff state.

use std::time::Duration;

/// Default factor the retry interval grows by after every failed attempt.
pub const DEFAULT_MULTIPLIER: f64 = 1.5;

/// Delay sequence for one logical call.
///
/// Each call builds its own `Backoff`, so concurrent calls never share or
/// disturb each other's intervals. The `n`-th delay is
/// `initial * multiplier^(n-1)`, optionally capped at `max`. No jitter.
///
/// ```
/// use std::time::Duration;
/// use trivio::Backoff;
///
/// let delays: Vec<_> = Backoff::new(Duration::from_secs(2), 1.5).take(3).collect();
/// assert_eq!(delays, [Duration::from_secs(2), Duration::from_secs(3), Duration::from_millis(4500)]);
/// ```
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    multiplier: f64,
    max: Option<Duration>,
}

impl Backoff {
    /// Start a sequence at `initial`. Non-finite or non-positive multipliers
    /// fall back to a constant interval.
    pub fn new(initial: Duration, multiplier: f64) -> Self {
        let multiplier = if multiplier.is_finite() && multiplier > 0.0 {
            multiplier
        } else {
            1.0
        };
        Self {
            next: initial,
            multiplier,
            max: None,
        }
    }

    /// Cap every delay at `max`.
    pub fn with_max(mut self, max: Duration) -> Self {
        self.max = Some(max);
        self
    }

    /// Returns the delay to wait now and advances the sequence.
    pub fn next_delay(&mut self) -> Duration {
        let current = match self.max {
            Some(max) => self.next.min(max),
            None => self.next,
        };
        let grown = self.next.as_secs_f64() * self.multiplier;
        self.next = Duration::try_from_secs_f64(grown).unwrap_or(Duration::MAX);
        current
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        Some(self.next_delay())
    }
}
