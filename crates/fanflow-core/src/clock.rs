//! Pacing clock for fixed-rate loops

use std::time::{Duration, Instant};

use tracing::warn;

/// Drift-correcting pacer for a fixed-period loop.
///
/// `elapse` subtracts the time spent in the loop body since the last
/// `mark` from its sleep, so the loop's average period converges on the
/// target even when individual iterations run long. An overrun is logged
/// under the clock's label and absorbed (zero-length sleep), never turned
/// into a catch-up burst or an error.
pub struct PacingClock {
    label: &'static str,
    last_mark: Option<Instant>,
}

impl PacingClock {
    /// Create a clock. `label` tags the overrun warning.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            last_mark: None,
        }
    }

    /// Record "now" as the reference point for the next `elapse` call.
    pub fn mark(&mut self) -> Instant {
        let now = Instant::now();
        self.last_mark = Some(now);
        now
    }

    /// Sleep out the remainder of `period` since the last mark, then mark
    /// again. Without a prior mark the full period is slept.
    pub fn elapse(&mut self, period: Duration) -> Instant {
        let elapsed = match self.last_mark {
            Some(mark) => {
                let elapsed = mark.elapsed();
                if elapsed > period {
                    warn!("Can't keep up! ({})", self.label);
                }
                elapsed
            }
            None => Duration::ZERO,
        };

        std::thread::sleep(period.saturating_sub(elapsed));
        self.mark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapse_sleeps_full_period_when_idle() {
        let mut clock = PacingClock::new("test");
        clock.mark();

        let start = Instant::now();
        clock.elapse(Duration::from_millis(100));
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(95), "slept only {elapsed:?}");
        assert!(elapsed < Duration::from_millis(400), "slept {elapsed:?}");
    }

    #[test]
    fn test_elapse_returns_promptly_after_overrun() {
        let mut clock = PacingClock::new("test");
        clock.mark();
        std::thread::sleep(Duration::from_millis(60));

        // The 30ms period is already spent twice over; the sleep floor is zero.
        let start = Instant::now();
        clock.elapse(Duration::from_millis(30));
        assert!(start.elapsed() < Duration::from_millis(20));
    }

    #[test]
    fn test_elapse_re_marks() {
        let mut clock = PacingClock::new("test");
        let first = clock.mark();
        let second = clock.elapse(Duration::from_millis(10));
        assert!(second > first);
        assert_eq!(clock.last_mark, Some(second));
    }
}
