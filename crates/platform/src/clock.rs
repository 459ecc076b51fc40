//! Monotonic microsecond clock
//!
//! Diagnostics measure transfer time with a 32-bit microsecond counter that
//! wraps roughly every 71 minutes. All elapsed-time arithmetic goes through
//! [`ticks_diff`] so a single wrap inside a measured interval is harmless.

/// Wrapping microsecond counter.
pub trait MonotonicClock {
    /// Current tick value in microseconds (wraps at `u32::MAX`)
    fn now_us(&self) -> u32;

    /// Microseconds elapsed since `start`.
    fn elapsed_us(&self, start: u32) -> u32 {
        ticks_diff(self.now_us(), start)
    }
}

/// Wrap-aware difference `end - start` in ticks.
#[inline]
pub const fn ticks_diff(end: u32, start: u32) -> u32 {
    end.wrapping_sub(start)
}

/// Clock backed by the embassy time driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl MonotonicClock for EmbassyClock {
    #[allow(clippy::cast_possible_truncation)] // wrapping is the contract
    fn now_us(&self) -> u32 {
        embassy_time::Instant::now().as_micros() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_diff_survives_wraparound() {
        assert_eq!(ticks_diff(10, u32::MAX - 5), 16);
        assert_eq!(ticks_diff(500, 200), 300);
    }

    #[test]
    fn embassy_clock_is_monotonic() {
        let clock = EmbassyClock;
        let a = clock.now_us();
        let b = clock.now_us();
        assert!(ticks_diff(b, a) < 1_000_000);
    }
}
