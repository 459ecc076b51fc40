//! Test cases and per-case transfer statistics.

use platform::framebuffer_len;

/// One rectangle size the harness measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TestCase {
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
    /// Label used in the report
    pub description: &'static str,
}

impl TestCase {
    /// Bytes in this case's pattern buffer
    pub const fn size_bytes(&self) -> usize {
        framebuffer_len(self.width, self.height)
    }
}

/// Default sweep for a 240×240 panel, smallest first, full screen last.
pub const DEFAULT_CASES: [TestCase; 5] = [
    TestCase {
        width: 60,
        height: 60,
        description: "Small buffer (7.2KB)",
    },
    TestCase {
        width: 120,
        height: 120,
        description: "Medium buffer (28.8KB)",
    },
    TestCase {
        width: 240,
        height: 60,
        description: "Horizontal strip (28.8KB)",
    },
    TestCase {
        width: 60,
        height: 240,
        description: "Vertical strip (28.8KB)",
    },
    TestCase {
        width: 240,
        height: 240,
        description: "Full screen (115.2KB)",
    },
];

/// Timings of one trial, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferSample {
    /// Full-screen clear plus show
    pub clear_us: u32,
    /// Pattern blit plus show
    pub pattern_us: u32,
    /// Both
    pub total_us: u32,
}

/// Aggregated timings for one [`TestCase`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferStats {
    /// Case label
    pub description: &'static str,
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
    /// Pattern buffer size
    pub size_bytes: usize,
    /// Mean clear time
    pub avg_clear_us: f32,
    /// Mean pattern time
    pub avg_pattern_us: f32,
    /// Mean trial time
    pub avg_total_us: f32,
    /// Fastest trial
    pub min_total_us: u32,
    /// Slowest trial
    pub max_total_us: u32,
    /// `size_bytes / avg_pattern`, bytes per second
    pub throughput_bps: f32,
}

impl TransferStats {
    /// Aggregate `samples`; `None` when there are none.
    ///
    /// A zero mean pattern time is treated as 1 µs so the throughput stays
    /// finite.
    pub fn from_samples(case: &TestCase, samples: &[TransferSample]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let n = samples.len() as f64;
        let mean = |f: fn(&TransferSample) -> u32| -> f32 {
            let sum: u64 = samples.iter().map(|s| u64::from(f(s))).sum();
            (sum as f64 / n) as f32
        };
        let avg_clear_us = mean(|s| s.clear_us);
        let avg_pattern_us = mean(|s| s.pattern_us);
        let avg_total_us = mean(|s| s.total_us);
        let min_total_us = samples.iter().map(|s| s.total_us).min()?;
        let max_total_us = samples.iter().map(|s| s.total_us).max()?;

        let size_bytes = case.size_bytes();
        let seconds = avg_pattern_us.max(1.0) / 1_000_000.0;
        Some(Self {
            description: case.description,
            width: case.width,
            height: case.height,
            size_bytes,
            avg_clear_us,
            avg_pattern_us,
            avg_total_us,
            min_total_us,
            max_total_us,
            throughput_bps: size_bytes as f32 / seconds,
        })
    }

    /// Mean pattern time in milliseconds
    pub fn avg_pattern_ms(&self) -> f32 {
        self.avg_pattern_us / 1000.0
    }

    /// Throughput in MB/s (1 MB = 1 000 000 bytes)
    pub fn throughput_mbps(&self) -> f32 {
        self.throughput_bps / 1_000_000.0
    }

    /// Size in KiB
    pub fn size_kb(&self) -> f32 {
        self.size_bytes as f32 / 1024.0
    }

    /// Milliseconds per KiB of pattern data
    pub fn ms_per_kb(&self) -> f32 {
        let kb = self.size_kb();
        if kb > 0.0 {
            self.avg_pattern_ms() / kb
        } else {
            0.0
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn sample(clear_us: u32, pattern_us: u32) -> TransferSample {
        TransferSample {
            clear_us,
            pattern_us,
            total_us: clear_us + pattern_us,
        }
    }

    #[test]
    fn default_cases_sizes() {
        let sizes: [usize; 5] = DEFAULT_CASES.map(|c| c.size_bytes());
        assert_eq!(sizes, [7_200, 28_800, 28_800, 28_800, 115_200]);
    }

    #[test]
    fn aggregates_mean_min_max() {
        let case = DEFAULT_CASES[0];
        let stats =
            TransferStats::from_samples(&case, &[sample(100, 700), sample(300, 900)]).unwrap();
        assert!((stats.avg_clear_us - 200.0).abs() < 1e-3);
        assert!((stats.avg_pattern_us - 800.0).abs() < 1e-3);
        assert!((stats.avg_total_us - 1000.0).abs() < 1e-3);
        assert_eq!(stats.min_total_us, 800);
        assert_eq!(stats.max_total_us, 1200);
        // 7200 bytes in 0.8 ms = 9 MB/s
        assert!((stats.throughput_mbps() - 9.0).abs() < 1e-3);
    }

    #[test]
    fn mean_keeps_fractional_microseconds() {
        let case = DEFAULT_CASES[4];
        let stats =
            TransferStats::from_samples(&case, &[sample(0, 11_560), sample(0, 11_561)]).unwrap();
        assert!((stats.avg_pattern_us - 11_560.5).abs() < 1e-2);
        // 115 200 bytes / 11.5605 ms
        let expected = 115_200.0 / 0.011_560_5 / 1_000_000.0;
        assert!((stats.throughput_mbps() - expected).abs() < 1e-3);
    }

    #[test]
    fn empty_samples_have_no_stats() {
        assert!(TransferStats::from_samples(&DEFAULT_CASES[0], &[]).is_none());
    }

    #[test]
    fn zero_duration_is_floored() {
        let stats = TransferStats::from_samples(&DEFAULT_CASES[0], &[sample(0, 0)]).unwrap();
        assert!(stats.throughput_bps.is_finite());
        assert!((stats.throughput_mbps() - 7_200.0).abs() < 1.0);
    }

    #[test]
    fn ms_per_kb_uses_kibibytes() {
        // 115 200 bytes = 112.5 KiB in 11.25 ms → 0.1 ms/KiB
        let stats = TransferStats::from_samples(&DEFAULT_CASES[4], &[sample(0, 11_250)]).unwrap();
        assert!((stats.ms_per_kb() - 0.1).abs() < 1e-5);
    }
}
