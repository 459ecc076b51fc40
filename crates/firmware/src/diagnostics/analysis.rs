//! Transfer-health heuristics over a set of [`TransferStats`].
//!
//! Four independent findings are derived:
//!
//! - **linear scaling**: the largest case's pattern time over the smallest
//!   case's should match their size ratio to within a tolerance. A time
//!   ratio well below the size ratio means per-call setup dominates.
//! - **absolute speed**: the largest (full-screen) case must finish within
//!   a frame budget.
//! - **rate consistency**: throughput should not vary much across sizes.
//! - **throughput band**: the best rate against the bulk-transfer floor.
//!
//! The report also carries a theoretical table of bus-limited rates and a
//! rough effective-clock estimate (`MB/s × 8`).

use super::stats::TransferStats;
use super::DiagnosticConfig;

/// Maximum number of cases a report holds
pub const MAX_CASES: usize = 8;

/// Maximum number of theoretical clock rows
pub const MAX_CLOCKS: usize = 8;

/// Largest-vs-smallest scaling finding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScaling {
    /// `largest.size / smallest.size`
    pub size_ratio: f32,
    /// `largest.pattern / smallest.pattern`
    pub time_ratio: f32,
    /// `|size_ratio - time_ratio| / size_ratio`
    pub deviation: f32,
    /// Deviation within tolerance
    pub linear: bool,
}

/// Full-screen timing finding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsoluteSpeed {
    /// Mean full-screen pattern time
    pub full_screen_ms: f32,
    /// Over the frame budget
    pub too_slow: bool,
}

/// Cross-size throughput spread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateConsistency {
    /// Slowest rate, MB/s
    pub min_mbps: f32,
    /// Fastest rate, MB/s
    pub max_mbps: f32,
    /// `(max - min) / max`
    pub spread: f32,
    /// Spread within limit
    pub consistent: bool,
}

/// Classification of the best observed rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ThroughputBand {
    /// Below the very-slow floor (2 MB/s by default)
    VerySlow,
    /// Below the slow floor (5 MB/s by default)
    Slow,
    /// At or above the slow floor
    Acceptable,
}

/// Bus-limited rate at one SPI clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TheoreticalRate {
    /// SPI clock in MHz
    pub clock_mhz: u32,
    /// `clock / 8`
    pub bytes_per_sec: f32,
    /// Projected full-screen transfer time
    pub full_screen_ms: f32,
}

impl TheoreticalRate {
    /// Rate at `clock_mhz` for a `full_screen_bytes` frame
    pub fn at(clock_mhz: u32, full_screen_bytes: usize) -> Self {
        let bytes_per_sec = clock_mhz as f32 * 1_000_000.0 / 8.0;
        Self {
            clock_mhz,
            bytes_per_sec,
            full_screen_ms: full_screen_bytes as f32 / bytes_per_sec * 1000.0,
        }
    }

    /// Rate in MB/s
    pub fn mbps(&self) -> f32 {
        self.bytes_per_sec / 1_000_000.0
    }
}

/// Everything the harness concluded.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticReport {
    /// Per-case statistics in measurement order
    pub stats: heapless::Vec<TransferStats, MAX_CASES>,
    /// Full-screen finding
    pub absolute: AbsoluteSpeed,
    /// Scaling finding
    pub scaling: LinearScaling,
    /// Consistency finding
    pub consistency: RateConsistency,
    /// Band of the best rate
    pub band: ThroughputBand,
    /// Bus-limited reference rates
    pub theoretical: heapless::Vec<TheoreticalRate, MAX_CLOCKS>,
    /// Full-screen MB/s × 8
    pub effective_clock_mhz: f32,
}

impl DiagnosticReport {
    /// Number of findings that flag a problem
    pub fn issue_count(&self) -> usize {
        [
            self.absolute.too_slow,
            !self.scaling.linear,
            !self.consistency.consistent,
            self.band != ThroughputBand::Acceptable,
        ]
        .into_iter()
        .filter(|&flagged| flagged)
        .count()
    }

    /// No finding flags a problem
    pub fn is_healthy(&self) -> bool {
        self.issue_count() == 0
    }
}

fn abs(v: f32) -> f32 {
    if v < 0.0 {
        -v
    } else {
        v
    }
}

/// Classify `max_mbps` against the band floors in `config`.
pub fn classify_throughput(max_mbps: f32, config: &DiagnosticConfig) -> ThroughputBand {
    if max_mbps < config.very_slow_mbps {
        ThroughputBand::VerySlow
    } else if max_mbps < config.slow_mbps {
        ThroughputBand::Slow
    } else {
        ThroughputBand::Acceptable
    }
}

/// Size-vs-time ratio between `largest` and `smallest`.
pub fn linear_scaling(
    largest: &TransferStats,
    smallest: &TransferStats,
    tolerance: f32,
) -> LinearScaling {
    let size_ratio = largest.size_bytes as f32 / smallest.size_bytes.max(1) as f32;
    let time_ratio = largest.avg_pattern_us.max(1.0) / smallest.avg_pattern_us.max(1.0);
    let deviation = if size_ratio > 0.0 {
        abs(size_ratio - time_ratio) / size_ratio
    } else {
        0.0
    };
    LinearScaling {
        size_ratio,
        time_ratio,
        deviation,
        linear: deviation <= tolerance,
    }
}

/// Derive every finding from `stats`. `None` for an empty slice.
///
/// The largest case (first on ties) stands in for the full screen, the
/// smallest (first on ties) for the small buffer. Cases beyond
/// [`MAX_CASES`] are dropped from the report's table but still count
/// towards the findings.
pub fn analyze(stats: &[TransferStats], config: &DiagnosticConfig) -> Option<DiagnosticReport> {
    let full = stats
        .iter()
        .reduce(|best, s| if s.size_bytes > best.size_bytes { s } else { best })?;
    let small = stats
        .iter()
        .reduce(|best, s| if s.size_bytes < best.size_bytes { s } else { best })?;

    let full_screen_ms = full.avg_pattern_ms();
    let absolute = AbsoluteSpeed {
        full_screen_ms,
        too_slow: full_screen_ms > config.max_full_screen_ms,
    };

    let scaling = linear_scaling(full, small, config.linear_tolerance);

    let rates = stats.iter().map(TransferStats::throughput_mbps);
    let max_mbps = rates.clone().fold(f32::MIN, f32::max);
    let min_mbps = rates.fold(f32::MAX, f32::min);
    let spread = if max_mbps > 0.0 {
        (max_mbps - min_mbps) / max_mbps
    } else {
        0.0
    };
    let consistency = RateConsistency {
        min_mbps,
        max_mbps,
        spread,
        consistent: spread <= config.rate_spread_limit,
    };

    let band = classify_throughput(max_mbps, config);

    let theoretical = config
        .theoretical_clocks_mhz
        .iter()
        .take(MAX_CLOCKS)
        .map(|&mhz| TheoreticalRate::at(mhz, full.size_bytes))
        .collect();

    Some(DiagnosticReport {
        stats: stats.iter().take(MAX_CASES).copied().collect(),
        absolute,
        scaling,
        consistency,
        band,
        theoretical,
        effective_clock_mhz: full.throughput_mbps() * 8.0,
    })
}
