//! Display transfer diagnostics.
//!
//! Measures how long gradient blits of several sizes take and infers from
//! the scaling whether the panel's bulk (DMA) path is engaged. A healthy
//! path shows transfer time proportional to size and a throughput close to
//! the SPI clock divided by eight.
//!
//! Each trial is a full-screen clear followed by the pattern blit at the
//! origin, both followed by `show`, timed with the orchestrator's
//! microsecond clock:
//!
//! ```text
//! t0 ── clear + show ── t1 ── pattern + show ── t2
//!        clear_us = t1 - t0   pattern_us = t2 - t1
//! ```
//!
//! [`quick_check`] is a two-transfer smoke test for when the full sweep is
//! too slow.

mod analysis;
mod pattern;
mod report;
mod stats;

use alloc::vec::Vec;

use platform::{framebuffer_len, ticks_diff, Board, PixelBuffer};

use crate::error::Error;
use crate::orchestrator::ResourceOrchestrator;

pub use analysis::{
    analyze, classify_throughput, linear_scaling, AbsoluteSpeed, DiagnosticReport, LinearScaling,
    RateConsistency, TheoreticalRate, ThroughputBand, MAX_CASES, MAX_CLOCKS,
};
pub use pattern::{gradient, gradient_pixel};
pub use stats::{TestCase, TransferSample, TransferStats, DEFAULT_CASES};

/// Knobs for [`run_diagnostics`] and [`quick_check`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagnosticConfig {
    /// Cases in measurement order
    pub cases: &'static [TestCase],
    /// Trials per case
    pub trials: u32,
    /// Maximum relative deviation for linear scaling
    pub linear_tolerance: f32,
    /// Full-screen frame budget
    pub max_full_screen_ms: f32,
    /// Maximum `(max - min) / max` throughput spread
    pub rate_spread_limit: f32,
    /// Below this the path is very slow (MB/s)
    pub very_slow_mbps: f32,
    /// Below this the path is slow (MB/s)
    pub slow_mbps: f32,
    /// Clocks for the theoretical table (MHz)
    pub theoretical_clocks_mhz: &'static [u32],
    /// Quick check small-transfer width
    pub quick_width: u16,
    /// Quick check small-transfer height
    pub quick_height: u16,
    /// A small transfer slower than this means no fast path
    pub quick_slow_small_ms: f32,
    /// Minimum full/small ratio before overhead is blamed
    pub quick_min_ratio: f32,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        Self {
            cases: &DEFAULT_CASES,
            trials: 20,
            linear_tolerance: 0.30,
            max_full_screen_ms: 30.0,
            rate_spread_limit: 0.5,
            very_slow_mbps: 2.0,
            slow_mbps: 5.0,
            theoretical_clocks_mhz: &[10, 20, 40, 80],
            quick_width: 10,
            quick_height: 5,
            quick_slow_small_ms: 10.0,
            quick_min_ratio: 100.0,
        }
    }
}

/// Quick check conclusion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QuickVerdict {
    /// Even the tiny transfer was slow
    FastPathNotEngaged,
    /// The full frame is not much slower than the tiny one
    OverheadDominates,
    /// Scaling looks plausible
    Reasonable,
}

/// Result of [`quick_check`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuickCheck {
    /// Tiny transfer size
    pub small_bytes: usize,
    /// Tiny transfer time (blit + show)
    pub small_us: u32,
    /// Full-screen size
    pub full_bytes: usize,
    /// Full-screen time (blit + show)
    pub full_us: u32,
    /// `full_bytes / small_bytes`
    pub expected_ratio: f32,
    /// `full_us / small_us`
    pub actual_ratio: f32,
    /// Classification
    pub verdict: QuickVerdict,
}

fn validate_sweep(config: &DiagnosticConfig, width: u16, height: u16) -> Result<(), Error> {
    if config.cases.is_empty() || config.trials == 0 || config.cases.len() > MAX_CASES {
        warn!(
            "diagnostics: {} cases x {} trials is not runnable",
            config.cases.len(),
            config.trials
        );
        return Err(Error::InvalidConfig);
    }
    if let Some(case) = config
        .cases
        .iter()
        .find(|c| c.width == 0 || c.height == 0 || c.width > width || c.height > height)
    {
        warn!(
            "diagnostics: case {}x{} does not fit a {}x{} panel",
            case.width,
            case.height,
            width,
            height
        );
        return Err(Error::InvalidConfig);
    }
    Ok(())
}

fn validate_quick(config: &DiagnosticConfig, width: u16, height: u16) -> Result<(), Error> {
    if config.quick_width == 0
        || config.quick_height == 0
        || config.quick_width > width
        || config.quick_height > height
    {
        warn!(
            "quick check: {}x{} does not fit a {}x{} panel",
            config.quick_width,
            config.quick_height,
            width,
            height
        );
        return Err(Error::InvalidConfig);
    }
    Ok(())
}

/// One timed `blit_and_show` at the origin, in microseconds.
fn timed_blit<B: Board>(
    orch: &mut ResourceOrchestrator<B>,
    buffer: &[u8],
    width: u16,
    height: u16,
) -> Result<u32, Error> {
    let start = orch.now_us();
    orch.blit_and_show(buffer, 0, 0, width, height)?;
    Ok(ticks_diff(orch.now_us(), start))
}

fn measure_case<B: Board>(
    orch: &mut ResourceOrchestrator<B>,
    case: &TestCase,
    clear: &PixelBuffer,
    trials: u32,
) -> Result<TransferStats, Error> {
    let pattern = gradient(case.width, case.height);
    orch.reclaim_memory();

    let mut samples = Vec::with_capacity(trials as usize);
    for _ in 0..trials {
        let clear_us = timed_blit(orch, clear.as_bytes(), clear.width(), clear.height())?;
        let pattern_us = timed_blit(orch, pattern.as_bytes(), case.width, case.height)?;
        samples.push(TransferSample {
            clear_us,
            pattern_us,
            total_us: clear_us.wrapping_add(pattern_us),
        });
    }
    drop(pattern);

    let stats = TransferStats::from_samples(case, &samples).ok_or(Error::InvalidConfig)?;
    info!(
        "{}: clear {} us, pattern {} us, total {} us (range {}-{} us)",
        case.description,
        stats.avg_clear_us,
        stats.avg_pattern_us,
        stats.avg_total_us,
        stats.min_total_us,
        stats.max_total_us
    );
    Ok(stats)
}

/// Run the full sweep and analyse it.
///
/// Brings up the bus and display first. The config is checked before any
/// transfer: an empty case list, zero trials, more than [`MAX_CASES`] cases
/// or a case larger than the panel is [`Error::InvalidConfig`]. A failed
/// transfer aborts the run with its error.
pub fn run_diagnostics<B: Board>(
    orch: &mut ResourceOrchestrator<B>,
    config: &DiagnosticConfig,
) -> Result<DiagnosticReport, Error> {
    orch.ensure_bus_ready()?;
    orch.ensure_display_ready()?;
    let geometry = orch.config().display;
    validate_sweep(config, geometry.width, geometry.height)?;

    info!(
        "diagnostics: {} cases x {} trials, frame {} bytes",
        config.cases.len(),
        config.trials,
        geometry.framebuffer_len()
    );

    let clear = PixelBuffer::zeroed(geometry.width, geometry.height);
    let mut stats: heapless::Vec<TransferStats, MAX_CASES> = heapless::Vec::new();
    for case in config.cases {
        let measured = measure_case(orch, case, &clear, config.trials)?;
        stats.push(measured).map_err(|_| Error::InvalidConfig)?;
    }

    let report = analyze(&stats, config).ok_or(Error::InvalidConfig)?;
    if report.is_healthy() {
        info!("diagnostics: transfer path healthy");
    } else {
        warn!("diagnostics: {} issue(s) found", report.issue_count());
    }
    Ok(report)
}

/// Time one tiny and one full-screen transfer of zeroes and compare.
///
/// Only the tiny transfer size is checked against the panel; the sweep's
/// case list and trial count are not used.
pub fn quick_check<B: Board>(
    orch: &mut ResourceOrchestrator<B>,
    config: &DiagnosticConfig,
) -> Result<QuickCheck, Error> {
    orch.ensure_bus_ready()?;
    orch.ensure_display_ready()?;
    let geometry = orch.config().display;
    validate_quick(config, geometry.width, geometry.height)?;

    let small = PixelBuffer::zeroed(config.quick_width, config.quick_height);
    let small_us = timed_blit(orch, small.as_bytes(), small.width(), small.height())?;
    drop(small);

    let full = PixelBuffer::zeroed(geometry.width, geometry.height);
    let full_us = timed_blit(orch, full.as_bytes(), full.width(), full.height())?;

    let small_bytes = framebuffer_len(config.quick_width, config.quick_height);
    let full_bytes = full.len();
    let expected_ratio = full_bytes as f32 / small_bytes as f32;
    let actual_ratio = full_us as f32 / small_us.max(1) as f32;

    let verdict = if small_us as f32 / 1000.0 > config.quick_slow_small_ms {
        QuickVerdict::FastPathNotEngaged
    } else if actual_ratio < config.quick_min_ratio {
        QuickVerdict::OverheadDominates
    } else {
        QuickVerdict::Reasonable
    };
    info!("quick check: small {} us, full {} us", small_us, full_us);

    Ok(QuickCheck {
        small_bytes,
        small_us,
        full_bytes,
        full_us,
        expected_ratio,
        actual_ratio,
        verdict,
    })
}
