//! Plain-text rendering of diagnostic results.

use core::fmt;

use super::analysis::{DiagnosticReport, ThroughputBand};
use super::{QuickCheck, QuickVerdict};

const RULE: &str = "============================================================";

fn mark(ok: bool) -> &'static str {
    if ok {
        "ok  "
    } else {
        "WARN"
    }
}

impl fmt::Display for ThroughputBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VerySlow => write!(f, "very slow"),
            Self::Slow => write!(f, "slow"),
            Self::Acceptable => write!(f, "acceptable"),
        }
    }
}

impl fmt::Display for QuickVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FastPathNotEngaged => write!(f, "even small transfers are slow, bulk path not engaged"),
            Self::OverheadDominates => write!(f, "poor scaling, setup overhead dominates"),
            Self::Reasonable => write!(f, "transfer scaling looks reasonable"),
        }
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "DMA TRANSFER DIAGNOSTIC")?;
        writeln!(f, "{RULE}")?;
        for s in &self.stats {
            writeln!(f, "{} ({}x{}, {} bytes)", s.description, s.width, s.height, s.size_bytes)?;
            writeln!(f, "  clear:    {:.1} ms", s.avg_clear_us / 1000.0)?;
            writeln!(f, "  pattern:  {:.1} ms", s.avg_pattern_ms())?;
            writeln!(f, "  total:    {:.1} ms", s.avg_total_us / 1000.0)?;
            writeln!(f, "  rate:     {:.1} MB/s", s.throughput_mbps())?;
            writeln!(
                f,
                "  range:    {:.1}-{:.1} ms",
                s.min_total_us as f32 / 1000.0,
                s.max_total_us as f32 / 1000.0
            )?;
        }

        writeln!(f, "{RULE}")?;
        writeln!(f, "Transfer time vs buffer size:")?;
        for s in &self.stats {
            writeln!(f, "  {:<26}: {:.2} ms/KB", s.description, s.ms_per_kb())?;
        }

        writeln!(f)?;
        writeln!(f, "Checks:")?;
        writeln!(
            f,
            "  [{}] full screen {:.1} ms",
            mark(!self.absolute.too_slow),
            self.absolute.full_screen_ms
        )?;
        writeln!(
            f,
            "  [{}] scaling: expected {:.1}x, actual {:.1}x",
            mark(self.scaling.linear),
            self.scaling.size_ratio,
            self.scaling.time_ratio
        )?;
        writeln!(
            f,
            "  [{}] rate spread {:.0}% ({:.1}-{:.1} MB/s)",
            mark(self.consistency.consistent),
            self.consistency.spread * 100.0,
            self.consistency.min_mbps,
            self.consistency.max_mbps
        )?;
        writeln!(
            f,
            "  [{}] best rate {:.1} MB/s is {} (5-15 MB/s expected with DMA)",
            mark(self.band == ThroughputBand::Acceptable),
            self.consistency.max_mbps,
            self.band
        )?;

        writeln!(f)?;
        writeln!(f, "Theoretical:")?;
        for t in &self.theoretical {
            writeln!(
                f,
                "  {:>2} MHz SPI: {:.1} MB/s, full screen in {:.1} ms",
                t.clock_mhz,
                t.mbps(),
                t.full_screen_ms
            )?;
        }
        write!(
            f,
            "Effective clock ~{:.0} MHz (rough estimate)",
            self.effective_clock_mhz
        )
    }
}

impl fmt::Display for QuickCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "small ({} bytes): {:.1} ms",
            self.small_bytes,
            self.small_us as f32 / 1000.0
        )?;
        writeln!(
            f,
            "full  ({} bytes): {:.1} ms",
            self.full_bytes,
            self.full_us as f32 / 1000.0
        )?;
        writeln!(
            f,
            "ratio {:.1}x (size ratio {:.0}x)",
            self.actual_ratio, self.expected_ratio
        )?;
        write!(f, "{}", self.verdict)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::{analyze, DiagnosticConfig, TransferSample, TransferStats, DEFAULT_CASES};
    use super::*;
    use alloc::string::ToString;
    use alloc::vec::Vec;

    #[test]
    fn report_lists_every_case_and_clock() {
        let stats: Vec<TransferStats> = DEFAULT_CASES
            .iter()
            .map(|c| {
                let us = (c.size_bytes() / 10) as u32;
                let sample = TransferSample {
                    clear_us: 11_520,
                    pattern_us: us,
                    total_us: 11_520 + us,
                };
                TransferStats::from_samples(c, &[sample]).unwrap()
            })
            .collect();
        let text = analyze(&stats, &DiagnosticConfig::default())
            .unwrap()
            .to_string();
        for case in &DEFAULT_CASES {
            assert!(text.contains(case.description));
        }
        assert!(text.contains("80 MHz SPI: 10.0 MB/s"));
        assert!(text.contains("Effective clock ~80 MHz"));
        assert!(!text.contains("WARN"));
    }

    #[test]
    fn quick_check_ends_with_verdict() {
        let check = QuickCheck {
            small_bytes: 100,
            small_us: 50,
            full_bytes: 115_200,
            full_us: 11_560,
            expected_ratio: 1152.0,
            actual_ratio: 231.2,
            verdict: QuickVerdict::Reasonable,
        };
        let text = check.to_string();
        assert!(text.ends_with("transfer scaling looks reasonable"));
        assert!(text.contains("ratio 231.2x (size ratio 1152x)"));
    }
}
