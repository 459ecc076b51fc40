//! Framebuffer-backed display mock with a transfer-time model.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::{Line, PointsIter, Rectangle};

use super::{Event, FailPoint, MockProbe, SimClock};
use crate::display::{DisplayError, Rgb565Display};
use crate::pixel::{unpack_rgb565, BYTES_PER_PIXEL};

/// How long display operations take in simulated time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferModel {
    /// Fixed cost of every blit (command/address setup, DMA arm)
    pub blit_overhead_us: u32,
    /// Marginal cost per pixel byte
    pub ns_per_byte: u32,
    /// Cost of `show`
    pub show_us: u32,
}

impl TransferModel {
    /// Operations take no time
    pub const INSTANT: Self = Self {
        blit_overhead_us: 0,
        ns_per_byte: 0,
        show_us: 0,
    };

    /// DMA streaming at `pclk_hz` (8 bits per byte) with a fixed setup cost
    #[allow(clippy::cast_possible_truncation)]
    pub const fn dma(pclk_hz: u32, blit_overhead_us: u32) -> Self {
        let ns_per_byte = if pclk_hz == 0 {
            0
        } else {
            (8_000_000_000u64 / pclk_hz as u64) as u32
        };
        Self {
            blit_overhead_us,
            ns_per_byte,
            show_us: 0,
        }
    }

    /// Simulated duration of a blit of `bytes` bytes
    #[allow(clippy::cast_possible_truncation)]
    pub fn blit_cost_us(&self, bytes: usize) -> u32 {
        let streaming = bytes as u64 * u64::from(self.ns_per_byte) / 1000;
        self.blit_overhead_us
            .saturating_add(u32::try_from(streaming).unwrap_or(u32::MAX))
    }
}

impl Default for TransferModel {
    /// 80 MHz DMA with 40 µs of per-blit setup
    fn default() -> Self {
        Self::dma(80_000_000, 40)
    }
}

/// Mock RGB565 display
pub struct MockDisplay {
    width: u16,
    height: u16,
    initialized: bool,
    framebuffer: Vec<Rgb565>,
    frames_shown: usize,
    model: TransferModel,
    clock: SimClock,
    probe: MockProbe,
}

impl MockDisplay {
    /// Standalone display with its own probe and clock and instant transfers
    pub fn new(width: u16, height: u16) -> Self {
        Self::with_parts(
            width,
            height,
            MockProbe::new(),
            SimClock::new(),
            TransferModel::INSTANT,
        )
    }

    /// Display wired to a shared probe and clock
    pub fn with_parts(
        width: u16,
        height: u16,
        probe: MockProbe,
        clock: SimClock,
        model: TransferModel,
    ) -> Self {
        Self {
            width,
            height,
            initialized: false,
            framebuffer: vec![Rgb565::new(0, 0, 0); usize::from(width) * usize::from(height)],
            frames_shown: 0,
            model,
            clock,
            probe,
        }
    }

    /// Whether `init` has run
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of `show` calls
    pub fn frames_shown(&self) -> usize {
        self.frames_shown
    }

    /// Colour in display memory at `(x, y)`
    pub fn pixel_at(&self, x: u16, y: u16) -> Option<Rgb565> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.framebuffer
            .get(usize::from(y) * usize::from(self.width) + usize::from(x))
            .copied()
    }

    /// Panel size
    pub fn size(&self) -> Size {
        Size::new(u32::from(self.width), u32::from(self.height))
    }

    fn bounds(&self) -> Rectangle {
        Rectangle::new(Point::zero(), self.size())
    }

    fn set(&mut self, at: Point, color: Rgb565) {
        if !self.bounds().contains(at) {
            return;
        }
        let (Ok(x), Ok(y)) = (usize::try_from(at.x), usize::try_from(at.y)) else {
            return;
        };
        if let Some(slot) = self.framebuffer.get_mut(y * usize::from(self.width) + x) {
            *slot = color;
        }
    }

    fn require_init(&self) -> Result<(), DisplayError> {
        if self.initialized {
            Ok(())
        } else {
            Err(DisplayError::NotInitialized)
        }
    }
}

impl Rgb565Display for MockDisplay {
    type Error = DisplayError;

    fn init(&mut self) -> Result<(), Self::Error> {
        if self.probe.should_fail(FailPoint::DisplayInit) {
            return Err(DisplayError::Communication);
        }
        self.initialized = true;
        self.probe.record(Event::DisplayInit);
        Ok(())
    }

    fn fill(&mut self, color: Rgb565) -> Result<(), Self::Error> {
        self.require_init()?;
        self.framebuffer.fill(color);
        self.probe.record(Event::Fill(color));
        Ok(())
    }

    fn pixel(&mut self, at: Point, color: Rgb565) -> Result<(), Self::Error> {
        self.require_init()?;
        self.set(at, color);
        self.probe.record(Event::Pixel);
        Ok(())
    }

    fn line(&mut self, start: Point, end: Point, color: Rgb565) -> Result<(), Self::Error> {
        self.require_init()?;
        for p in Line::new(start, end).points() {
            self.set(p, color);
        }
        self.probe.record(Event::Line);
        Ok(())
    }

    fn blit(&mut self, buffer: &[u8], area: Rectangle) -> Result<(), Self::Error> {
        self.require_init()?;
        if self.probe.should_fail(FailPoint::Blit) {
            return Err(DisplayError::Communication);
        }
        let bounds = self.bounds();
        let Some(bottom_right) = area.bottom_right() else {
            return Err(DisplayError::OutOfBounds);
        };
        if !bounds.contains(area.top_left) || !bounds.contains(bottom_right) {
            return Err(DisplayError::OutOfBounds);
        }
        let expected = area.size.width as usize * area.size.height as usize * BYTES_PER_PIXEL;
        if buffer.len() != expected {
            return Err(DisplayError::InvalidState);
        }
        for (p, px) in area.points().zip(buffer.chunks_exact(BYTES_PER_PIXEL)) {
            if let Ok(bytes) = <[u8; 2]>::try_from(px) {
                self.set(p, unpack_rgb565(bytes));
            }
        }
        self.clock.advance_us(self.model.blit_cost_us(buffer.len()));
        self.probe.record(Event::Blit {
            len: buffer.len(),
            area,
        });
        Ok(())
    }

    fn show(&mut self) -> Result<(), Self::Error> {
        self.require_init()?;
        if self.probe.should_fail(FailPoint::Show) {
            return Err(DisplayError::Communication);
        }
        self.clock.advance_us(self.model.show_us);
        self.frames_shown += 1;
        self.probe.record(Event::Show);
        Ok(())
    }
}
