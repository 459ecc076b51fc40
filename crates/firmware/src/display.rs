//! Display handle and the blit pipeline.
//!
//! [`DisplayHandle`] wraps an initialised controller driver together with
//! the geometry it was built for. The pipeline's only additions over the raw
//! driver are a readiness check and a buffer-size check, both of which fail
//! before any driver call is made.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;
use platform::{framebuffer_len, Board, DisplayConfig, Rgb565Display, Rotation};

use crate::error::{Error, Resource};
use crate::orchestrator::ResourceOrchestrator;

/// An initialised display controller
pub struct DisplayHandle<D> {
    driver: D,
    width: u16,
    height: u16,
    rotation: Rotation,
}

impl<D: Rgb565Display> DisplayHandle<D> {
    pub(crate) fn new(driver: D, config: &DisplayConfig) -> Self {
        Self {
            driver,
            width: config.width,
            height: config.height,
            rotation: config.rotation,
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Panel rotation
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Bytes in one full-screen framebuffer
    pub fn framebuffer_len(&self) -> usize {
        framebuffer_len(self.width, self.height)
    }

    /// Underlying driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Underlying driver, mutably
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Fill the frame
    pub fn fill(&mut self, color: Rgb565) -> Result<(), Error> {
        self.driver.fill(color).map_err(|_| transfer_failed("fill"))
    }

    /// Set one pixel
    pub fn pixel(&mut self, at: Point, color: Rgb565) -> Result<(), Error> {
        self.driver
            .pixel(at, color)
            .map_err(|_| transfer_failed("pixel"))
    }

    /// Draw a line
    pub fn line(&mut self, start: Point, end: Point, color: Rgb565) -> Result<(), Error> {
        self.driver
            .line(start, end, color)
            .map_err(|_| transfer_failed("line"))
    }

    /// Push display memory to the panel
    pub fn show(&mut self) -> Result<(), Error> {
        self.driver.show().map_err(|_| transfer_failed("show"))
    }

    /// Copy `buffer` to `(x, y)` with the given size, then show.
    ///
    /// `buffer.len()` must equal `width * height * 2`; otherwise the call
    /// fails with [`Error::SizeMismatch`] and the driver is not touched.
    pub fn blit_and_show(
        &mut self,
        buffer: &[u8],
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    ) -> Result<(), Error> {
        let expected = framebuffer_len(width, height);
        if buffer.len() != expected {
            warn!(
                "blit rejected: {} bytes for a {}x{} rectangle",
                buffer.len(),
                width,
                height
            );
            return Err(Error::SizeMismatch {
                expected,
                actual: buffer.len(),
            });
        }
        let area = Rectangle::new(
            Point::new(i32::from(x), i32::from(y)),
            Size::new(u32::from(width), u32::from(height)),
        );
        self.driver
            .blit(buffer, area)
            .map_err(|_| transfer_failed("blit"))?;
        self.show()
    }
}

fn transfer_failed(op: &'static str) -> Error {
    error!("display {} failed", op);
    Error::Transfer
}

impl<B: Board> ResourceOrchestrator<B> {
    /// Blit through the display handle; fails with
    /// `NotReady(Display)` if the display has not been brought up.
    pub fn blit_and_show(
        &mut self,
        buffer: &[u8],
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    ) -> Result<(), Error> {
        let Some(display) = self.display_if_ready() else {
            warn!("blit requested before display bring-up");
            return Err(Error::NotReady(Resource::Display));
        };
        display.blit_and_show(buffer, x, y, width, height)
    }

    /// Show a full-screen image at `(x, y)`. Undersized or oversized
    /// payloads are rejected with [`Error::SizeMismatch`].
    pub fn show_image(&mut self, image: &[u8], x: u16, y: u16) -> Result<(), Error> {
        let geometry = self.config().display;
        self.blit_and_show(image, x, y, geometry.width, geometry.height)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::RgbColor;
    use platform::config::XIAO_ESP32S3_ST7789;
    use platform::mocks::{Event, MockDisplay, MockProbe, SimClock, TransferModel};

    fn handle(probe: &MockProbe) -> DisplayHandle<MockDisplay> {
        let cfg = XIAO_ESP32S3_ST7789.display;
        let mut driver = MockDisplay::with_parts(
            cfg.width,
            cfg.height,
            probe.clone(),
            SimClock::new(),
            TransferModel::INSTANT,
        );
        driver.init().unwrap();
        DisplayHandle::new(driver, &cfg)
    }

    #[test]
    fn size_mismatch_issues_no_driver_calls() {
        let probe = MockProbe::new();
        let mut display = handle(&probe);
        probe.clear_events();
        let err = display
            .blit_and_show(&[0u8; 19_999], 0, 0, 100, 100)
            .unwrap_err();
        assert_eq!(
            err,
            Error::SizeMismatch {
                expected: 20_000,
                actual: 19_999
            }
        );
        assert!(probe.events().is_empty());
    }

    #[test]
    fn blit_then_show() {
        let probe = MockProbe::new();
        let mut display = handle(&probe);
        probe.clear_events();
        let buf = platform::PixelBuffer::filled(10, 5, Rgb565::CYAN);
        display.blit_and_show(buf.as_bytes(), 20, 30, 10, 5).unwrap();
        let events = probe.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::Blit { len: 100, .. }));
        assert_eq!(events[1], Event::Show);
        assert_eq!(display.driver().pixel_at(29, 34), Some(Rgb565::CYAN));
    }

    #[test]
    fn geometry_is_fixed_at_construction() {
        let probe = MockProbe::new();
        let display = handle(&probe);
        assert_eq!((display.width(), display.height()), (240, 240));
        assert_eq!(display.rotation(), Rotation::Deg180);
        assert_eq!(display.framebuffer_len(), 115_200);
    }
}
