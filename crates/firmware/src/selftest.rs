//! Bring-up self tests for the panel and the SD card.

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};
use embedded_graphics::prelude::Point;
use platform::{Board, BLOCK_SIZE};

use crate::error::{Error, IoFailure};
use crate::orchestrator::ResourceOrchestrator;

/// Spacing of the white pixel grid
pub const GRID_SPACING: u16 = 10;

/// Spacing of the line pattern
pub const LINE_SPACING: u16 = 20;

/// Bytes of sector 0 kept by [`storage_probe`]
pub const PROBE_PREFIX: usize = 32;

/// What [`storage_probe`] learned about the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StorageProbe {
    /// Sectors on the card
    pub sector_count: u32,
    /// Sector size in bytes
    pub sector_size: u32,
    /// `sector_count * sector_size` in MiB
    pub capacity_mb: u32,
    /// First bytes of sector 0
    pub first_bytes: [u8; PROBE_PREFIX],
    /// Sector 0 ends in `55 AA`
    pub signature_ok: bool,
}

/// Walk the display primitives: solid fills, a pixel grid and a line
/// pattern, showing after each stage.
///
/// Returns the number of stages completed (7). Stops at the first failing
/// driver call.
pub fn display_self_test<B: Board>(orch: &mut ResourceOrchestrator<B>) -> Result<u32, Error> {
    orch.ensure_bus_ready()?;
    orch.ensure_display_ready()?;
    let display = orch.display()?;
    let (width, height) = (display.width(), display.height());
    let mut stages = 0u32;

    for color in [Rgb565::BLUE, Rgb565::GREEN, Rgb565::BLUE, Rgb565::BLACK] {
        display.fill(color)?;
        display.show()?;
        stages += 1;
    }

    for y in (0..height).step_by(usize::from(GRID_SPACING)) {
        for x in (0..width).step_by(usize::from(GRID_SPACING)) {
            display.pixel(Point::new(i32::from(x), i32::from(y)), Rgb565::WHITE)?;
        }
    }
    display.show()?;
    stages += 1;

    let (right, bottom) = (i32::from(width) - 1, i32::from(height) - 1);
    for y in (0..height).step_by(usize::from(LINE_SPACING)) {
        let y = i32::from(y);
        display.line(Point::new(0, y), Point::new(right, y), Rgb565::YELLOW)?;
    }
    stages += 1;
    for x in (0..width).step_by(usize::from(LINE_SPACING)) {
        let x = i32::from(x);
        display.line(Point::new(x, 0), Point::new(x, bottom), Rgb565::MAGENTA)?;
    }
    display.show()?;
    stages += 1;

    info!("display self test passed ({} stages)", stages);
    Ok(stages)
}

/// Query the card geometry and read sector 0.
///
/// Does not mount; the probe works on an unformatted card. The display is
/// brought up first since it shares the bus.
pub fn storage_probe<B: Board>(orch: &mut ResourceOrchestrator<B>) -> Result<StorageProbe, Error> {
    orch.ensure_bus_ready()?;
    orch.ensure_display_ready()?;
    orch.ensure_storage_ready()?;
    let storage = orch.storage()?;

    let sector_count = storage
        .sector_count()
        .map_err(|_| Error::Io(IoFailure::Read))?;
    let sector_size = storage
        .sector_size()
        .map_err(|_| Error::Io(IoFailure::Read))?;
    let sector = storage
        .read_boot_sector()
        .map_err(|_| Error::Io(IoFailure::Read))?;

    let capacity = u64::from(sector_count) * u64::from(sector_size);
    let capacity_mb = u32::try_from(capacity / (1024 * 1024)).unwrap_or(u32::MAX);

    let mut first_bytes = [0u8; PROBE_PREFIX];
    if let Some(prefix) = sector.get(..PROBE_PREFIX) {
        first_bytes.copy_from_slice(prefix);
    }
    let signature_ok = sector.get(BLOCK_SIZE - 2..) == Some(&[0x55, 0xAA][..]);

    info!(
        "SD probe: {} sectors x {} bytes ({} MB), signature {}",
        sector_count,
        sector_size,
        capacity_mb,
        if signature_ok { "ok" } else { "missing" }
    );
    Ok(StorageProbe {
        sector_count,
        sector_size,
        capacity_mb,
        first_bytes,
        signature_ok,
    })
}
