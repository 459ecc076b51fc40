//! Board configuration and constants
//!
//! This module defines the fixed wiring and geometry of the reference board
//! (XIAO ESP32-S3 + ST7789 240×240 + SPI micro-SD module). Every handle the
//! orchestrator constructs is parameterised from a [`BoardConfig`]; nothing
//! else in the workspace hardcodes a pin number.

use crate::display::Rotation;
use crate::pixel::framebuffer_len;

/// The application name
pub const APP_NAME: &str = "S3 LCD bring-up";

/// Application version (synchronized with Cargo.toml)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fixed filesystem path under which the SD card is mounted.
pub const MOUNT_POINT: &str = "/sd";

/// Default image shown at boot when present on the card.
pub const DEFAULT_IMAGE: &str = "Test.rgb565";

/// SPI pin triple shared by the display and the SD card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusPins {
    /// Data-in (MISO) GPIO
    pub miso: u8,
    /// Data-out (MOSI) GPIO
    pub mosi: u8,
    /// Clock GPIO
    pub sclk: u8,
    /// Largest single DMA transfer the bus is configured for, in bytes.
    pub max_transfer_bytes: usize,
}

/// LCD panel-IO adapter parameters (D/C-driven SPI command/data framing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LcdBusConfig {
    /// SPI host peripheral index
    pub spi_host: u8,
    /// Data/Command GPIO
    pub dc: u8,
    /// LCD chip-select GPIO
    pub cs: u8,
    /// SPI mode (0–3)
    pub spi_mode: u8,
    /// Pixel clock in Hz
    pub pclk_hz: u32,
    /// Bit width of an LCD command
    pub cmd_bits: u8,
    /// Bit width of an LCD parameter
    pub param_bits: u8,
}

/// Display geometry and controller options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
    /// Panel rotation
    pub rotation: Rotation,
    /// Rows per DMA chunk used by the controller driver
    pub dma_rows: u16,
}

impl DisplayConfig {
    /// Bytes in one full-screen RGB565 framebuffer.
    pub const fn framebuffer_len(&self) -> usize {
        framebuffer_len(self.width, self.height)
    }
}

/// SD card wiring and mount location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StorageConfig {
    /// SD chip-select GPIO
    pub cs: u8,
    /// Mount point for the FAT volume
    pub mount_point: &'static str,
}

/// Backlight PWM output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BacklightConfig {
    /// PWM GPIO
    pub pin: u8,
}

/// Complete board description consumed by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardConfig {
    /// Shared SPI bus pins
    pub bus: BusPins,
    /// LCD panel-IO adapter
    pub lcd_bus: LcdBusConfig,
    /// Display geometry
    pub display: DisplayConfig,
    /// SD card
    pub storage: StorageConfig,
    /// Backlight
    pub backlight: BacklightConfig,
}

/// Screen width of the reference panel.
pub const SCREEN_WIDTH: u16 = 240;

/// Screen height of the reference panel.
pub const SCREEN_HEIGHT: u16 = 240;

/// XIAO ESP32-S3 with an ST7789 240×240 panel and an SPI micro-SD module.
///
/// | Signal    | GPIO |
/// |-----------|------|
/// | MISO      | 8    |
/// | MOSI      | 9    |
/// | SCLK      | 7    |
/// | LCD DC    | 2    |
/// | LCD CS    | 1    |
/// | SD CS     | 44   |
/// | Backlight | 3    |
pub const XIAO_ESP32S3_ST7789: BoardConfig = BoardConfig {
    bus: BusPins {
        miso: 8,
        mosi: 9,
        sclk: 7,
        // One full frame plus the command/address preamble.
        max_transfer_bytes: framebuffer_len(SCREEN_WIDTH, SCREEN_HEIGHT) + 8,
    },
    lcd_bus: LcdBusConfig {
        spi_host: 1,
        dc: 2,
        cs: 1,
        spi_mode: 0,
        pclk_hz: 80_000_000,
        cmd_bits: 8,
        param_bits: 8,
    },
    display: DisplayConfig {
        width: SCREEN_WIDTH,
        height: SCREEN_HEIGHT,
        rotation: Rotation::Deg180,
        dma_rows: SCREEN_HEIGHT,
    },
    storage: StorageConfig {
        cs: 44,
        mount_point: MOUNT_POINT,
    },
    backlight: BacklightConfig { pin: 3 },
};

impl Default for BoardConfig {
    fn default() -> Self {
        XIAO_ESP32S3_ST7789
    }
}
