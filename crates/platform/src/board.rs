//! Board factory
//!
//! A [`Board`] knows how to construct each hardware handle from the
//! [`BoardConfig`](crate::BoardConfig) sections. The firmware's resource
//! orchestrator owns one board and calls these factories lazily, in
//! dependency order (bus before display and storage).

use embedded_hal::delay::DelayNs;
use embedded_hal::pwm::SetDutyCycle;

use crate::bus::SpiBus;
use crate::clock::MonotonicClock;
use crate::config::{BacklightConfig, BusPins, DisplayConfig, LcdBusConfig, StorageConfig};
use crate::display::Rgb565Display;
use crate::storage::{BlockDevice, Filesystem};

/// A factory refused to construct a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CreateError {
    /// Peripheral already claimed or not present
    Unavailable,
    /// Configuration rejected by the driver
    InvalidConfig,
    /// Driver allocation failed
    OutOfMemory,
}

#[cfg(feature = "std")]
impl std::error::Error for CreateError {}

impl core::fmt::Display for CreateError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "peripheral unavailable"),
            Self::InvalidConfig => write!(f, "configuration rejected"),
            Self::OutOfMemory => write!(f, "driver allocation failed"),
        }
    }
}

/// Hardware factory for one board.
pub trait Board {
    /// Shared SPI host
    type Bus: SpiBus;
    /// LCD panel-IO adapter (D/C + CS framing over the bus)
    type LcdBus;
    /// Display controller
    type Display: Rgb565Display;
    /// SD card
    type Storage: BlockDevice;
    /// FAT mount layer
    type Fs: Filesystem;
    /// Backlight PWM channel
    type Pwm: SetDutyCycle;
    /// Blocking delay
    type Delay: DelayNs;
    /// Microsecond tick source
    type Clock: MonotonicClock;

    /// Construct the SPI host handle
    fn create_bus(&mut self, pins: &BusPins) -> Result<Self::Bus, CreateError>;

    /// Construct the LCD panel-IO adapter on an initialised bus
    fn create_lcd_bus(
        &mut self,
        bus: &Self::Bus,
        config: &LcdBusConfig,
    ) -> Result<Self::LcdBus, CreateError>;

    /// Construct the display controller driver
    fn create_display(
        &mut self,
        lcd_bus: Self::LcdBus,
        config: &DisplayConfig,
    ) -> Result<Self::Display, CreateError>;

    /// Construct the SD card handle on an initialised bus
    fn create_storage(
        &mut self,
        bus: &Self::Bus,
        config: &StorageConfig,
    ) -> Result<Self::Storage, CreateError>;

    /// The filesystem layer
    fn filesystem(&mut self) -> &mut Self::Fs;

    /// Backlight PWM channel
    fn backlight_pwm(&mut self, config: &BacklightConfig) -> Self::Pwm;

    /// A blocking delay provider
    fn delay(&mut self) -> Self::Delay;

    /// The tick source
    fn clock(&self) -> Self::Clock;

    /// Ask the allocator to return freed memory (garbage collection on
    /// managed runtimes, a no-op on most boards)
    fn reclaim_memory(&mut self) {}
}
