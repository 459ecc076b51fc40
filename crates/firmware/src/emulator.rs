//! Desktop board for running the firmware without hardware.
//!
//! The panel is the modelled [`MockDisplay`], so diagnostics measure the
//! transfer model on a simulated microsecond clock and stay deterministic.
//! Files come from a host directory through [`LocalFilesystem`], and
//! backlight fades sleep for real through `embassy_time::Delay`.
//!
//! ```bash
//! SD_ROOT=./sdcard RUST_LOG=debug \
//!     cargo run -p firmware --example bringup_emulator --features emulator
//! ```

use std::path::PathBuf;

use embassy_time::Delay;
use platform::mocks::{
    MockBlockDevice, MockBoard, MockBus, MockDisplay, MockLcdBus, MockPwm, SimClock,
    TransferModel,
};
use platform::storage_local::LocalFilesystem;
use platform::{
    BacklightConfig, Board, BusPins, CreateError, DisplayConfig, LcdBusConfig, StorageConfig,
};
use tracing_subscriber::EnvFilter;

/// Environment variable naming the directory mounted as the SD volume
pub const SD_ROOT_ENV: &str = "SD_ROOT";

/// Directory used when [`SD_ROOT_ENV`] is unset
pub const DEFAULT_SD_ROOT: &str = "sdcard";

/// Install a `tracing` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Board made of host fakes: modelled SPI panel, RAM-disk SD card,
/// directory-backed filesystem and a real-time delay.
pub struct EmulatorBoard {
    inner: MockBoard<LocalFilesystem>,
}

impl EmulatorBoard {
    /// Board serving files from `root`, with 80 MHz DMA timing
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_transfer_model(root, TransferModel::default())
    }

    /// Board serving files from `$SD_ROOT`, or [`DEFAULT_SD_ROOT`]
    pub fn from_env() -> Self {
        let root = std::env::var_os(SD_ROOT_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_SD_ROOT), PathBuf::from);
        Self::new(root)
    }

    /// Board with a custom panel timing model
    pub fn with_transfer_model(root: impl Into<PathBuf>, model: TransferModel) -> Self {
        let inner = MockBoard::new()
            .with_transfer_model(model)
            .with_filesystem(LocalFilesystem::new(root));
        Self { inner }
    }

    /// The simulated clock the panel model advances
    pub fn sim_clock(&self) -> SimClock {
        self.inner.sim_clock()
    }

    /// The wrapped mock board
    pub fn inner(&self) -> &MockBoard<LocalFilesystem> {
        &self.inner
    }
}

impl Board for EmulatorBoard {
    type Bus = MockBus;
    type LcdBus = MockLcdBus;
    type Display = MockDisplay;
    type Storage = MockBlockDevice;
    type Fs = LocalFilesystem;
    type Pwm = MockPwm;
    type Delay = Delay;
    type Clock = SimClock;

    fn create_bus(&mut self, pins: &BusPins) -> Result<Self::Bus, CreateError> {
        self.inner.create_bus(pins)
    }

    fn create_lcd_bus(
        &mut self,
        bus: &Self::Bus,
        config: &LcdBusConfig,
    ) -> Result<Self::LcdBus, CreateError> {
        self.inner.create_lcd_bus(bus, config)
    }

    fn create_display(
        &mut self,
        lcd_bus: Self::LcdBus,
        config: &DisplayConfig,
    ) -> Result<Self::Display, CreateError> {
        self.inner.create_display(lcd_bus, config)
    }

    fn create_storage(
        &mut self,
        bus: &Self::Bus,
        config: &StorageConfig,
    ) -> Result<Self::Storage, CreateError> {
        self.inner.create_storage(bus, config)
    }

    fn filesystem(&mut self) -> &mut Self::Fs {
        self.inner.filesystem()
    }

    fn backlight_pwm(&mut self, config: &BacklightConfig) -> Self::Pwm {
        self.inner.backlight_pwm(config)
    }

    fn delay(&mut self) -> Self::Delay {
        Delay
    }

    fn clock(&self) -> Self::Clock {
        self.inner.clock()
    }

    fn reclaim_memory(&mut self) {
        debug!("reclaim_memory: nothing to do on the host");
        self.inner.reclaim_memory();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ResourceOrchestrator;
    use platform::BoardConfig;

    #[test]
    fn loads_image_from_host_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Test.rgb565"), vec![0xAB; 115_200]).unwrap();

        let board = EmulatorBoard::new(dir.path());
        let mut orch = ResourceOrchestrator::new(board, BoardConfig::default());
        assert!(orch.bring_up_all().all_ok());
        let image = orch.load_image("Test.rgb565", false).unwrap();
        assert_eq!(image.len(), 115_200);
        orch.show_image(&image, 0, 0).unwrap();
        assert!(!orch.status().storage_mounted);
    }
}
