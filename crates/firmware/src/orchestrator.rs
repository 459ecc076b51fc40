//! Resource lifecycle orchestrator.
//!
//! Owns every hardware handle and brings them up lazily in the order
//!
//! ```text
//! bus → display → storage → mount
//! ```
//!
//! Each `ensure_*` operation is idempotent: once a handle is present the
//! call returns `Ok(())` without touching the board. A failed step leaves
//! its handle empty and returns the failing step; nothing is retried until
//! the caller asks again.
//!
//! # Example
//!
//! ```ignore
//! let mut orch = ResourceOrchestrator::new(board, BoardConfig::default());
//! let summary = orch.bring_up_all();
//! if summary.all_ok() {
//!     orch.mount_storage()?;
//! }
//! ```

use embassy_time::Duration;
use platform::{
    BlockDevice, Board, BoardConfig, Filesystem, MonotonicClock, Rgb565Display, SpiBus,
};

use crate::backlight::Backlight;
use crate::display::DisplayHandle;
use crate::error::{BringUpFailure, Error, MountStateError, Resource};
use crate::storage::StorageHandle;

/// Point-in-time readiness snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResourceStatus {
    /// Bus handle present
    pub bus_ready: bool,
    /// Display handle present
    pub display_ready: bool,
    /// Storage handle present
    pub storage_ready: bool,
    /// Filesystem mounted
    pub storage_mounted: bool,
    /// Backlight lit
    pub backlight_on: bool,
}

/// Outcome of [`ResourceOrchestrator::bring_up_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BringUpSummary {
    /// `ensure_bus_ready`
    pub bus: Result<(), Error>,
    /// `ensure_display_ready`
    pub display: Result<(), Error>,
    /// `ensure_storage_ready`
    pub storage: Result<(), Error>,
}

impl BringUpSummary {
    /// Every step succeeded
    pub fn all_ok(&self) -> bool {
        self.bus.is_ok() && self.display.is_ok() && self.storage.is_ok()
    }

    /// The first failing step in bring-up order
    pub fn first_error(&self) -> Option<Error> {
        [self.bus, self.display, self.storage]
            .into_iter()
            .find_map(Result::err)
    }
}

/// Owner of the board and every handle built from it.
pub struct ResourceOrchestrator<B: Board> {
    board: B,
    config: BoardConfig,
    bus: Option<B::Bus>,
    display: Option<DisplayHandle<B::Display>>,
    storage: Option<StorageHandle<B::Storage>>,
    storage_mounted: bool,
    backlight: Backlight<B::Pwm, B::Delay>,
    clock: B::Clock,
}

impl<B: Board> ResourceOrchestrator<B> {
    /// Take ownership of `board`. No hardware is brought up; the backlight
    /// is driven to 0.
    pub fn new(mut board: B, config: BoardConfig) -> Self {
        let pwm = board.backlight_pwm(&config.backlight);
        let delay = board.delay();
        let clock = board.clock();
        let mut backlight = Backlight::new(pwm, delay);
        if backlight.set_brightness(0.0).is_err() {
            warn!("backlight: initial duty write failed");
        }
        Self {
            board,
            config,
            bus: None,
            display: None,
            storage: None,
            storage_mounted: false,
            backlight,
            clock,
        }
    }

    /// Readiness snapshot
    pub fn status(&self) -> ResourceStatus {
        ResourceStatus {
            bus_ready: self.bus.is_some(),
            display_ready: self.display.is_some(),
            storage_ready: self.storage.is_some(),
            storage_mounted: self.storage_mounted,
            backlight_on: self.backlight.is_on(),
        }
    }

    /// Board configuration
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// The board
    pub fn board(&self) -> &B {
        &self.board
    }

    /// The board, mutably (e.g. to stage files on a host filesystem)
    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    /// The tick source used for timing
    pub fn clock(&self) -> &B::Clock {
        &self.clock
    }

    /// Current clock reading in microseconds (wrapping)
    pub fn now_us(&self) -> u32 {
        self.clock.now_us()
    }

    /// Whether the filesystem is mounted
    pub fn is_storage_mounted(&self) -> bool {
        self.storage_mounted
    }

    /// The display handle, or `NotReady(Display)`
    pub fn display(&mut self) -> Result<&mut DisplayHandle<B::Display>, Error> {
        self.display
            .as_mut()
            .ok_or(Error::NotReady(Resource::Display))
    }

    /// The storage handle, or `NotReady(Storage)`
    pub fn storage(&mut self) -> Result<&mut StorageHandle<B::Storage>, Error> {
        self.storage
            .as_mut()
            .ok_or(Error::NotReady(Resource::Storage))
    }

    pub(crate) fn display_if_ready(&mut self) -> Option<&mut DisplayHandle<B::Display>> {
        self.display.as_mut()
    }

    /// The backlight
    pub fn backlight(&mut self) -> &mut Backlight<B::Pwm, B::Delay> {
        &mut self.backlight
    }

    /// Set the backlight level (clamped to `[0.0, 1.0]`)
    pub fn set_backlight(&mut self, fraction: f32) -> Result<(), Error> {
        self.backlight
            .set_brightness(fraction)
            .map_err(|_| Error::Backlight)
    }

    /// Blocking linear backlight fade
    pub fn fade_backlight(&mut self, target: f32, duration: Duration) -> Result<(), Error> {
        self.backlight
            .fade_to(target, duration)
            .map_err(|_| Error::Backlight)
    }

    /// Ask the board to return freed memory
    pub fn reclaim_memory(&mut self) {
        self.board.reclaim_memory();
    }

    /// Bring up the shared SPI bus.
    pub fn ensure_bus_ready(&mut self) -> Result<(), Error> {
        if self.bus.is_some() {
            return Ok(());
        }
        let pins = self.config.bus;
        let mut bus = self.board.create_bus(&pins).map_err(|e| {
            error!("SPI bus creation failed: {}", e);
            Error::BringUp(BringUpFailure::BusCreate)
        })?;
        if bus.init().is_err() {
            error!("SPI bus init failed");
            return Err(Error::BringUp(BringUpFailure::BusInit));
        }
        info!(
            "SPI bus ready (MISO {}, MOSI {}, SCLK {})",
            pins.miso,
            pins.mosi,
            pins.sclk
        );
        self.bus = Some(bus);
        Ok(())
    }

    /// Bring up the display controller. Requires the bus.
    pub fn ensure_display_ready(&mut self) -> Result<(), Error> {
        if self.display.is_some() {
            return Ok(());
        }
        let Some(bus) = self.bus.as_ref() else {
            warn!("display bring-up requested before SPI bus");
            return Err(Error::NotReady(Resource::Bus));
        };
        let lcd_cfg = self.config.lcd_bus;
        let display_cfg = self.config.display;

        let lcd_bus = self.board.create_lcd_bus(bus, &lcd_cfg).map_err(|e| {
            error!("LCD bus adapter creation failed: {}", e);
            Error::BringUp(BringUpFailure::LcdBusCreate)
        })?;
        let mut driver = self
            .board
            .create_display(lcd_bus, &display_cfg)
            .map_err(|e| {
                error!("display driver creation failed: {}", e);
                Error::BringUp(BringUpFailure::DisplayCreate)
            })?;
        if driver.init().is_err() {
            error!("display controller init failed");
            return Err(Error::BringUp(BringUpFailure::DisplayInit));
        }
        info!(
            "display ready: {}x{}, rotation {}, pclk {} Hz",
            display_cfg.width,
            display_cfg.height,
            display_cfg.rotation.index(),
            lcd_cfg.pclk_hz
        );
        self.display = Some(DisplayHandle::new(driver, &display_cfg));
        Ok(())
    }

    /// Bring up the SD card. Requires the bus.
    pub fn ensure_storage_ready(&mut self) -> Result<(), Error> {
        if self.storage.is_some() {
            return Ok(());
        }
        let Some(bus) = self.bus.as_ref() else {
            warn!("storage bring-up requested before SPI bus");
            return Err(Error::NotReady(Resource::Bus));
        };
        let storage_cfg = self.config.storage;
        let mut device = self
            .board
            .create_storage(bus, &storage_cfg)
            .map_err(|e| {
                error!("SD driver creation failed: {}", e);
                Error::BringUp(BringUpFailure::StorageCreate)
            })?;
        if device.init().is_err() {
            error!("SD card init failed");
            return Err(Error::BringUp(BringUpFailure::StorageInit));
        }
        info!("SD card ready (CS {})", storage_cfg.cs);
        self.storage = Some(StorageHandle::new(device));
        Ok(())
    }

    /// Mount the filesystem at the configured mount point. No-op when
    /// already mounted.
    pub fn mount_storage(&mut self) -> Result<(), Error> {
        if self.storage_mounted {
            return Ok(());
        }
        let Some(storage) = self.storage.as_mut() else {
            warn!("mount requested before SD bring-up");
            return Err(Error::MountState(MountStateError::StorageNotReady));
        };
        let mount_point = self.config.storage.mount_point;
        match self
            .board
            .filesystem()
            .mount(storage.device_mut(), mount_point)
        {
            Ok(()) => {
                self.storage_mounted = true;
                info!("SD mounted at {}", mount_point);
                Ok(())
            }
            Err(_) => {
                error!("SD mount at {} failed", mount_point);
                Err(Error::MountState(MountStateError::MountFailed))
            }
        }
    }

    /// Unmount the filesystem. No-op when not mounted; the mounted flag is
    /// only cleared if the unmount succeeds.
    pub fn unmount_storage(&mut self) -> Result<(), Error> {
        if !self.storage_mounted {
            return Ok(());
        }
        let mount_point = self.config.storage.mount_point;
        match self.board.filesystem().unmount(mount_point) {
            Ok(()) => {
                self.storage_mounted = false;
                info!("SD unmounted from {}", mount_point);
                Ok(())
            }
            Err(_) => {
                error!("SD unmount from {} failed", mount_point);
                Err(Error::MountState(MountStateError::UnmountFailed))
            }
        }
    }

    /// Bring up bus, display and storage in that order. Every step is
    /// attempted; later steps report `NotReady(Bus)` if the bus failed.
    pub fn bring_up_all(&mut self) -> BringUpSummary {
        let bus = self.ensure_bus_ready();
        let display = self.ensure_display_ready();
        let storage = self.ensure_storage_ready();
        let summary = BringUpSummary {
            bus,
            display,
            storage,
        };
        if summary.all_ok() {
            info!("bring-up complete");
        } else {
            warn!("bring-up incomplete");
        }
        summary
    }

    /// Release the board.
    pub fn into_board(self) -> B {
        self.board
    }
}
