//! Mock board: bus, panel-IO, PWM and delay fakes plus the factory tying
//! them to one probe and clock.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::pwm::{ErrorType, SetDutyCycle};

use super::{
    Event, FailPoint, MockBlockDevice, MockDisplay, MockFilesystem, MockProbe, SimClock,
    TransferModel,
};
use crate::board::{Board, CreateError};
use crate::bus::SpiBus;
use crate::config::{BacklightConfig, BusPins, DisplayConfig, LcdBusConfig, StorageConfig};
use crate::storage::Filesystem;

/// Error returned by an operation forced to fail via [`MockProbe::fail`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectedFault(pub FailPoint);

/// Mock SPI host
#[derive(Debug)]
pub struct MockBus {
    pins: BusPins,
    initialized: bool,
    probe: MockProbe,
}

impl MockBus {
    /// Pins the bus was created with
    pub fn pins(&self) -> BusPins {
        self.pins
    }

    /// Whether `init` has run
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl SpiBus for MockBus {
    type Error = InjectedFault;

    fn init(&mut self) -> Result<(), Self::Error> {
        if self.probe.should_fail(FailPoint::BusInit) {
            return Err(InjectedFault(FailPoint::BusInit));
        }
        self.initialized = true;
        self.probe.record(Event::BusInit);
        Ok(())
    }
}

/// Mock LCD panel-IO adapter
#[derive(Debug, Clone, Copy)]
pub struct MockLcdBus {
    /// Adapter parameters the board was asked for
    pub config: LcdBusConfig,
}

/// PWM channel that logs every duty write as [`Event::Duty`]
#[derive(Debug, Clone)]
pub struct MockPwm {
    max_duty: u16,
    probe: MockProbe,
}

impl MockPwm {
    /// 16-bit channel
    pub fn new(probe: MockProbe) -> Self {
        Self::with_max_duty(probe, u16::MAX)
    }

    /// Channel with a custom resolution (e.g. 1023 for 10-bit LEDC)
    pub fn with_max_duty(probe: MockProbe, max_duty: u16) -> Self {
        Self { max_duty, probe }
    }
}

impl ErrorType for MockPwm {
    type Error = Infallible;
}

impl SetDutyCycle for MockPwm {
    fn max_duty_cycle(&self) -> u16 {
        self.max_duty
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.probe.record(Event::Duty(duty));
        Ok(())
    }
}

/// Delay that advances a [`SimClock`] instead of sleeping
#[derive(Debug, Clone)]
pub struct MockDelay {
    clock: SimClock,
    probe: MockProbe,
}

impl MockDelay {
    /// Delay advancing `clock`
    pub fn new(clock: SimClock, probe: MockProbe) -> Self {
        Self { clock, probe }
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.clock.advance_us(ns / 1000);
        self.probe.record(Event::Delay(ns));
    }
}

/// Board whose handles are all mocks sharing one probe and clock.
///
/// The filesystem defaults to [`MockFilesystem`]; the emulator swaps in
/// [`LocalFilesystem`](crate::storage_local::LocalFilesystem) via
/// [`MockBoard::with_filesystem`].
pub struct MockBoard<F = MockFilesystem> {
    probe: MockProbe,
    clock: SimClock,
    model: TransferModel,
    card_blocks: u32,
    pwm_max_duty: u16,
    fs: F,
}

impl MockBoard<MockFilesystem> {
    /// Board with an empty in-memory volume and the default transfer model
    pub fn new() -> Self {
        let probe = MockProbe::new();
        Self {
            fs: MockFilesystem::new(probe.clone()),
            probe,
            clock: SimClock::new(),
            model: TransferModel::default(),
            card_blocks: 2048,
            pwm_max_duty: u16::MAX,
        }
    }
}

impl Default for MockBoard<MockFilesystem> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> MockBoard<F> {
    /// Replace the filesystem layer
    pub fn with_filesystem<G: Filesystem>(self, fs: G) -> MockBoard<G> {
        MockBoard {
            probe: self.probe,
            clock: self.clock,
            model: self.model,
            card_blocks: self.card_blocks,
            pwm_max_duty: self.pwm_max_duty,
            fs,
        }
    }

    /// Set the display timing model
    #[must_use]
    pub fn with_transfer_model(mut self, model: TransferModel) -> Self {
        self.model = model;
        self
    }

    /// Start simulated time at `clock`
    #[must_use]
    pub fn with_clock(mut self, clock: SimClock) -> Self {
        self.clock = clock;
        self
    }

    /// Card size in 512-byte sectors
    #[must_use]
    pub fn with_card_blocks(mut self, blocks: u32) -> Self {
        self.card_blocks = blocks;
        self
    }

    /// Backlight PWM resolution
    #[must_use]
    pub fn with_pwm_max_duty(mut self, max_duty: u16) -> Self {
        self.pwm_max_duty = max_duty;
        self
    }

    /// Shared probe
    pub fn probe(&self) -> MockProbe {
        self.probe.clone()
    }

    /// Shared clock
    pub fn sim_clock(&self) -> SimClock {
        self.clock.clone()
    }

    /// The filesystem layer
    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// The filesystem layer, mutably
    pub fn fs_mut(&mut self) -> &mut F {
        &mut self.fs
    }

    fn gate(&self, point: FailPoint, event: Event) -> Result<(), CreateError> {
        if self.probe.should_fail(point) {
            return Err(CreateError::Unavailable);
        }
        self.probe.record(event);
        Ok(())
    }
}

impl<F: Filesystem> Board for MockBoard<F> {
    type Bus = MockBus;
    type LcdBus = MockLcdBus;
    type Display = MockDisplay;
    type Storage = MockBlockDevice;
    type Fs = F;
    type Pwm = MockPwm;
    type Delay = MockDelay;
    type Clock = SimClock;

    fn create_bus(&mut self, pins: &BusPins) -> Result<Self::Bus, CreateError> {
        self.gate(FailPoint::BusCreate, Event::BusCreated)?;
        Ok(MockBus {
            pins: *pins,
            initialized: false,
            probe: self.probe.clone(),
        })
    }

    fn create_lcd_bus(
        &mut self,
        bus: &Self::Bus,
        config: &LcdBusConfig,
    ) -> Result<Self::LcdBus, CreateError> {
        if !bus.is_initialized() {
            return Err(CreateError::InvalidConfig);
        }
        self.gate(FailPoint::LcdBusCreate, Event::LcdBusCreated)?;
        Ok(MockLcdBus { config: *config })
    }

    fn create_display(
        &mut self,
        _lcd_bus: Self::LcdBus,
        config: &DisplayConfig,
    ) -> Result<Self::Display, CreateError> {
        self.gate(FailPoint::DisplayCreate, Event::DisplayCreated)?;
        Ok(MockDisplay::with_parts(
            config.width,
            config.height,
            self.probe.clone(),
            self.clock.clone(),
            self.model,
        ))
    }

    fn create_storage(
        &mut self,
        bus: &Self::Bus,
        _config: &StorageConfig,
    ) -> Result<Self::Storage, CreateError> {
        if !bus.is_initialized() {
            return Err(CreateError::InvalidConfig);
        }
        self.gate(FailPoint::StorageCreate, Event::StorageCreated)?;
        Ok(MockBlockDevice::with_probe(self.card_blocks, self.probe.clone()))
    }

    fn filesystem(&mut self) -> &mut Self::Fs {
        &mut self.fs
    }

    fn backlight_pwm(&mut self, _config: &BacklightConfig) -> Self::Pwm {
        MockPwm::with_max_duty(self.probe.clone(), self.pwm_max_duty)
    }

    fn delay(&mut self) -> Self::Delay {
        MockDelay::new(self.clock.clone(), self.probe.clone())
    }

    fn clock(&self) -> Self::Clock {
        self.clock.clone()
    }

    fn reclaim_memory(&mut self) {
        self.probe.record(Event::Reclaim);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::clock::MonotonicClock;
    use crate::config::XIAO_ESP32S3_ST7789;

    #[test]
    fn lcd_bus_requires_initialised_bus() {
        let mut board = MockBoard::new();
        let cfg = XIAO_ESP32S3_ST7789;
        let mut bus = board.create_bus(&cfg.bus).unwrap();
        assert_eq!(
            board.create_lcd_bus(&bus, &cfg.lcd_bus).unwrap_err(),
            CreateError::InvalidConfig
        );
        bus.init().unwrap();
        assert_eq!(board.create_lcd_bus(&bus, &cfg.lcd_bus).unwrap().config.dc, 2);
    }

    #[test]
    fn injected_create_failure() {
        let mut board = MockBoard::new();
        board.probe().fail(FailPoint::BusCreate);
        assert_eq!(
            board.create_bus(&XIAO_ESP32S3_ST7789.bus).unwrap_err(),
            CreateError::Unavailable
        );
        assert!(board.probe().events().is_empty());
    }

    #[test]
    fn delay_advances_shared_clock() {
        let mut board = MockBoard::new();
        let mut delay = board.delay();
        delay.delay_ms(5);
        assert_eq!(board.clock().now_us(), 5_000);
    }
}
