//! Mock implementations for testing
//!
//! This module provides mock implementations of all platform traits
//! for use in unit and integration tests and in the desktop emulator.
//!
//! Every mock created by one [`MockBoard`] shares a [`MockProbe`]: an event
//! log plus a set of [`FailPoint`]s that make the matching operation fail
//! until healed. Time is simulated by [`SimClock`]; the display advances it
//! according to its [`TransferModel`] so transfer timing is deterministic.

#![cfg(any(test, feature = "std"))]

mod board;
mod display;
mod storage;

pub use board::{InjectedFault, MockBoard, MockBus, MockDelay, MockLcdBus, MockPwm};
pub use display::{MockDisplay, TransferModel};
pub use storage::{MockBlockDevice, MockFile, MockFilesystem};

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::primitives::Rectangle;

use crate::clock::MonotonicClock;

/// Operations a test can force to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    /// `Board::create_bus`
    BusCreate,
    /// `SpiBus::init`
    BusInit,
    /// `Board::create_lcd_bus`
    LcdBusCreate,
    /// `Board::create_display`
    DisplayCreate,
    /// `Rgb565Display::init`
    DisplayInit,
    /// `Board::create_storage`
    StorageCreate,
    /// `BlockDevice::init`
    StorageInit,
    /// `Filesystem::mount`
    Mount,
    /// `Filesystem::unmount`
    Unmount,
    /// `Filesystem::open_file`
    Open,
    /// `File::read`
    Read,
    /// `Rgb565Display::blit`
    Blit,
    /// `Rgb565Display::show`
    Show,
}

/// Something a mock did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// SPI host constructed
    BusCreated,
    /// SPI host initialised
    BusInit,
    /// LCD panel-IO adapter constructed
    LcdBusCreated,
    /// Display driver constructed
    DisplayCreated,
    /// Display controller initialised
    DisplayInit,
    /// SD handle constructed
    StorageCreated,
    /// SD card initialised
    StorageInit,
    /// Volume mounted
    Mount,
    /// Volume unmounted
    Unmount,
    /// File opened
    Open,
    /// Whole-frame fill
    Fill(Rgb565),
    /// Single pixel
    Pixel,
    /// Line
    Line,
    /// Blit of `len` bytes into `area`
    Blit {
        /// Buffer length
        len: usize,
        /// Destination
        area: Rectangle,
    },
    /// Frame pushed to the panel
    Show,
    /// PWM duty written
    Duty(u16),
    /// Blocking delay, in nanoseconds
    Delay(u32),
    /// `Board::reclaim_memory`
    Reclaim,
}

#[derive(Debug, Default)]
struct ProbeState {
    events: Vec<Event>,
    failing: HashSet<FailPoint>,
}

/// Shared event log and failure injection.
#[derive(Debug, Clone, Default)]
pub struct MockProbe(Rc<RefCell<ProbeState>>);

impl MockProbe {
    /// Fresh probe with no events and nothing failing
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `point` fail until [`MockProbe::heal`]
    pub fn fail(&self, point: FailPoint) {
        self.0.borrow_mut().failing.insert(point);
    }

    /// Stop failing `point`
    pub fn heal(&self, point: FailPoint) {
        self.0.borrow_mut().failing.remove(&point);
    }

    /// Whether `point` is currently failing
    pub fn should_fail(&self, point: FailPoint) -> bool {
        self.0.borrow().failing.contains(&point)
    }

    /// Append to the event log
    pub fn record(&self, event: Event) {
        self.0.borrow_mut().events.push(event);
    }

    /// Snapshot of the event log
    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().events.clone()
    }

    /// Number of logged events equal to `event`
    pub fn count(&self, event: &Event) -> usize {
        self.0.borrow().events.iter().filter(|e| *e == event).count()
    }

    /// Number of logged events matching `pred`
    pub fn count_where(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.0.borrow().events.iter().filter(|e| pred(e)).count()
    }

    /// Every PWM duty written, in order
    pub fn duties(&self) -> Vec<u16> {
        self.0
            .borrow()
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Duty(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    /// Every blit, in order
    pub fn blits(&self) -> Vec<(usize, Rectangle)> {
        self.0
            .borrow()
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Blit { len, area } => Some((*len, *area)),
                _ => None,
            })
            .collect()
    }

    /// Forget all logged events (fail points are kept)
    pub fn clear_events(&self) {
        self.0.borrow_mut().events.clear();
    }
}

/// Simulated microsecond counter shared by clones.
#[derive(Debug, Clone, Default)]
pub struct SimClock(Rc<Cell<u32>>);

impl SimClock {
    /// Clock at tick 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock at an arbitrary tick (e.g. just before wraparound)
    pub fn starting_at(us: u32) -> Self {
        Self(Rc::new(Cell::new(us)))
    }

    /// Move time forward, wrapping at `u32::MAX`
    pub fn advance_us(&self, us: u32) {
        self.0.set(self.0.get().wrapping_add(us));
    }
}

impl MonotonicClock for SimClock {
    fn now_us(&self) -> u32 {
        self.0.get()
    }
}
