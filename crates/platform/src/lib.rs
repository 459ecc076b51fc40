//! Hardware Abstraction Layer for the S3 LCD + SD board
//!
//! This crate provides trait-based abstractions for every hardware
//! collaborator the bring-up firmware talks to, enabling development and
//! testing without physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate: orchestrator, loader, diagnostics)
//!         ↓
//! Platform HAL (this crate - trait abstractions + board config)
//!         ↓
//! Vendor drivers (SPI master, LCD panel IO, SDSPI, FAT VFS, LEDC PWM)
//! ```
//!
//! # Abstraction Levels
//!
//! ## Bus-attached peripherals
//! - [`SpiBus`] - the shared SPI host
//! - [`Rgb565Display`] - LCD controller primitives (fill/pixel/line/blit/show)
//! - [`BlockDevice`] - SD card sector I/O
//! - [`Filesystem`] - mount layer with byte-stream [`File`] reads
//!
//! ## Board services
//! - [`Board`] - factory that constructs every handle from [`config`]
//! - [`MonotonicClock`] - wrapping microsecond tick counter
//! - PWM and delay come straight from `embedded-hal` 1.0
//!
//! # Features
//!
//! - `std`: host fakes ([`mocks`]) and the directory-backed filesystem
//! - `defmt`: enable `defmt::Format` derives
//!
//! # Example
//!
//! ```no_run
//! use platform::{Rgb565Display, RgbColor, Rgb565};
//!
//! fn splash<D: Rgb565Display>(display: &mut D) -> Result<(), D::Error> {
//!     display.fill(Rgb565::BLUE)?;
//!     display.show()
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![allow(clippy::doc_markdown)]
#![allow(clippy::must_use_candidate)] // hardware accessors, callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

extern crate alloc;

pub mod board;
pub mod bus;
pub mod clock;
pub mod config;
pub mod display;
pub mod pixel;
pub mod storage;

#[cfg(any(test, feature = "std"))]
pub mod mocks;
#[cfg(any(test, feature = "std"))]
pub mod storage_local;

// Re-export main traits
pub use board::{Board, CreateError};
pub use bus::SpiBus;
pub use clock::{ticks_diff, EmbassyClock, MonotonicClock};
pub use display::{DisplayError, Rgb565Display, Rotation};
pub use pixel::{framebuffer_len, pack_rgb565, BufferSizeError, PixelBuffer, BYTES_PER_PIXEL};
pub use storage::{BlockDevice, File, Filesystem, IoctlOp, StorageError, BLOCK_SIZE};

// Re-export configuration types
pub use config::{
    BacklightConfig, BoardConfig, BusPins, DisplayConfig, LcdBusConfig, StorageConfig,
};

// embedded-graphics vocabulary used throughout the display seam
pub use embedded_graphics::pixelcolor::{Rgb565, RgbColor};
pub use embedded_graphics::prelude::{Point, Size};
pub use embedded_graphics::primitives::Rectangle;
