//! S3 LCD bring-up firmware
//!
//! Resource orchestration and transfer diagnostics for an SPI RGB565 panel
//! sharing its bus with an SD card, plus a PWM backlight.
//!
//! # Architecture
//!
//! This firmware follows a layered architecture:
//!
//! ```text
//! Demo / application (examples/bringup_emulator.rs)
//!         ↓
//! Image loader, blit pipeline, diagnostics, self tests
//!         ↓
//! ResourceOrchestrator (owns every handle, brings them up in order)
//!         ↓
//! Platform HAL (platform::Board and its traits)
//! ```
//!
//! The orchestrator is the only component that constructs hardware. Every
//! other entry point takes `&mut ResourceOrchestrator` and calls its
//! idempotent `ensure_*` operations first.
//!
//! # Features
//!
//! - `std` - Enable standard library (host fakes from `platform`)
//! - `defmt` - Log through defmt on target builds
//! - `tracing` - Log through tracing on host builds
//! - `emulator` - Desktop board (`std` + `tracing` + embassy std driver)
//!
//! # Examples
//!
//! ## Emulator Target
//!
//! ```bash
//! SD_ROOT=./sdcard cargo run -p firmware --example bringup_emulator --features emulator
//! ```

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
// Upgrade relevant warns to deny; keep pedantic as warn (too noisy for firmware)
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Critical correctness: deny these
#![deny(unsafe_op_in_unsafe_fn)]
// unsafe fn body is not implicitly unsafe block
// Logging discipline (allow println in tests via clippy.toml)
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![warn(clippy::dbg_macro)] // dbg! should not be left in committed code
// Intentional allows for this codebase:
#![allow(clippy::module_name_repetitions)] // common in Rust crates; not a real issue
#![allow(clippy::missing_errors_doc)] // most errors are self-explanatory
// Pedantic lints too noisy for firmware application code:
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::similar_names)]

extern crate alloc;

// Must be first so the logging macros are visible to every module below.
#[macro_use]
mod macros;

pub mod backlight;
pub mod diagnostics;
pub mod display;
pub mod error;
pub mod image;
pub mod orchestrator;
pub mod selftest;
pub mod storage;

#[cfg(feature = "emulator")]
pub mod emulator;

// Re-export key types
pub use backlight::{Backlight, FADE_IN_STEPS, FADE_OUT_STEPS};
pub use diagnostics::{
    analyze, quick_check, run_diagnostics, DiagnosticConfig, DiagnosticReport, QuickCheck,
    TestCase, TransferStats,
};
pub use display::DisplayHandle;
pub use error::{BringUpFailure, Error, IoFailure, MountStateError, Resource};
pub use orchestrator::{BringUpSummary, ResourceOrchestrator, ResourceStatus};
pub use storage::StorageHandle;
