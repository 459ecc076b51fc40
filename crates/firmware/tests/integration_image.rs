//! Image loader integration tests.
//!
//! Round trips a staged RGB565 file through `load_image` and the blit
//! pipeline, on both the in-memory volume and a host directory.
//!
//! Run with: cargo test -p firmware --test integration_image
#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use firmware::{BringUpFailure, Error, IoFailure, ResourceOrchestrator};
use platform::mocks::{Event, FailPoint, MockBoard};
use platform::storage_local::LocalFilesystem;
use platform::{pack_rgb565, BoardConfig, Rgb565, RgbColor};

const FRAME: usize = 240 * 240 * 2;

fn red_frame() -> Vec<u8> {
    pack_rgb565(Rgb565::RED).repeat(FRAME / 2)
}

fn staged(name: &str, contents: Vec<u8>) -> ResourceOrchestrator<MockBoard> {
    let mut board = MockBoard::new();
    board.fs_mut().write_file(name, contents);
    ResourceOrchestrator::new(board, BoardConfig::default())
}

// ---------------------------------------------------------------------------
// Test: keep_mounted
// ---------------------------------------------------------------------------

/// keep_mounted = false returns the bytes and leaves the volume unmounted.
#[test]
fn test_load_and_release_mount() {
    let mut orch = staged("Test.rgb565", red_frame());
    let image = orch.load_image("Test.rgb565", false).unwrap();
    assert_eq!(image, red_frame());
    assert!(!orch.status().storage_mounted);
    assert!(!orch.board().fs().is_mounted());

    let probe = orch.board().probe();
    assert_eq!(probe.count(&Event::Mount), 1);
    assert_eq!(probe.count(&Event::Unmount), 1);
}

/// keep_mounted = true leaves the volume mounted, and a second load reuses it.
#[test]
fn test_load_and_keep_mount() {
    let mut orch = staged("Test.rgb565", red_frame());
    orch.load_image("Test.rgb565", true).unwrap();
    assert!(orch.status().storage_mounted);
    orch.load_image("Test.rgb565", true).unwrap();

    let probe = orch.board().probe();
    assert_eq!(probe.count(&Event::Mount), 1);
    assert_eq!(probe.count(&Event::Unmount), 0);
    assert_eq!(probe.count(&Event::Open), 2);
}

fn init_order(board: &MockBoard) -> Vec<Event> {
    board
        .probe()
        .events()
        .into_iter()
        .filter(|e| matches!(e, Event::BusInit | Event::DisplayInit | Event::StorageInit))
        .collect()
}

/// On a fresh board the loader initialises the display before the card.
#[test]
fn test_loader_brings_up_display_before_storage() {
    let mut orch = staged("Test.rgb565", red_frame());
    orch.load_image("Test.rgb565", false).unwrap();
    orch.ensure_display_ready().unwrap();

    let status = orch.status();
    assert!(status.bus_ready && status.display_ready && status.storage_ready);
    assert_eq!(
        init_order(orch.board()),
        vec![Event::BusInit, Event::DisplayInit, Event::StorageInit]
    );
}

/// A display that fails to initialise stops the loader before the card.
#[test]
fn test_loader_stops_on_display_failure() {
    let mut orch = staged("Test.rgb565", red_frame());
    orch.board().probe().fail(FailPoint::DisplayInit);
    assert_eq!(
        orch.try_load_image("Test.rgb565", false),
        Err(Error::BringUp(BringUpFailure::DisplayInit))
    );
    assert_eq!(orch.board().probe().count(&Event::StorageInit), 0);
    assert!(!orch.status().storage_ready);
}

// ---------------------------------------------------------------------------
// Test: load then show
// ---------------------------------------------------------------------------

/// A full-screen file reaches the panel unchanged.
#[test]
fn test_loaded_image_is_shown() {
    let mut orch = staged("Test.rgb565", red_frame());
    let image = orch.load_image("Test.rgb565", false).unwrap();
    orch.ensure_bus_ready().unwrap();
    orch.ensure_display_ready().unwrap();
    orch.show_image(&image, 0, 0).unwrap();

    let panel = orch.display().unwrap().driver();
    assert_eq!(panel.pixel_at(0, 0), Some(Rgb565::RED));
    assert_eq!(panel.pixel_at(239, 239), Some(Rgb565::RED));
    assert_eq!(panel.frames_shown(), 1);
}

/// A truncated file loads, but the blit pipeline refuses it.
#[test]
fn test_truncated_image_is_not_blitted() {
    let mut short = red_frame();
    short.truncate(FRAME - 2);
    let mut orch = staged("Test.rgb565", short);
    assert!(orch.bring_up_all().all_ok());
    let image = orch.load_image("Test.rgb565", false).unwrap();
    assert_eq!(image.len(), FRAME - 2);
    assert_eq!(
        orch.show_image(&image, 0, 0),
        Err(Error::SizeMismatch {
            expected: FRAME,
            actual: FRAME - 2
        })
    );
    assert!(orch.board().probe().blits().is_empty());
}

/// A missing file is Open, and the mount is still released.
#[test]
fn test_missing_file() {
    let mut orch = staged("other.rgb565", vec![0; 4]);
    assert_eq!(
        orch.try_load_image("Test.rgb565", false),
        Err(Error::Io(IoFailure::Open))
    );
    assert!(!orch.status().storage_mounted);
}

// ---------------------------------------------------------------------------
// Test: host directory volume
// ---------------------------------------------------------------------------

/// The directory-backed filesystem serves `/sd/<name>` from its root.
#[test]
fn test_round_trip_through_host_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Test.rgb565"), red_frame()).unwrap();

    let board = MockBoard::new().with_filesystem(LocalFilesystem::new(dir.path()));
    let mut orch = ResourceOrchestrator::new(board, BoardConfig::default());

    let image = orch.load_image("Test.rgb565", true).unwrap();
    assert_eq!(image.len(), FRAME);
    assert!(orch.board().fs().is_mounted());

    orch.unmount_storage().unwrap();
    assert!(!orch.board().fs().is_mounted());
    assert_eq!(
        orch.try_load_image("missing.rgb565", false),
        Err(Error::Io(IoFailure::Open))
    );
}
