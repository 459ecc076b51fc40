//! Orchestrator bring-up integration tests.
//!
//! Drives `ResourceOrchestrator` on the mock board and checks the lifecycle
//! rules through the probe's event log: idempotent `ensure_*`, fixed
//! bring-up order, and mount/unmount flag handling.
//!
//! Run with: cargo test -p firmware --test integration_bringup
#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use firmware::{BringUpFailure, Error, MountStateError, Resource, ResourceOrchestrator};
use platform::mocks::{Event, FailPoint, MockBoard, MockProbe};
use platform::BoardConfig;

fn orchestrator() -> (ResourceOrchestrator<MockBoard>, MockProbe) {
    let board = MockBoard::new();
    let probe = board.probe();
    (ResourceOrchestrator::new(board, BoardConfig::default()), probe)
}

fn creation_events(probe: &MockProbe) -> Vec<Event> {
    probe
        .events()
        .into_iter()
        .filter(|e| {
            matches!(
                e,
                Event::BusCreated
                    | Event::LcdBusCreated
                    | Event::DisplayCreated
                    | Event::StorageCreated
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Test: ensure_* idempotence
// ---------------------------------------------------------------------------

/// Calling each ensure operation twice constructs each handle exactly once.
#[test]
fn test_ensure_operations_are_idempotent() {
    let (mut orch, probe) = orchestrator();
    for _ in 0..2 {
        orch.ensure_bus_ready().unwrap();
        orch.ensure_display_ready().unwrap();
        orch.ensure_storage_ready().unwrap();
    }
    assert_eq!(probe.count(&Event::BusCreated), 1, "bus created once");
    assert_eq!(probe.count(&Event::BusInit), 1, "bus initialised once");
    assert_eq!(probe.count(&Event::DisplayCreated), 1, "display created once");
    assert_eq!(probe.count(&Event::DisplayInit), 1, "display initialised once");
    assert_eq!(probe.count(&Event::StorageCreated), 1, "storage created once");
    assert_eq!(probe.count(&Event::StorageInit), 1, "storage initialised once");

    let status = orch.status();
    assert!(status.bus_ready && status.display_ready && status.storage_ready);
    assert!(!status.storage_mounted);
}

/// A second bring_up_all on a fully ready board touches nothing.
#[test]
fn test_bring_up_all_twice_is_silent() {
    let (mut orch, probe) = orchestrator();
    assert!(orch.bring_up_all().all_ok());
    probe.clear_events();
    assert!(orch.bring_up_all().all_ok());
    assert!(probe.events().is_empty(), "no board calls on the second pass");
}

// ---------------------------------------------------------------------------
// Test: bring-up order
// ---------------------------------------------------------------------------

/// bring_up_all constructs bus, then display, then storage.
#[test]
fn test_bring_up_all_order() {
    let (mut orch, probe) = orchestrator();
    let summary = orch.bring_up_all();
    assert!(summary.all_ok());
    assert_eq!(summary.first_error(), None);
    assert_eq!(
        creation_events(&probe),
        vec![
            Event::BusCreated,
            Event::LcdBusCreated,
            Event::DisplayCreated,
            Event::StorageCreated
        ]
    );
}

/// Storage can be brought up before the display; the display still works after.
#[test]
fn test_storage_before_display_is_valid() {
    let (mut orch, probe) = orchestrator();
    orch.ensure_bus_ready().unwrap();
    orch.ensure_storage_ready().unwrap();
    orch.ensure_display_ready().unwrap();
    assert_eq!(
        creation_events(&probe),
        vec![
            Event::BusCreated,
            Event::StorageCreated,
            Event::LcdBusCreated,
            Event::DisplayCreated
        ]
    );
    let frame = vec![0u8; 240 * 240 * 2];
    orch.show_image(&frame, 0, 0).unwrap();
}

/// Without a bus neither peripheral is attempted.
#[test]
fn test_peripherals_require_bus() {
    let (mut orch, probe) = orchestrator();
    assert_eq!(orch.ensure_display_ready(), Err(Error::NotReady(Resource::Bus)));
    assert_eq!(orch.ensure_storage_ready(), Err(Error::NotReady(Resource::Bus)));
    assert!(creation_events(&probe).is_empty());
}

/// A failed display step does not stop storage bring-up.
#[test]
fn test_bring_up_all_attempts_every_step() {
    let (mut orch, probe) = orchestrator();
    probe.fail(FailPoint::DisplayCreate);
    let summary = orch.bring_up_all();
    assert_eq!(summary.bus, Ok(()));
    assert_eq!(summary.display, Err(Error::BringUp(BringUpFailure::DisplayCreate)));
    assert_eq!(summary.storage, Ok(()));
    assert_eq!(
        summary.first_error(),
        Some(Error::BringUp(BringUpFailure::DisplayCreate))
    );
    let status = orch.status();
    assert!(status.bus_ready && !status.display_ready && status.storage_ready);
}

/// A bus that fails init is not stored and is recreated on the next call.
#[test]
fn test_failed_bus_init_is_retried_on_demand() {
    let (mut orch, probe) = orchestrator();
    probe.fail(FailPoint::BusInit);
    assert_eq!(
        orch.ensure_bus_ready(),
        Err(Error::BringUp(BringUpFailure::BusInit))
    );
    assert!(!orch.status().bus_ready);
    probe.heal(FailPoint::BusInit);
    orch.ensure_bus_ready().unwrap();
    assert_eq!(probe.count(&Event::BusCreated), 2);
}

// ---------------------------------------------------------------------------
// Test: mount state
// ---------------------------------------------------------------------------

/// Mounting twice mounts once; unmounting twice unmounts once.
#[test]
fn test_mount_and_unmount_are_idempotent() {
    let (mut orch, probe) = orchestrator();
    assert!(orch.bring_up_all().all_ok());

    orch.mount_storage().unwrap();
    orch.mount_storage().unwrap();
    assert_eq!(probe.count(&Event::Mount), 1);
    assert!(orch.status().storage_mounted);

    orch.unmount_storage().unwrap();
    orch.unmount_storage().unwrap();
    assert_eq!(probe.count(&Event::Unmount), 1);
    assert!(!orch.status().storage_mounted);
}

/// Mounting without a storage handle is a typed error, not a panic.
#[test]
fn test_mount_requires_storage() {
    let (mut orch, probe) = orchestrator();
    orch.ensure_bus_ready().unwrap();
    assert_eq!(
        orch.mount_storage(),
        Err(Error::MountState(MountStateError::StorageNotReady))
    );
    assert_eq!(probe.count(&Event::Mount), 0);
}

/// A failed mount leaves the flag clear; a later attempt can succeed.
#[test]
fn test_failed_mount_leaves_flag_clear() {
    let (mut orch, probe) = orchestrator();
    assert!(orch.bring_up_all().all_ok());
    probe.fail(FailPoint::Mount);
    assert_eq!(
        orch.mount_storage(),
        Err(Error::MountState(MountStateError::MountFailed))
    );
    assert!(!orch.status().storage_mounted);
    probe.heal(FailPoint::Mount);
    orch.mount_storage().unwrap();
    assert!(orch.is_storage_mounted());
}

/// Unmounting when never mounted issues no filesystem call.
#[test]
fn test_unmount_when_not_mounted_is_noop() {
    let (mut orch, probe) = orchestrator();
    orch.unmount_storage().unwrap();
    assert_eq!(probe.count(&Event::Unmount), 0);
}

// ---------------------------------------------------------------------------
// Test: blit pipeline
// ---------------------------------------------------------------------------

/// Blitting before display bring-up is NotReady(Display).
#[test]
fn test_blit_requires_display() {
    let (mut orch, probe) = orchestrator();
    assert_eq!(
        orch.blit_and_show(&[0u8; 200], 0, 0, 10, 10),
        Err(Error::NotReady(Resource::Display))
    );
    assert!(probe.blits().is_empty());
}

/// A mis-sized buffer is rejected with no driver call at all.
#[test]
fn test_size_mismatch_touches_nothing() {
    let (mut orch, probe) = orchestrator();
    assert!(orch.bring_up_all().all_ok());
    probe.clear_events();
    let image = vec![0u8; 115_199];
    assert_eq!(
        orch.show_image(&image, 0, 0),
        Err(Error::SizeMismatch {
            expected: 115_200,
            actual: 115_199
        })
    );
    assert!(probe.events().is_empty());
}

/// A driver failure during blit surfaces as Transfer and skips show.
#[test]
fn test_blit_failure_is_transfer_error() {
    let (mut orch, probe) = orchestrator();
    assert!(orch.bring_up_all().all_ok());
    probe.fail(FailPoint::Blit);
    probe.clear_events();
    assert_eq!(
        orch.blit_and_show(&[0u8; 200], 0, 0, 10, 10),
        Err(Error::Transfer)
    );
    assert_eq!(probe.count(&Event::Show), 0);
}
