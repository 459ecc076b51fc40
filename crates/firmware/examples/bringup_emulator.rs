//! Bring-up walk-through on the desktop emulator board.
//!
//! Run with:
//!   SD_ROOT=./sdcard cargo run -p firmware --example bringup_emulator --features emulator
//!
//! Put a 240×240 raw RGB565 dump named `Test.rgb565` in `$SD_ROOT` to see the
//! image path succeed; without it the loader reports the missing file and the
//! demo carries on.

use embassy_time::Duration;
use firmware::emulator::{init_tracing, EmulatorBoard};
use firmware::selftest::{display_self_test, storage_probe};
use firmware::{quick_check, run_diagnostics, DiagnosticConfig, ResourceOrchestrator};
use platform::config::{self, DEFAULT_IMAGE};
use platform::BoardConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    println!("{} v{} - emulator bring-up\n", config::APP_NAME, config::APP_VERSION);

    let mut orch = ResourceOrchestrator::new(EmulatorBoard::from_env(), BoardConfig::default());

    let summary = orch.bring_up_all();
    if let Some(e) = summary.first_error() {
        println!("bring-up failed: {e}");
        return Err(e.into());
    }
    println!("✓ bus, display and SD card ready");

    orch.fade_backlight(1.0, Duration::from_millis(500))?;
    println!("✓ backlight on");

    let stages = display_self_test(&mut orch)?;
    println!("✓ display self test ({stages} stages)");

    let probe = storage_probe(&mut orch)?;
    println!(
        "✓ SD card: {} sectors x {} bytes ({} MB), boot signature {}",
        probe.sector_count,
        probe.sector_size,
        probe.capacity_mb,
        if probe.signature_ok { "ok" } else { "missing" }
    );

    match orch.load_image(DEFAULT_IMAGE, true) {
        Some(image) => match orch.show_image(&image, 0, 0) {
            Ok(()) => println!("✓ {DEFAULT_IMAGE} shown ({} bytes)", image.len()),
            Err(e) => println!("⚠ {DEFAULT_IMAGE} not shown: {e}"),
        },
        None => println!("⚠ {DEFAULT_IMAGE} not found on the SD volume"),
    }

    let diagnostics = DiagnosticConfig::default();
    let report = run_diagnostics(&mut orch, &diagnostics)?;
    println!("\n{report}\n");

    let check = quick_check(&mut orch, &diagnostics)?;
    println!("Quick check:\n{check}\n");

    orch.fade_backlight(0.0, Duration::from_millis(300))?;
    orch.unmount_storage()?;
    println!("✓ backlight off, SD unmounted");
    Ok(())
}
