use std::time::Duration;

use pocket_core::core::{Button, Emulator, StepContext, StepStatus};
use pocket_core::error::InitError;
use pocket_core::session::{LifecycleController, RunState, Session};
use pocket_machines::palette::Palette;
use pocket_machines::romview::ROW_BYTES;
use pocket_machines::{BackendOptions, RomView, TestCard};

mod common;
use common::{Rig, install, rom_image, save_path};

const NO_PACING: BackendOptions = BackendOptions { pacing: false };

fn step(emu: &mut dyn Emulator, rig: &mut Rig) -> StepStatus {
    let mut ctx = StepContext::new(&rig.keys, &mut rig.writer);
    emu.step(&mut ctx)
}

fn press(emu: &mut dyn Emulator, rig: &mut Rig, buttons: &[Button]) {
    for &b in buttons {
        rig.keys.set(b, true);
    }
    step(emu, rig);
    for &b in buttons {
        rig.keys.set(b, false);
    }
    step(emu, rig);
}

// ---------------------------------------------------------------------------
// Test card
// ---------------------------------------------------------------------------

#[test]
fn test_testcard_publishes_frames() {
    let dir = tempfile::tempdir().unwrap();
    let rom = install(dir.path(), &rom_image(0x00));
    let mut rig = Rig::new();
    let mut card = TestCard::new(&NO_PACING);
    card.init(&rom).unwrap();

    assert_eq!(step(&mut card, &mut rig), StepStatus::Continue);
    assert_eq!(rig.frames.generation(), 1);
    let frame = rig.frames.snapshot_for_draw().unwrap();
    assert_eq!(frame.pixel(0, 0), Palette::Corrected.rgba(0));

    card.toggle_display_mode();
    step(&mut card, &mut rig);
    let frame = rig.frames.snapshot_for_draw().unwrap();
    // Bars scroll by one column per frame; column 0 is still shade 0.
    assert_eq!(frame.pixel(0, 0), Palette::Raw.rgba(0));
}

#[test]
fn test_testcard_press_counter_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let rom = install(dir.path(), &rom_image(0x03));
    let mut rig = Rig::new();

    let mut card = TestCard::new(&NO_PACING);
    card.init(&rom).unwrap();
    press(&mut card, &mut rig, &[Button::A]);
    press(&mut card, &mut rig, &[Button::B, Button::Start]);
    // Holding a button counts once.
    rig.keys.set(Button::Up, true);
    for _ in 0..5 {
        step(&mut card, &mut rig);
    }
    assert_eq!(card.presses(), 4);

    card.save();
    card.teardown();
    assert!(save_path(dir.path()).exists());

    let mut card = TestCard::new(&NO_PACING);
    card.init(&rom).unwrap();
    assert_eq!(card.presses(), 4);
}

#[test]
fn test_save_without_changes_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let rom = install(dir.path(), &rom_image(0x03));
    let mut rig = Rig::new();

    let mut card = TestCard::new(&NO_PACING);
    card.init(&rom).unwrap();
    step(&mut card, &mut rig);
    card.save();
    assert!(!save_path(dir.path()).exists());
}

#[test]
fn test_cart_without_battery_never_saves() {
    let dir = tempfile::tempdir().unwrap();
    let rom = install(dir.path(), &rom_image(0x01));
    let mut rig = Rig::new();

    let mut card = TestCard::new(&NO_PACING);
    card.init(&rom).unwrap();
    press(&mut card, &mut rig, &[Button::A]);
    card.save();
    card.teardown();
    assert!(!dir.path().join("saves").exists());
}

#[test]
fn test_unsupported_cartridge_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let rom = install(dir.path(), &rom_image(0xFC));
    let mut card = TestCard::new(&NO_PACING);
    let err = card.init(&rom).unwrap_err();
    assert!(matches!(err, InitError::Rejected(ref msg) if msg.contains("0xFC")), "{err}");
}

#[test]
fn test_missing_rom_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let rom = pocket_core::core::RomPath::new(dir.path().join("gone.gb"), dir.path());
    let mut view = RomView::new(&NO_PACING);
    assert!(matches!(view.init(&rom), Err(InitError::Io(_))));
}

// ---------------------------------------------------------------------------
// ROM viewer
// ---------------------------------------------------------------------------

#[test]
fn test_romview_scrolls() {
    let dir = tempfile::tempdir().unwrap();
    let rom = install(dir.path(), &rom_image(0x00));
    let mut rig = Rig::new();
    let mut view = RomView::new(&NO_PACING);
    view.init(&rom).unwrap();

    rig.keys.set(Button::Down, true);
    for _ in 0..3 {
        step(&mut view, &mut rig);
    }
    assert_eq!(view.offset(), 3 * ROW_BYTES);

    rig.keys.set(Button::A, true);
    step(&mut view, &mut rig);
    assert_eq!(view.offset(), 11 * ROW_BYTES);

    rig.keys.set(Button::Down, false);
    rig.keys.set(Button::A, false);
    rig.keys.set(Button::Up, true);
    for _ in 0..20 {
        step(&mut view, &mut rig);
    }
    assert_eq!(view.offset(), 0);
    rig.keys.set(Button::Up, false);

    rig.keys.set(Button::Start, true);
    step(&mut view, &mut rig);
    assert_eq!(view.offset(), 0x100);
    rig.keys.set(Button::Start, false);

    rig.keys.set(Button::Select, true);
    step(&mut view, &mut rig);
    assert_eq!(view.offset(), 0);
}

#[test]
fn test_romview_draws_rom_bytes() {
    let dir = tempfile::tempdir().unwrap();
    // Byte 0 is 0x00 and byte 1 is 0x01: pixels 0..4 shade 0, pixel 7 shade 1.
    let rom = install(dir.path(), &rom_image(0x00));
    let mut rig = Rig::new();
    let mut view = RomView::new(&NO_PACING);
    view.init(&rom).unwrap();
    view.toggle_display_mode();
    step(&mut view, &mut rig);

    let frame = rig.frames.snapshot_for_draw().unwrap();
    assert_eq!(frame.pixel(0, 0), Palette::Raw.rgba(0));
    assert_eq!(frame.pixel(7, 0), Palette::Raw.rgba(1));
}

// ---------------------------------------------------------------------------
// Under the session layer
// ---------------------------------------------------------------------------

#[test]
fn test_testcard_under_lifecycle_controller() {
    let dir = tempfile::tempdir().unwrap();
    let rom = install(dir.path(), &rom_image(0x1B));
    let session = Session::new();
    let mut controller = LifecycleController::new(
        session.clone(),
        Box::new(|| -> Box<dyn Emulator> { Box::new(TestCard::new(&NO_PACING)) }),
    );

    controller.start(rom).unwrap();
    wait_for(|| session.frames().generation() > 2);

    session.keys().set(Button::A, true);
    let seen = session.frames().generation();
    wait_for(|| session.frames().generation() > seen + 2);

    assert_eq!(controller.pause(), RunState::Paused);
    wait_for(|| save_path(dir.path()).exists());

    controller.destroy();
    assert_eq!(controller.state(), RunState::Destroyed);
    assert!(!controller.is_loop_alive());
}

fn wait_for(mut cond: impl FnMut() -> bool) {
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(std::time::Instant::now() < deadline, "timed out");
        std::thread::sleep(Duration::from_millis(1));
    }
}
