use std::time::Duration;

use pocket_core::core::Button;
use pocket_core::session::{InputRouter, LifecycleController, RunState, Session, SessionConfig};

mod common;
use common::{Call, Recorder, TIMEOUT, factory, rom, wait_until};

fn paused_controller(recorder: &std::sync::Arc<Recorder>) -> LifecycleController {
    let session = Session::with_config(SessionConfig {
        idle_wait: Duration::from_millis(5),
    });
    let mut ctl = LifecycleController::new(session, factory(recorder));
    ctl.start(rom()).unwrap();
    assert!(wait_until(TIMEOUT, || recorder.count(Call::Step) > 0));
    ctl.pause();
    assert!(wait_until(TIMEOUT, || recorder.count(Call::Save) == 1));
    ctl
}

#[test]
fn test_press_then_release_before_step_is_not_queued() {
    let recorder = Recorder::new();
    let mut ctl = paused_controller(&recorder);
    let input = InputRouter::new(ctl.session().clone());

    input.set_key(Button::A, true);
    input.set_key(Button::A, false);
    recorder.clear_seen_keys();

    assert_eq!(ctl.resume(), RunState::Running);
    assert!(wait_until(TIMEOUT, || !recorder.seen_keys().is_empty()));
    assert!(!recorder.seen_keys()[0].is_pressed(Button::A));

    ctl.stop();
}

#[test]
fn test_press_is_visible_to_next_step() {
    let recorder = Recorder::new();
    let mut ctl = paused_controller(&recorder);
    let input = InputRouter::new(ctl.session().clone());

    input.set_key(Button::Start, true);
    input.set_key(Button::Left, true);
    recorder.clear_seen_keys();
    ctl.resume();
    assert!(wait_until(TIMEOUT, || !recorder.seen_keys().is_empty()));

    let keys = recorder.seen_keys()[0];
    assert!(keys.is_pressed(Button::Start));
    assert!(keys.is_pressed(Button::Left));
    assert!(!keys.is_pressed(Button::A));

    input.release_all();
    assert!(wait_until(TIMEOUT, || recorder
        .seen_keys()
        .last()
        .is_some_and(|k| !k.any())));

    ctl.stop();
}

#[test]
fn test_start_releases_held_keys() {
    let recorder = Recorder::new();
    let session = Session::new();
    let input = InputRouter::new(session.clone());
    input.set_key(Button::B, true);

    let mut ctl = LifecycleController::new(session, factory(&recorder));
    ctl.start(rom()).unwrap();
    assert!(wait_until(TIMEOUT, || !recorder.seen_keys().is_empty()));
    assert!(!recorder.seen_keys()[0].any());
    ctl.stop();
}

#[test]
fn test_toggle_request_reaches_emulator() {
    let recorder = Recorder::new();
    let mut ctl = paused_controller(&recorder);
    let input = InputRouter::new(ctl.session().clone());

    input.toggle_display_mode();
    std::thread::sleep(Duration::from_millis(20));
    // Paused loops do not apply display changes.
    assert_eq!(recorder.count(Call::Toggle), 0);

    ctl.resume();
    assert!(wait_until(TIMEOUT, || recorder.count(Call::Toggle) == 1));
    ctl.stop();
}
