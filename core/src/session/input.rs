use std::sync::Arc;

use log::trace;

use super::Session;
use crate::core::keys::Button;

/// Forwards button presses to the session's key latch.
///
/// Last write wins: nothing is queued or debounced, and a step only ever
/// sees the value each flag had when it started.
#[derive(Clone)]
pub struct InputRouter {
    session: Arc<Session>,
}

impl InputRouter {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    pub fn set_key(&self, button: Button, pressed: bool) {
        trace!("{button} {}", if pressed { "down" } else { "up" });
        self.session.keys().set(button, pressed);
    }

    /// Release every button, e.g. when the window loses focus with keys
    /// still held.
    pub fn release_all(&self) {
        self.session.keys().clear();
    }

    /// Ask the emulator to switch display mode after its next step.
    pub fn toggle_display_mode(&self) {
        self.session.request_display_toggle();
    }
}
