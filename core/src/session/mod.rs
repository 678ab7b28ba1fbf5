//! Session lifecycle: the emulation loop thread, the state machine that
//! drives it, and the pieces the host talks to (input, display, host
//! lifecycle events).
//!
//! A [`Session`] is the single object shared by all of them. The host
//! creates it once and hands clones of the `Arc` to the controller, the
//! input router and the display surface.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::core::frame::FrameBuffer;
use crate::core::keys::KeyState;

mod controller;
mod display;
mod emulation_loop;
mod host;
mod input;
mod state;

pub use controller::LifecycleController;
pub use display::DisplaySurface;
pub use emulation_loop::{EmulationLoop, ExitReason, LoopExit};
pub use host::{HostEvent, HostShell, Notifier};
pub use input::InputRouter;
pub use state::{AtomicRunState, RunState};

/// How long a paused loop sleeps between state checks.
pub const DEFAULT_IDLE_WAIT: Duration = Duration::from_millis(350);

/// Tunables for a session.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Upper bound on how long a paused loop waits before looking at the
    /// run state again. Resume and stop wake it early.
    pub idle_wait: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_wait: DEFAULT_IDLE_WAIT,
        }
    }
}

/// State shared between the host thread and the emulation loop.
pub struct Session {
    state: AtomicRunState,
    frames: Arc<FrameBuffer>,
    keys: KeyState,
    display_toggle: AtomicBool,
    config: SessionConfig,
}

impl Session {
    pub fn new() -> Arc<Self> {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Arc<Self> {
        Arc::new(Self {
            state: AtomicRunState::new(RunState::Stopped),
            frames: Arc::new(FrameBuffer::new()),
            keys: KeyState::new(),
            display_toggle: AtomicBool::new(false),
            config,
        })
    }

    pub fn state(&self) -> RunState {
        self.state.load()
    }

    pub fn frames(&self) -> &Arc<FrameBuffer> {
        &self.frames
    }

    pub fn keys(&self) -> &KeyState {
        &self.keys
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Ask the loop to switch display mode after its next step.
    pub fn request_display_toggle(&self) {
        self.display_toggle.store(true, Ordering::Release);
    }

    pub(crate) fn take_display_toggle(&self) -> bool {
        self.display_toggle.swap(false, Ordering::AcqRel)
    }

    pub(crate) fn run_state(&self) -> &AtomicRunState {
        &self.state
    }
}
