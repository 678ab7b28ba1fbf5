use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{error, info, warn};

use super::emulation_loop::{EmulationLoop, LoopExit};
use super::{RunState, Session};
use crate::core::emulator::{EmulatorFactory, RomPath};
use crate::error::SessionError;

/// Owns the emulation thread and moves the session between states.
///
/// ```text
/// Stopped --start--> Running <--pause/resume--> Paused
///    ^                  |                          |
///    +------stop--------+----------stop------------+
///
/// any --destroy--> Destroyed
/// ```
///
/// At most one loop is alive per controller. `stop` and `destroy` block
/// until that loop has returned, so they must be called from the host
/// thread, never from inside the emulator.
pub struct LifecycleController {
    session: Arc<Session>,
    factory: EmulatorFactory,
    worker: Option<JoinHandle<LoopExit>>,
    rom: Option<PathBuf>,
}

impl LifecycleController {
    pub fn new(session: Arc<Session>, factory: EmulatorFactory) -> Self {
        Self {
            session,
            factory,
            worker: None,
            rom: None,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn state(&self) -> RunState {
        self.session.state()
    }

    /// The ROM of the current session, if one was started.
    pub fn rom(&self) -> Option<&Path> {
        self.rom.as_deref()
    }

    /// True while the emulation thread has not returned.
    pub fn is_loop_alive(&self) -> bool {
        self.worker.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop whatever is running, initialise a fresh emulator with `rom`
    /// and start a loop for it.
    ///
    /// On an initialisation error nothing is spawned and the session is
    /// left `Stopped`, ready for another `start`.
    pub fn start(&mut self, rom: RomPath) -> Result<(), SessionError> {
        self.launch(rom, RunState::Running)
    }

    /// Like [`start`](Self::start), but the loop begins `Paused` and
    /// does not step until [`resume`](Self::resume).
    pub fn start_paused(&mut self, rom: RomPath) -> Result<(), SessionError> {
        self.launch(rom, RunState::Paused)
    }

    fn launch(&mut self, rom: RomPath, initial: RunState) -> Result<(), SessionError> {
        debug_assert!(initial.is_active());
        if self.state() == RunState::Destroyed {
            return Err(SessionError::Destroyed);
        }
        self.stop();

        self.session.keys().clear();
        let mut emulator = (self.factory)();
        if let Err(source) = emulator.init(&rom) {
            warn!("emulator rejected {}: {source}", rom.rom().display());
            return Err(SessionError::Init {
                rom: rom.rom().to_path_buf(),
                source,
            });
        }

        self.session.run_state().store(initial);
        match EmulationLoop::new(Arc::clone(&self.session), emulator).spawn() {
            Ok(handle) => {
                info!("started {} ({initial})", rom.rom().display());
                self.worker = Some(handle);
                self.rom = Some(rom.rom().to_path_buf());
                Ok(())
            }
            Err(err) => {
                self.session.run_state().store(RunState::Stopped);
                Err(SessionError::Spawn(err))
            }
        }
    }

    /// Running -> Paused. No effect in any other state.
    pub fn pause(&self) -> RunState {
        if self
            .session
            .run_state()
            .transition(RunState::Running, RunState::Paused)
            .is_ok()
        {
            info!("paused");
        }
        self.state()
    }

    /// Paused -> Running. No effect in any other state.
    pub fn resume(&self) -> RunState {
        if self
            .session
            .run_state()
            .transition(RunState::Paused, RunState::Running)
            .is_ok()
        {
            info!("resumed");
            self.wake_loop();
        }
        self.state()
    }

    /// Stop the loop, wait for it to finish its final save, then tear the
    /// emulator down. Does nothing when no loop exists.
    pub fn stop(&mut self) {
        let Some(handle) = self.worker.take() else {
            return;
        };
        debug_assert_ne!(
            thread::current().id(),
            handle.thread().id(),
            "stop() called from the emulation thread"
        );

        let _ = self
            .session
            .run_state()
            .update(|s| s.is_active().then_some(RunState::Stopped));
        handle.thread().unpark();

        match handle.join() {
            Ok(exit) => {
                let mut emulator = exit.emulator;
                emulator.teardown();
                info!("stopped after {} steps", exit.steps);
            }
            Err(_) => error!("emulation thread panicked; emulator dropped without teardown"),
        }
        self.rom = None;
    }

    /// Stop, then refuse every further `start`.
    pub fn destroy(&mut self) {
        self.stop();
        self.session.run_state().store(RunState::Destroyed);
        info!("session destroyed");
    }

    fn wake_loop(&self) {
        if let Some(handle) = &self.worker {
            handle.thread().unpark();
        }
    }
}

impl Drop for LifecycleController {
    fn drop(&mut self) {
        self.stop();
    }
}
