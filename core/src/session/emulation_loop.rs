use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};

use super::{RunState, Session};
use crate::core::emulator::{Emulator, StepContext, StepStatus};
use crate::core::frame::FrameWriter;

/// Name given to the emulation thread.
pub const THREAD_NAME: &str = "pocket-emulation";

/// Why the loop returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitReason {
    /// The controller asked the loop to stop.
    Stopped,
    /// The emulator returned a non-zero step status.
    Halted(i32),
}

/// What the loop hands back when it ends: the emulator (already saved,
/// not yet torn down) and some bookkeeping.
pub struct LoopExit {
    pub emulator: Box<dyn Emulator>,
    pub reason: ExitReason,
    pub steps: u64,
}

/// Drives one emulator until the session stops.
///
/// Each iteration samples the run state exactly once:
///
/// * `Running` executes one step, then applies a pending display toggle.
/// * `Paused` saves once per pause, then sleeps for at most the session's
///   idle wait (an unpark ends the sleep early).
/// * `Stopped`/`Destroyed` leaves the loop.
///
/// Every exit path ends with one final `save`.
pub struct EmulationLoop {
    session: Arc<Session>,
    emulator: Box<dyn Emulator>,
    frames: FrameWriter,
}

impl EmulationLoop {
    pub fn new(session: Arc<Session>, emulator: Box<dyn Emulator>) -> Self {
        let frames = FrameWriter::new(Arc::clone(session.frames()));
        Self {
            session,
            emulator,
            frames,
        }
    }

    /// Run the loop on a dedicated thread.
    pub fn spawn(self) -> io::Result<JoinHandle<LoopExit>> {
        thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || self.run())
    }

    /// Run the loop on the calling thread until it is told to stop.
    pub fn run(mut self) -> LoopExit {
        info!("emulation loop started");
        let mut steps = 0u64;
        let mut saved_this_pause = false;

        let reason = loop {
            match self.session.state() {
                RunState::Running => {
                    saved_this_pause = false;
                    let status = {
                        let mut ctx = StepContext::new(self.session.keys(), &mut self.frames);
                        self.emulator.step(&mut ctx)
                    };
                    steps += 1;

                    if self.session.take_display_toggle() {
                        debug!("toggling display mode");
                        self.emulator.toggle_display_mode();
                    }

                    if let StepStatus::Halt(code) = status {
                        warn!("emulator halted with status {code}");
                        let _ = self
                            .session
                            .run_state()
                            .update(|s| s.is_active().then_some(RunState::Stopped));
                        break ExitReason::Halted(code);
                    }
                }
                RunState::Paused => {
                    if !saved_this_pause {
                        debug!("paused after {steps} steps, saving");
                        self.emulator.save();
                        saved_this_pause = true;
                    }
                    // Spurious or early wakeups just re-check the state.
                    thread::park_timeout(self.session.config().idle_wait);
                }
                RunState::Stopped | RunState::Destroyed => break ExitReason::Stopped,
            }
        };

        self.emulator.save();
        info!("emulation loop exited after {steps} steps ({reason:?})");

        LoopExit {
            emulator: self.emulator,
            reason,
            steps,
        }
    }
}
