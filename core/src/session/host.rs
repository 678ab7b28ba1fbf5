use log::{info, warn};

use super::{LifecycleController, RunState};
use crate::core::emulator::RomPath;

/// Lifecycle events delivered by the host window system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostEvent {
    /// The surface became visible / focused.
    Foreground,
    /// The surface was hidden or lost focus.
    Background,
    /// The surface is about to be destroyed.
    Teardown,
}

/// Shows short, non-blocking messages to the user.
pub trait Notifier {
    fn notify(&mut self, message: &str);
}

impl<F: FnMut(&str)> Notifier for F {
    fn notify(&mut self, message: &str) {
        self(message)
    }
}

/// Glue between host events, ROM selection and the controller.
pub struct HostShell<N: Notifier> {
    controller: LifecycleController,
    notifier: N,
    foreground: bool,
}

impl<N: Notifier> HostShell<N> {
    /// The host is assumed to start in the foreground.
    pub fn new(controller: LifecycleController, notifier: N) -> Self {
        Self {
            controller,
            notifier,
            foreground: true,
        }
    }

    pub fn controller(&self) -> &LifecycleController {
        &self.controller
    }

    pub fn is_foreground(&self) -> bool {
        self.foreground
    }

    /// Map a host event onto the controller. `Teardown` returns only
    /// after the loop has exited and the emulator was torn down.
    pub fn handle(&mut self, event: HostEvent) -> RunState {
        match event {
            HostEvent::Foreground => {
                self.foreground = true;
                self.controller.resume()
            }
            HostEvent::Background => {
                self.foreground = false;
                self.controller.pause()
            }
            HostEvent::Teardown => {
                self.controller.destroy();
                self.controller.state()
            }
        }
    }

    /// Start the chosen ROM. Failures are reported through the notifier
    /// and leave the shell ready for another selection.
    pub fn rom_selected(&mut self, rom: RomPath) -> bool {
        let started = if self.foreground {
            self.controller.start(rom)
        } else {
            info!("starting paused while in background");
            self.controller.start_paused(rom)
        };
        match started {
            Ok(()) => true,
            Err(err) => {
                warn!("{err}");
                self.notifier.notify(&format!("Couldn't start emulator: {err}"));
                false
            }
        }
    }
}
