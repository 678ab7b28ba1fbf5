#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use pocket_core::core::{
    Emulator, EmulatorFactory, FRAME_BYTES, Keys, RomPath, StepContext, StepStatus,
};
use pocket_core::error::InitError;

/// One call made into a [`TestEmulator`], in the order they happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Call {
    Init,
    Step,
    Save,
    Teardown,
    Toggle,
}

/// Shared record of everything the emulators built by one factory did.
#[derive(Default)]
pub struct Recorder {
    calls: Mutex<Vec<Call>>,
    keys: Mutex<Vec<Keys>>,
    pub fail_init: AtomicBool,
    pub halt_after: AtomicUsize,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: Call) -> usize {
        self.calls.lock().unwrap().iter().filter(|&&c| c == call).count()
    }

    /// Key snapshots seen by each step, oldest first.
    pub fn seen_keys(&self) -> Vec<Keys> {
        self.keys.lock().unwrap().clone()
    }

    pub fn clear_seen_keys(&self) {
        self.keys.lock().unwrap().clear();
    }
}

/// Scriptable emulator: every step publishes a frame filled with the
/// step number and sleeps briefly.
pub struct TestEmulator {
    recorder: Arc<Recorder>,
    steps: usize,
}

impl TestEmulator {
    pub fn new(recorder: Arc<Recorder>) -> Self {
        Self { recorder, steps: 0 }
    }
}

impl Emulator for TestEmulator {
    fn init(&mut self, _rom: &RomPath) -> Result<(), InitError> {
        self.recorder.record(Call::Init);
        if self.recorder.fail_init.load(Ordering::SeqCst) {
            return Err(InitError::rejected("unsupported cartridge"));
        }
        Ok(())
    }

    fn step(&mut self, ctx: &mut StepContext<'_>) -> StepStatus {
        self.recorder.record(Call::Step);
        self.recorder.keys.lock().unwrap().push(ctx.keys());
        self.steps += 1;

        let frame = vec![self.steps as u8; FRAME_BYTES];
        ctx.present(&frame);
        std::thread::sleep(Duration::from_millis(1));

        let halt_after = self.recorder.halt_after.load(Ordering::SeqCst);
        if halt_after != 0 && self.steps >= halt_after {
            StepStatus::Halt(2)
        } else {
            StepStatus::Continue
        }
    }

    fn save(&mut self) {
        self.recorder.record(Call::Save);
    }

    fn teardown(&mut self) {
        self.recorder.record(Call::Teardown);
    }

    fn toggle_display_mode(&mut self) {
        self.recorder.record(Call::Toggle);
    }
}

pub fn factory(recorder: &Arc<Recorder>) -> EmulatorFactory {
    let recorder = Arc::clone(recorder);
    Box::new(move || -> Box<dyn Emulator> { Box::new(TestEmulator::new(Arc::clone(&recorder))) })
}

pub fn rom() -> RomPath {
    RomPath::new("/roms/game.gb", "/saves")
}

/// Poll `cond` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    cond()
}

pub const TIMEOUT: Duration = Duration::from_secs(5);
