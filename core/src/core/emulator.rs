use std::path::{Path, PathBuf};

use crate::core::frame::FrameWriter;
use crate::core::keys::{KeyState, Keys};
use crate::error::InitError;

/// A ROM chosen by the user together with the directory its save data
/// lives in. Produced once by the ROM selector and consumed by
/// [`LifecycleController::start`](crate::session::LifecycleController::start).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RomPath {
    rom: PathBuf,
    save_dir: PathBuf,
}

impl RomPath {
    /// Build a ROM path, resolving both paths against the current
    /// directory when they are relative.
    pub fn new(rom: impl AsRef<Path>, save_dir: impl AsRef<Path>) -> Self {
        Self {
            rom: absolutize(rom.as_ref()),
            save_dir: absolutize(save_dir.as_ref()),
        }
    }

    pub fn rom(&self) -> &Path {
        &self.rom
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }
}

fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Result of advancing the emulator by one quantum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepStatus {
    /// Status code 0: keep running.
    Continue,
    /// Any non-zero status code. The loop treats this as a request to
    /// stop; what the code means is up to the emulator.
    Halt(i32),
}

impl StepStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Continue,
            code => Self::Halt(code),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Continue => 0,
            Self::Halt(code) => code,
        }
    }
}

/// Everything an emulator may touch while executing one step: the
/// latched button state and the frame delivery callback.
pub struct StepContext<'a> {
    keys: &'a KeyState,
    frames: &'a mut FrameWriter,
}

impl<'a> StepContext<'a> {
    pub fn new(keys: &'a KeyState, frames: &'a mut FrameWriter) -> Self {
        Self { keys, frames }
    }

    /// Current button state. Reflects every `set_key` that landed
    /// before this call.
    pub fn keys(&self) -> Keys {
        self.keys.snapshot()
    }

    /// Deliver a completed frame as raw RGBA bytes (256x144, 4 bytes per
    /// pixel, row-major). The bytes are copied before this returns; the
    /// caller keeps ownership of `raw`.
    ///
    /// Returns `false` if the buffer is too short to hold a frame.
    pub fn present(&mut self, raw: &[u8]) -> bool {
        self.frames.publish_raw(raw)
    }
}

/// Interface to the emulation engine.
///
/// The session layer never looks inside the engine. It drives it only
/// through these calls, always from one thread at a time: `init` and
/// `teardown` from the host thread, `step`, `save` and
/// `toggle_display_mode` from the emulation loop thread that owns the
/// instance while a session is active.
pub trait Emulator: Send {
    /// Load the ROM and any existing save data. An error leaves the
    /// instance unusable; it is dropped without `teardown`.
    fn init(&mut self, rom: &RomPath) -> Result<(), InitError>;

    /// Advance emulated time by one quantum (one video frame for the
    /// bundled machines), reading input from and delivering frames to
    /// `ctx`.
    fn step(&mut self, ctx: &mut StepContext<'_>) -> StepStatus;

    /// Persist emulator state under the save directory given to `init`.
    fn save(&mut self);

    /// Release everything acquired by `init`.
    fn teardown(&mut self);

    /// Switch between the engine's display modes (e.g. colour
    /// correction on/off).
    fn toggle_display_mode(&mut self);
}

/// Creates a fresh emulator for every session start.
pub type EmulatorFactory = Box<dyn FnMut() -> Box<dyn Emulator> + Send>;
