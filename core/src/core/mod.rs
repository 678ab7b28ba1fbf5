pub mod emulator;
pub mod frame;
pub mod keys;

pub use emulator::{Emulator, EmulatorFactory, RomPath, StepContext, StepStatus};
pub use frame::{FRAME_BYTES, FRAME_HEIGHT, FRAME_WIDTH, Frame, FrameBuffer, FrameWriter};
pub use keys::{Button, KeyState, Keys};
