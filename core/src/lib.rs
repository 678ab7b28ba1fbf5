pub mod browser;
pub mod core;
pub mod error;
pub mod session;

pub mod prelude {
    pub use crate::browser::{Choice, RomSelector};
    pub use crate::core::{
        Button, Emulator, EmulatorFactory, Frame, FrameBuffer, Keys, RomPath, StepContext,
        StepStatus,
    };
    pub use crate::error::{InitError, SessionError};
    pub use crate::session::{
        DisplaySurface, HostEvent, HostShell, InputRouter, LifecycleController, Notifier,
        RunState, Session, SessionConfig,
    };
}
