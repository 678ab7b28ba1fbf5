use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why an emulator refused a ROM/save-directory pair.
#[derive(Debug, Error)]
pub enum InitError {
    /// The ROM was read but the engine cannot run it.
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl InitError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }

    pub fn other(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Other(Box::new(err))
    }
}

/// Errors reported by the lifecycle controller. All of them leave the
/// controller usable except where noted.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The emulator rejected the ROM. The session stays stopped and
    /// accepts another `start`.
    #[error("couldn't start {}: {source}", rom.display())]
    Init {
        rom: PathBuf,
        #[source]
        source: InitError,
    },

    /// The OS refused to create the emulation thread.
    #[error("failed to spawn emulation thread: {0}")]
    Spawn(#[source] io::Error),

    /// The controller was destroyed and takes no further sessions.
    #[error("session has been destroyed")]
    Destroyed,
}
