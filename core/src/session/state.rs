use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle phase of an emulation session.
///
/// One value covers both "paused" and "stop requested": a loop that sees
/// `Stopped` or `Destroyed` always goes through its final save, so there
/// is no way to ask for teardown without the loop first treating the
/// session as paused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RunState {
    Stopped = 0,
    Running = 1,
    Paused = 2,
    Destroyed = 3,
}

impl RunState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Stopped,
            1 => Self::Running,
            2 => Self::Paused,
            3 => Self::Destroyed,
            _ => unreachable!("invalid run state {raw}"),
        }
    }

    /// True while an emulation loop is expected to be alive.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stopped => "stopped",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}

/// [`RunState`] shared between the controller and the emulation loop.
///
/// Every transition is a compare-and-swap; a store is visible to the
/// next loop iteration.
pub struct AtomicRunState(AtomicU8);

impl AtomicRunState {
    pub fn new(state: RunState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub fn load(&self) -> RunState {
        RunState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn store(&self, state: RunState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Move from `from` to `to`. On failure returns the state that was
    /// actually found.
    pub(crate) fn transition(&self, from: RunState, to: RunState) -> Result<RunState, RunState> {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(RunState::from_u8)
            .map_err(RunState::from_u8)
    }

    /// Apply `f` atomically; `None` leaves the state unchanged. Returns
    /// the previous state on success, the current one on refusal.
    pub(crate) fn update(
        &self,
        mut f: impl FnMut(RunState) -> Option<RunState>,
    ) -> Result<RunState, RunState> {
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                f(RunState::from_u8(raw)).map(|s| s as u8)
            })
            .map(RunState::from_u8)
            .map_err(RunState::from_u8)
    }
}

impl fmt::Debug for AtomicRunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicRunState").field(&self.load()).finish()
    }
}
