//! Real-time frame pacing.

use std::time::{Duration, Instant};

use log::trace;

/// Master clock of the handheld, in Hz.
pub const CLOCK_HZ: u32 = 4_194_304;

/// Clock cycles in one LCD frame (154 lines of 456 dots).
pub const CYCLES_PER_FRAME: u32 = 70_224;

/// Wall-clock length of one frame, ~16.74 ms (~59.73 Hz).
pub const FRAME_TIME: Duration =
    Duration::from_nanos(CYCLES_PER_FRAME as u64 * 1_000_000_000 / CLOCK_HZ as u64);

/// Sleeps off whatever is left of each frame's time slice.
///
/// When emulation falls behind by more than a few frames the schedule is
/// reset instead of running fast to catch up.
pub struct FramePacer {
    enabled: bool,
    next_deadline: Option<Instant>,
}

impl FramePacer {
    const MAX_LAG: Duration = Duration::from_millis(100);

    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            next_deadline: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Forget the schedule, e.g. after a pause.
    pub fn reset(&mut self) {
        self.next_deadline = None;
    }

    /// Block until the current frame's slice has elapsed.
    pub fn wait(&mut self) {
        if !self.enabled {
            return;
        }
        let now = Instant::now();
        let deadline = match self.next_deadline {
            Some(d) if now.saturating_duration_since(d) < Self::MAX_LAG => d,
            Some(_) => {
                trace!("pacer fell behind, resynchronising");
                now
            }
            None => now,
        };
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
        self.next_deadline = Some(deadline + FRAME_TIME);
    }
}
