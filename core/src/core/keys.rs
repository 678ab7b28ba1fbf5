use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// The eight buttons of the handheld.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    A,
    B,
    Start,
    Select,
    Up,
    Down,
    Left,
    Right,
}

impl Button {
    pub const ALL: [Button; 8] = [
        Button::A,
        Button::B,
        Button::Start,
        Button::Select,
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::Start => "Start",
            Self::Select => "Select",
            Self::Up => "Up",
            Self::Down => "Down",
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }

    /// Case-insensitive lookup by [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(name))
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Latched button state shared between the input source and the
/// emulation loop.
///
/// Each flag is independent. A write is visible to the next step that
/// starts after it; a press immediately followed by a release is never
/// queued, the step only sees the last value.
#[derive(Default)]
pub struct KeyState {
    flags: [AtomicBool; 8],
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, button: Button, pressed: bool) {
        self.flags[button.index()].store(pressed, Ordering::Release);
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.flags[button.index()].load(Ordering::Acquire)
    }

    /// Release every button.
    pub fn clear(&self) {
        for flag in &self.flags {
            flag.store(false, Ordering::Release);
        }
    }

    pub fn snapshot(&self) -> Keys {
        let mut bits = 0u8;
        for button in Button::ALL {
            if self.is_pressed(button) {
                bits |= 1 << button.index();
            }
        }
        Keys(bits)
    }
}

/// Point-in-time copy of [`KeyState`], taken once per step.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct Keys(u8);

impl Keys {
    pub fn is_pressed(self, button: Button) -> bool {
        self.0 & (1 << button.index()) != 0
    }

    pub fn any(self) -> bool {
        self.0 != 0
    }

    pub fn pressed(self) -> impl Iterator<Item = Button> {
        Button::ALL.into_iter().filter(move |&b| self.is_pressed(b))
    }

    /// Bitmask with bit `n` set for the n-th entry of [`Button::ALL`].
    pub fn bits(self) -> u8 {
        self.0
    }
}

impl fmt::Debug for Keys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.pressed()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_independent() {
        let keys = KeyState::new();
        keys.set(Button::A, true);
        keys.set(Button::Left, true);
        keys.set(Button::A, false);

        let snap = keys.snapshot();
        assert!(!snap.is_pressed(Button::A));
        assert!(snap.is_pressed(Button::Left));
        assert_eq!(snap.pressed().collect::<Vec<_>>(), vec![Button::Left]);
    }

    #[test]
    fn clear_releases_everything() {
        let keys = KeyState::new();
        for button in Button::ALL {
            keys.set(button, true);
        }
        assert_eq!(keys.snapshot().bits(), 0xFF);
        keys.clear();
        assert!(!keys.snapshot().any());
    }

    #[test]
    fn button_names_round_trip() {
        for button in Button::ALL {
            assert_eq!(Button::from_name(button.name()), Some(button));
        }
        assert_eq!(Button::from_name("start"), Some(Button::Start));
        assert_eq!(Button::from_name("turbo"), None);
    }
}
