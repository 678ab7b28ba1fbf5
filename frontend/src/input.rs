use std::collections::HashMap;

use log::warn;
use pocket_core::core::Button;
use sdl2::keyboard::Scancode;

use crate::config::KeyBindings;

/// What a key does in the window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Button(Button),
    ToggleDisplay,
    OpenRom,
    Screenshot,
}

/// Maps SDL scancodes to actions.
pub struct KeyMap {
    map: HashMap<Scancode, Action>,
}

impl KeyMap {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn bind(&mut self, scancode: Scancode, action: Action) {
        self.map.insert(scancode, action);
    }

    pub fn get(&self, scancode: Scancode) -> Option<Action> {
        self.map.get(&scancode).copied()
    }
}

/// Build the key map from configured scancode names. Unknown names are
/// reported and skipped.
pub fn key_map(bindings: &KeyBindings) -> KeyMap {
    let groups: [(&[String], Action); 11] = [
        (&bindings.up, Action::Button(Button::Up)),
        (&bindings.down, Action::Button(Button::Down)),
        (&bindings.left, Action::Button(Button::Left)),
        (&bindings.right, Action::Button(Button::Right)),
        (&bindings.a, Action::Button(Button::A)),
        (&bindings.b, Action::Button(Button::B)),
        (&bindings.start, Action::Button(Button::Start)),
        (&bindings.select, Action::Button(Button::Select)),
        (&bindings.toggle_display, Action::ToggleDisplay),
        (&bindings.open_rom, Action::OpenRom),
        (&bindings.screenshot, Action::Screenshot),
    ];

    let mut km = KeyMap::new();
    for (names, action) in groups {
        for name in names {
            match Scancode::from_name(name) {
                Some(sc) => km.bind(sc, action),
                None => warn!("unknown key \"{name}\" for {action:?}"),
            }
        }
    }
    km
}
