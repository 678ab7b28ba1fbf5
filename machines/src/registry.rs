//! Backend registry for front-end discovery.
//!
//! Each backend self-registers via [`inventory::submit!`] with a
//! [`BackendEntry`] holding its CLI name and a constructor. The front
//! end lists and selects backends at runtime without a central table.

use pocket_core::core::{Emulator, EmulatorFactory};

/// Settings shared by every backend instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackendOptions {
    /// Hold steps to the LCD refresh rate. Off in tests.
    pub pacing: bool,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self { pacing: true }
    }
}

/// Describes a selectable emulation backend.
pub struct BackendEntry {
    /// CLI name (e.g., "testcard").
    pub name: &'static str,
    /// One-line summary for `--list-backends`.
    pub description: &'static str,
    pub create: fn(&BackendOptions) -> Box<dyn Emulator>,
}

impl BackendEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        create: fn(&BackendOptions) -> Box<dyn Emulator>,
    ) -> Self {
        Self {
            name,
            description,
            create,
        }
    }

    /// A factory producing a fresh instance for every session.
    pub fn factory(&'static self, options: BackendOptions) -> EmulatorFactory {
        Box::new(move || (self.create)(&options))
    }
}

inventory::collect!(BackendEntry);

/// Return all registered backends, sorted by name.
pub fn all() -> Vec<&'static BackendEntry> {
    let mut entries: Vec<_> = inventory::iter::<BackendEntry>.into_iter().collect();
    entries.sort_by_key(|e| e.name);
    entries
}

/// Look up a backend by its CLI name.
pub fn find(name: &str) -> Option<&'static BackendEntry> {
    inventory::iter::<BackendEntry>
        .into_iter()
        .find(|e| e.name == name)
}
