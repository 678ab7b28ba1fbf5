//! Emulation backends that plug into the `pocket-core` session layer.

pub mod cartridge;
pub mod lcd;
pub mod pacing;
pub mod palette;
pub mod registry;
pub mod romview;
pub mod save_file;
pub mod slot;
pub mod testcard;

pub use cartridge::{Cartridge, CartridgeError, Header, Mapper};
pub use registry::{BackendEntry, BackendOptions};
pub use romview::RomView;
pub use save_file::{BatteryRam, SaveError, SaveFile};
pub use testcard::TestCard;
