//! An inserted cartridge with its RAM and autosave timer.

use log::{info, warn};
use pocket_core::core::RomPath;
use pocket_core::error::InitError;

use crate::cartridge::Cartridge;
use crate::save_file::{BatteryRam, SaveFile};

/// Frames between periodic saves (~10 s at full speed).
pub const AUTOSAVE_FRAMES: u32 = 600;

pub struct CartridgeSlot {
    cartridge: Cartridge,
    ram: BatteryRam,
    autosave_timer: u32,
}

impl CartridgeSlot {
    /// Load the ROM and, for battery-backed carts, restore its save.
    pub fn insert(rom: &RomPath) -> Result<Self, InitError> {
        let cartridge = Cartridge::from_file(rom.rom())?;
        cartridge.log_info();

        let ram_size = cartridge.header().ram_size;
        let ram = if cartridge.save_supported() {
            let file = SaveFile::for_rom(rom.save_dir(), rom.rom());
            info!("save file: {}", file.path().display());
            BatteryRam::battery(ram_size, file)
        } else {
            BatteryRam::volatile(ram_size)
        };

        Ok(Self {
            cartridge,
            ram,
            autosave_timer: 0,
        })
    }

    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }

    pub fn ram(&self) -> &BatteryRam {
        &self.ram
    }

    pub fn ram_mut(&mut self) -> &mut BatteryRam {
        &mut self.ram
    }

    /// Save if the RAM changed. Failures are logged; emulation goes on.
    pub fn save(&mut self) {
        if let Err(e) = self.ram.save_if_needed() {
            warn!("save failed: {e}");
        }
    }

    /// Count one frame and save when the autosave interval is up.
    pub fn tick(&mut self) {
        if !self.ram.is_battery_backed() {
            return;
        }
        self.autosave_timer += 1;
        if self.autosave_timer >= AUTOSAVE_FRAMES {
            self.autosave_timer = 0;
            self.save();
        }
    }
}
