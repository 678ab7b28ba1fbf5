#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pocket_core::core::{FrameBuffer, FrameWriter, KeyState, RomPath};
use pocket_machines::cartridge::header_checksum;

/// A 32 KiB image with the given cartridge type byte, 8 KiB of declared
/// RAM, a valid header checksum, and the byte `i & 0xFF` at offset `i`
/// outside the header.
pub fn rom_image(cartridge_type: u8) -> Vec<u8> {
    let mut rom: Vec<u8> = (0..0x8000u32).map(|i| i as u8).collect();
    rom[0x134..0x150].fill(0);
    rom[0x134..0x13A].copy_from_slice(b"POCKET");
    rom[0x147] = cartridge_type;
    rom[0x149] = 0x02;
    rom[0x14D] = header_checksum(&rom);
    rom
}

/// Write `image` as `<dir>/roms/game.gb` and return the ROM path with
/// saves going to `<dir>/saves`.
pub fn install(dir: &Path, image: &[u8]) -> RomPath {
    let roms = dir.join("roms");
    std::fs::create_dir_all(&roms).unwrap();
    let rom = roms.join("game.gb");
    std::fs::write(&rom, image).unwrap();
    RomPath::new(rom, dir.join("saves"))
}

pub fn save_path(dir: &Path) -> PathBuf {
    dir.join("saves").join("game.gb.sav")
}

/// Keys, frame buffer and writer for driving an emulator by hand.
pub struct Rig {
    pub keys: KeyState,
    pub frames: Arc<FrameBuffer>,
    pub writer: FrameWriter,
}

impl Rig {
    pub fn new() -> Self {
        let frames = Arc::new(FrameBuffer::new());
        Self {
            keys: KeyState::new(),
            writer: FrameWriter::new(Arc::clone(&frames)),
            frames,
        }
    }
}
