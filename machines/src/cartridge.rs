//! Cartridge loading and header decoding.
//!
//! Accepts a raw `.gb`/`.gbc` image or a ZIP archive holding one. The
//! header is decoded for logging and to decide whether the cartridge
//! has battery-backed RAM worth persisting.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use log::{info, warn};
use pocket_core::error::InitError;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Header layout
// ---------------------------------------------------------------------------

/// Images must extend past the header to be runnable.
pub const HEADER_END: usize = 0x150;

const TITLE_START: usize = 0x134;
const TITLE_END: usize = 0x144;
const CGB_FLAG: usize = 0x143;
const CARTRIDGE_TYPE: usize = 0x147;
const ROM_SIZE: usize = 0x148;
const RAM_SIZE: usize = 0x149;
const HEADER_CHECKSUM: usize = 0x14D;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("file too small: {0} bytes")]
    TooSmall(usize),

    #[error("unsupported cartridge type 0x{0:02X}")]
    Unsupported(u8),

    #[error("invalid ZIP: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("archive contains no ROM image")]
    EmptyArchive,
}

impl From<CartridgeError> for InitError {
    fn from(err: CartridgeError) -> Self {
        match err {
            CartridgeError::Io(e) => InitError::Io(e),
            other => InitError::rejected(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Memory bank controller family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mapper {
    RomOnly,
    Mbc1,
    Mbc3,
    Mbc5,
}

/// Map the cartridge type byte to a mapper and whether it has a battery.
/// `None` for hardware the engine does not support.
pub fn decode_type(code: u8) -> Option<(Mapper, bool)> {
    let decoded = match code {
        0x00 => (Mapper::RomOnly, false),
        0x01 | 0x02 => (Mapper::Mbc1, false),
        0x03 => (Mapper::Mbc1, true),
        0x11 | 0x12 => (Mapper::Mbc3, false),
        0x13 => (Mapper::Mbc3, true),
        // MBC4 carts run on the MBC5 path.
        0x15 | 0x16 | 0x17 | 0x19 | 0x1A | 0x1C | 0x1D => (Mapper::Mbc5, false),
        0x1B | 0x1E => (Mapper::Mbc5, true),
        _ => return None,
    };
    Some(decoded)
}

fn decode_ram_size(code: u8) -> usize {
    match code {
        0x01 => 2 * 1024,
        0x02 => 8 * 1024,
        0x03 => 32 * 1024,
        0x04 => 128 * 1024,
        0x05 => 64 * 1024,
        _ => 0,
    }
}

/// The header checksum as computed by the boot ROM over 0x134..=0x14C.
pub fn header_checksum(rom: &[u8]) -> u8 {
    rom[TITLE_START..HEADER_CHECKSUM]
        .iter()
        .fold(0u8, |x, &b| x.wrapping_sub(b).wrapping_sub(1))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub title: String,
    pub cgb: bool,
    pub cartridge_type: u8,
    pub mapper: Mapper,
    pub battery: bool,
    /// Declared ROM size in bytes.
    pub rom_size: usize,
    /// Declared external RAM size in bytes.
    pub ram_size: usize,
    pub checksum_ok: bool,
}

impl Header {
    fn parse(rom: &[u8]) -> Result<Self, CartridgeError> {
        if rom.len() < HEADER_END {
            return Err(CartridgeError::TooSmall(rom.len()));
        }

        let cartridge_type = rom[CARTRIDGE_TYPE];
        let (mapper, battery) =
            decode_type(cartridge_type).ok_or(CartridgeError::Unsupported(cartridge_type))?;

        let title_bytes = &rom[TITLE_START..TITLE_END];
        let title_len = title_bytes
            .iter()
            .position(|&b| b == 0 || (!b.is_ascii_graphic() && b != b' '))
            .unwrap_or(title_bytes.len());
        let title = String::from_utf8_lossy(&title_bytes[..title_len])
            .trim()
            .to_string();

        Ok(Self {
            title,
            cgb: matches!(rom[CGB_FLAG], 0x80 | 0xC0),
            cartridge_type,
            mapper,
            battery,
            rom_size: (32 * 1024) << rom[ROM_SIZE].min(8),
            ram_size: decode_ram_size(rom[RAM_SIZE]),
            checksum_ok: header_checksum(rom) == rom[HEADER_CHECKSUM],
        })
    }
}

// ---------------------------------------------------------------------------
// Cartridge
// ---------------------------------------------------------------------------

/// A loaded ROM image and its decoded header.
pub struct Cartridge {
    header: Header,
    data: Vec<u8>,
}

impl Cartridge {
    /// Load a ROM image from disk. Paths ending in `.zip` are opened as
    /// archives and the first `.gb`/`.gbc` entry is used.
    pub fn from_file(path: &Path) -> Result<Self, CartridgeError> {
        let data = if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
        {
            read_from_zip(path)?
        } else {
            std::fs::read(path)?
        };
        Self::from_bytes(data)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, CartridgeError> {
        // Exactly HEADER_END bytes is a header with no program behind it.
        if data.len() <= HEADER_END {
            return Err(CartridgeError::TooSmall(data.len()));
        }
        let header = Header::parse(&data)?;
        if !header.checksum_ok {
            warn!("header checksum mismatch for \"{}\"", header.title);
        }
        Ok(Self { header, data })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Battery-backed carts with RAM keep a save file.
    pub fn save_supported(&self) -> bool {
        self.header.battery
    }

    pub fn log_info(&self) {
        let h = &self.header;
        info!(
            "cartridge \"{}\": type 0x{:02X} ({:?}{}), ROM {} KiB, RAM {} KiB{}",
            h.title,
            h.cartridge_type,
            h.mapper,
            if h.battery { "+BATTERY" } else { "" },
            h.rom_size / 1024,
            h.ram_size / 1024,
            if h.cgb { ", CGB" } else { "" },
        );
    }
}

fn is_rom_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".gb") || lower.ends_with(".gbc")
}

fn read_from_zip(path: &Path) -> Result<Vec<u8>, CartridgeError> {
    let reader = BufReader::new(File::open(path)?);
    let mut archive = zip::ZipArchive::new(reader)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() || !is_rom_name(entry.name()) {
            continue;
        }
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut data)?;
        return Ok(data);
    }

    Err(CartridgeError::EmptyArchive)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// Build a minimal valid image: 32 KiB, given type byte, fixed title and
/// a correct header checksum.
#[cfg(test)]
pub(crate) fn test_image(cartridge_type: u8) -> Vec<u8> {
    let mut rom = vec![0u8; 0x8000];
    rom[TITLE_START..TITLE_START + 6].copy_from_slice(b"POCKET");
    rom[CARTRIDGE_TYPE] = cartridge_type;
    rom[RAM_SIZE] = 0x02;
    rom[HEADER_CHECKSUM] = header_checksum(&rom);
    rom
}
