//! Battery-backed cartridge RAM and its save file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("save file {path} is {actual} bytes, cartridge RAM is {expected}")]
    SizeMismatch {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },
}

impl SaveError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Location of a cartridge's save: `<save_dir>/<rom file name>.sav`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveFile {
    path: PathBuf,
}

impl SaveFile {
    pub fn for_rom(save_dir: &Path, rom: &Path) -> Self {
        let name = rom
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "cartridge".to_string());
        Self {
            path: save_dir.join(format!("{name}.sav")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fill `ram` from the save file. Returns `Ok(false)` when there is
    /// no save yet. A shorter file fills a prefix; a longer one is
    /// rejected and `ram` is cleared.
    pub fn load_into(&self, ram: &mut [u8]) -> Result<bool, SaveError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(SaveError::io(&self.path, e)),
        };

        if data.len() > ram.len() {
            ram.fill(0);
            return Err(SaveError::SizeMismatch {
                path: self.path.clone(),
                expected: ram.len(),
                actual: data.len(),
            });
        }

        ram[..data.len()].copy_from_slice(&data);
        Ok(true)
    }

    /// Write `data` atomically: a sibling temp file is written, then
    /// renamed over the save.
    pub fn store(&self, data: &[u8]) -> Result<(), SaveError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| SaveError::io(dir, e))?;
        }
        let tmp = self.path.with_extension("sav.tmp");
        fs::write(&tmp, data).map_err(|e| SaveError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| SaveError::io(&self.path, e))
    }
}

// ---------------------------------------------------------------------------
// Cartridge RAM
// ---------------------------------------------------------------------------

/// External cartridge RAM with a dirty flag. Only battery-backed RAM has
/// a [`SaveFile`]; for the rest `save_if_needed` is a no-op.
pub struct BatteryRam {
    data: Vec<u8>,
    dirty: bool,
    file: Option<SaveFile>,
}

impl BatteryRam {
    pub fn volatile(size: usize) -> Self {
        Self {
            data: vec![0; size],
            dirty: false,
            file: None,
        }
    }

    /// Battery-backed RAM, restored from `file` when a save exists.
    pub fn battery(size: usize, file: SaveFile) -> Self {
        let mut ram = Self {
            data: vec![0; size],
            dirty: false,
            file: None,
        };
        match file.load_into(&mut ram.data) {
            Ok(true) => info!("loaded save {}", file.path().display()),
            Ok(false) => debug!("no save at {}", file.path().display()),
            Err(e) => warn!("ignoring save: {e}"),
        }
        ram.file = Some(file);
        ram
    }

    pub fn is_battery_backed(&self) -> bool {
        self.file.is_some()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn read(&self, addr: usize) -> u8 {
        self.data.get(addr).copied().unwrap_or(0xFF)
    }

    pub fn write(&mut self, addr: usize, value: u8) {
        if let Some(slot) = self.data.get_mut(addr)
            && *slot != value
        {
            *slot = value;
            self.dirty = true;
        }
    }

    /// Persist the RAM if it was written since the last save.
    pub fn save_if_needed(&mut self) -> Result<bool, SaveError> {
        let Some(file) = &self.file else {
            return Ok(false);
        };
        if !self.dirty {
            return Ok(false);
        }
        file.store(&self.data)?;
        self.dirty = false;
        debug!("saved {}", file.path().display());
        Ok(true)
    }
}
