//! User configuration stored as TOML in the platform config directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shortest idle wait accepted from the config file; zero would make a
/// paused loop spin.
pub const MIN_IDLE_WAIT_MS: u64 = 1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialise config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Scancode names (as understood by SDL) bound to each action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct KeyBindings {
    pub up: Vec<String>,
    pub down: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub a: Vec<String>,
    pub b: Vec<String>,
    pub start: Vec<String>,
    pub select: Vec<String>,
    pub toggle_display: Vec<String>,
    pub open_rom: Vec<String>,
    pub screenshot: Vec<String>,
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            up: keys(&["Up"]),
            down: keys(&["Down"]),
            left: keys(&["Left"]),
            right: keys(&["Right"]),
            a: keys(&["Z"]),
            b: keys(&["X"]),
            start: keys(&["Return"]),
            select: keys(&["Right Shift", "Backspace"]),
            toggle_display: keys(&["C"]),
            open_rom: keys(&["O"]),
            screenshot: keys(&["F12"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Directory the ROM picker opens in.
    pub rom_dir: Option<PathBuf>,
    /// Where battery saves and screenshots go.
    pub save_dir: Option<PathBuf>,
    pub rom_filter: String,
    pub idle_wait_ms: u64,
    pub backend: String,
    pub window_width: u32,
    pub pacing: bool,
    pub keys: KeyBindings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rom_dir: None,
            save_dir: None,
            rom_filter: ".gb".to_string(),
            idle_wait_ms: 350,
            backend: "testcard".to_string(),
            window_width: 640,
            pacing: true,
            keys: KeyBindings::default(),
        }
    }
}

impl Config {
    pub fn rom_dir(&self) -> PathBuf {
        self.rom_dir
            .clone()
            .or_else(dirs::download_dir)
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn save_dir(&self) -> PathBuf {
        self.save_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("pocket").join("saves"))
                .unwrap_or_else(|| PathBuf::from("saves"))
        })
    }

    pub fn screenshot_dir(&self) -> PathBuf {
        self.save_dir().join("screenshots")
    }

    pub fn idle_wait(&self) -> Duration {
        Duration::from_millis(self.idle_wait_ms.max(MIN_IDLE_WAIT_MS))
    }

    fn sanitize(mut self, path: &Path) -> Self {
        if self.idle_wait_ms < MIN_IDLE_WAIT_MS {
            warn!(
                "idle-wait-ms = {} in {} is too small; using {MIN_IDLE_WAIT_MS}",
                self.idle_wait_ms,
                path.display()
            );
            self.idle_wait_ms = MIN_IDLE_WAIT_MS;
        }
        self
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("pocket").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("pocket.toml"))
}

/// Read the config at `path`. A missing file yields the defaults; an
/// unreadable or malformed one is reported and also yields the defaults.
pub fn load_from_file(path: &Path) -> Config {
    let text = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Config::default(),
        Err(e) => {
            warn!("Failed to read config {}: {e}; using defaults", path.display());
            return Config::default();
        }
    };

    match toml::from_str::<Config>(&text) {
        Ok(cfg) => cfg.sanitize(path),
        Err(e) => {
            warn!("Failed to parse config {}: {e}; using defaults", path.display());
            Config::default()
        }
    }
}

pub fn save_to_file(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let text = toml::to_string_pretty(cfg)?;
    std::fs::write(path, text).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_from_file(&dir.path().join("nope.toml"));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "backend = \"romview\"\nidle-wait-ms = 100\n[keys]\na = [\"Space\"]\n",
        )
        .unwrap();

        let cfg = load_from_file(&path);
        assert_eq!(cfg.backend, "romview");
        assert_eq!(cfg.idle_wait(), Duration::from_millis(100));
        assert_eq!(cfg.keys.a, ["Space"]);
        assert_eq!(cfg.keys.b, ["X"]);
        assert_eq!(cfg.rom_filter, ".gb");
    }

    #[test]
    fn zero_idle_wait_is_raised_to_minimum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "idle-wait-ms = 0\n").unwrap();

        let cfg = load_from_file(&path);
        assert_eq!(cfg.idle_wait_ms, MIN_IDLE_WAIT_MS);
        assert_eq!(cfg.idle_wait(), Duration::from_millis(1));

        let unchecked = Config {
            idle_wait_ms: 0,
            ..Config::default()
        };
        assert!(!unchecked.idle_wait().is_zero());
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "window-width = \"wide\"").unwrap();
        assert_eq!(load_from_file(&path), Config::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config {
            rom_dir: Some(PathBuf::from("/roms")),
            pacing: false,
            ..Config::default()
        };
        save_to_file(&path, &cfg).unwrap();
        assert_eq!(load_from_file(&path), cfg);
    }
}
