//! Directory browser used to pick a ROM.
//!
//! Lists one directory at a time: a `..` entry when the directory has a
//! parent, every readable subdirectory, and every readable file whose
//! name contains the filter string (case-insensitive). Choosing a
//! directory descends into it; choosing a file fires the selection
//! listener once and closes the browser.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

/// Name of the synthetic entry that leads to the parent directory.
pub const PARENT_DIR: &str = "..";

/// Outcome of [`RomSelector::choose`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Choice {
    /// A directory was entered and the listing refreshed.
    Navigated,
    /// A file was picked; the listener has been called.
    Selected(PathBuf),
    /// The entry is not in the current listing, or became unreadable
    /// since it was listed. The listing has been refreshed.
    Unavailable,
    /// A file was already selected; the browser takes no more input.
    Closed,
}

type Listener = Box<dyn FnOnce(&Path) + Send>;

pub struct RomSelector {
    current: PathBuf,
    filter: Option<String>,
    entries: Vec<String>,
    listener: Option<Listener>,
    closed: bool,
}

impl RomSelector {
    /// Open the browser at `start`, or at `fallback_root` when `start`
    /// does not exist. `filter` of `None` lists every file. Relative
    /// paths are resolved against the current directory.
    pub fn new(
        start: impl AsRef<Path>,
        filter: Option<&str>,
        fallback_root: impl AsRef<Path>,
    ) -> Self {
        let start = absolutize(start.as_ref());
        let current = if start.exists() {
            start
        } else {
            let fallback = absolutize(fallback_root.as_ref());
            debug!(
                "{} does not exist, browsing {} instead",
                start.display(),
                fallback.display()
            );
            fallback
        };

        let mut selector = Self {
            current,
            filter: filter.map(str::to_lowercase),
            entries: Vec::new(),
            listener: None,
            closed: false,
        };
        selector.refresh();
        selector
    }

    /// Register the selection listener, replacing any earlier one.
    pub fn on_select(&mut self, listener: impl FnOnce(&Path) + Send + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn current_dir(&self) -> &Path {
        &self.current
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Re-read the current directory.
    pub fn refresh(&mut self) {
        self.entries = list_dir(&self.current, self.filter.as_deref());
    }

    /// Choose an entry by position in [`entries`](Self::entries).
    pub fn choose_index(&mut self, index: usize) -> Choice {
        match self.entries.get(index).cloned() {
            Some(name) => self.choose(&name),
            None if self.closed => Choice::Closed,
            None => Choice::Unavailable,
        }
    }

    /// Choose an entry by name.
    pub fn choose(&mut self, name: &str) -> Choice {
        if self.closed {
            return Choice::Closed;
        }
        if !self.entries.iter().any(|e| e == name) {
            return Choice::Unavailable;
        }

        let target = if name == PARENT_DIR {
            match self.current.parent() {
                Some(parent) => parent.to_path_buf(),
                None => return Choice::Unavailable,
            }
        } else {
            self.current.join(name)
        };

        match fs::metadata(&target) {
            Ok(meta) if meta.is_dir() => {
                self.current = target;
                self.refresh();
                Choice::Navigated
            }
            Ok(_) if is_readable_file(&target) => {
                self.closed = true;
                if let Some(listener) = self.listener.take() {
                    listener(&target);
                }
                Choice::Selected(target)
            }
            _ => {
                debug!("{} is no longer readable", target.display());
                self.refresh();
                Choice::Unavailable
            }
        }
    }
}

fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn matches_filter(name: &str, filter: Option<&str>) -> bool {
    filter.is_none_or(|f| name.to_lowercase().contains(f))
}

fn is_readable_file(path: &Path) -> bool {
    fs::File::open(path).is_ok()
}

fn is_readable_dir(path: &Path) -> bool {
    fs::read_dir(path).is_ok()
}

/// List `dir`: parent marker first, then directories, then matching
/// files, each group sorted case-insensitively. Entries that cannot be
/// read are left out.
fn list_dir(dir: &Path, filter: Option<&str>) -> Vec<String> {
    let mut listing = Vec::new();
    if !dir.exists() {
        return listing;
    }
    if dir.parent().is_some() {
        listing.push(PARENT_DIR.to_string());
    }

    let read = match fs::read_dir(dir) {
        Ok(read) => read,
        Err(e) => {
            debug!("cannot list {}: {e}", dir.display());
            return listing;
        }
    };

    let mut found: Vec<(bool, String)> = Vec::new();
    for entry in read {
        let Ok(entry) = entry else { continue };
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();
        // Follows symlinks so a link to a directory counts as one.
        let Ok(meta) = fs::metadata(&path) else {
            debug!("skipping unreadable entry {}", path.display());
            continue;
        };

        if meta.is_dir() {
            if is_readable_dir(&path) {
                found.push((true, name));
            }
        } else if matches_filter(&name, filter) && is_readable_file(&path) {
            found.push((false, name));
        }
    }

    found.sort_by(|(a_dir, a), (b_dir, b)| match b_dir.cmp(a_dir) {
        Ordering::Equal => a.to_lowercase().cmp(&b.to_lowercase()),
        other => other,
    });
    listing.extend(found.into_iter().map(|(_, name)| name));
    listing
}
