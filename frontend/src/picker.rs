//! Console ROM picker driven by [`RomSelector`].
//!
//! Prints the current listing with indices and reads one choice per
//! line: a number picks that entry, `q` or end of input cancels. The
//! chosen file arrives through the selector's `on_select` listener.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use pocket_core::browser::{Choice, RomSelector};

/// Prompt until a file is chosen or the user cancels. Replaces any
/// listener already registered on `selector`.
pub fn pick(
    mut selector: RomSelector,
    mut input: impl BufRead,
    mut out: impl Write,
) -> io::Result<Option<PathBuf>> {
    let (tx, rx) = mpsc::channel();
    selector.on_select(move |path| {
        let _ = tx.send(path.to_path_buf());
    });

    loop {
        print_listing(&selector, &mut out)?;
        write!(out, "rom> ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Ok(None);
        }

        let choice = match line.parse::<usize>() {
            Ok(index) => selector.choose_index(index),
            Err(_) => selector.choose(line),
        };
        match choice {
            // The listener has already run by the time `choose` returns.
            Choice::Selected(_) => return Ok(rx.try_recv().ok()),
            Choice::Navigated => {}
            Choice::Unavailable => writeln!(out, "not available: {line}")?,
            Choice::Closed => return Ok(None),
        }
    }
}

fn print_listing(selector: &RomSelector, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", selector.current_dir().display())?;
    for (i, name) in selector.entries().iter().enumerate() {
        let marker = if selector.current_dir().join(name).is_dir() { "/" } else { "" };
        writeln!(out, "{i:>4}  {name}{marker}")?;
    }
    Ok(())
}

/// Open a selector at `start` and prompt on the terminal.
pub fn pick_from_terminal(start: &Path, filter: &str) -> io::Result<Option<PathBuf>> {
    let fallback = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"));
    let filter = (!filter.is_empty()).then_some(filter);
    let selector = RomSelector::new(start, filter, fallback);
    pick(selector, io::stdin().lock(), io::stdout().lock())
}
