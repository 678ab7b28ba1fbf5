//! PNG screenshots of the visible LCD area.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use pocket_core::core::frame::VISIBLE_WIDTH;
use pocket_core::core::{FRAME_HEIGHT, Frame};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScreenshotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
}

/// Write the visible 160x144 area of `frame` to a new file in `dir`.
pub fn save(frame: &Frame, dir: &Path) -> Result<PathBuf, ScreenshotError> {
    std::fs::create_dir_all(dir)?;
    let path = unique_path(dir);

    let writer = BufWriter::new(File::create(&path)?);
    let mut encoder = png::Encoder::new(writer, VISIBLE_WIDTH as u32, FRAME_HEIGHT as u32);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&frame.visible_rgba())?;
    writer.finish()?;

    Ok(path)
}

fn unique_path(dir: &Path) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let mut n = 0;
    loop {
        let path = dir.join(format!("pocket-{stamp}-{n}.png"));
        if !path.exists() {
            return path;
        }
        n += 1;
    }
}
