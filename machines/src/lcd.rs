//! Off-screen LCD shared by the backends.

use pocket_core::core::StepContext;
use pocket_core::core::frame::{
    BYTES_PER_PIXEL, FRAME_BYTES, FRAME_HEIGHT, FRAME_WIDTH, VISIBLE_WIDTH,
};

use crate::palette::Palette;

/// Visible LCD size in pixels.
pub const LCD_WIDTH: usize = VISIBLE_WIDTH;
pub const LCD_HEIGHT: usize = FRAME_HEIGHT;

/// A full-pitch RGBA frame of which the left 160 columns are drawn.
pub struct Lcd {
    pixels: Vec<u8>,
    palette: Palette,
}

impl Lcd {
    pub fn new() -> Self {
        Self {
            pixels: vec![0; FRAME_BYTES],
            palette: Palette::default(),
        }
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn toggle_palette(&mut self) {
        self.palette = self.palette.toggled();
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Set one pixel; coordinates outside the LCD are ignored.
    pub fn set(&mut self, x: usize, y: usize, shade: u8) {
        if x >= LCD_WIDTH || y >= LCD_HEIGHT {
            return;
        }
        let offset = (y * FRAME_WIDTH + x) * BYTES_PER_PIXEL;
        self.pixels[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&self.palette.rgba(shade));
    }

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, shade: u8) {
        for row in y..(y + h).min(LCD_HEIGHT) {
            for col in x..(x + w).min(LCD_WIDTH) {
                self.set(col, row, shade);
            }
        }
    }

    pub fn clear(&mut self, shade: u8) {
        self.fill_rect(0, 0, LCD_WIDTH, LCD_HEIGHT, shade);
    }

    /// Hand the finished frame to the session.
    pub fn present(&self, ctx: &mut StepContext<'_>) -> bool {
        ctx.present(&self.pixels)
    }
}

impl Default for Lcd {
    fn default() -> Self {
        Self::new()
    }
}
