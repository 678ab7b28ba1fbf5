//! ROM viewer backend: shows the cartridge bytes as 2-bit pixels.
//!
//! Up/Down scroll one row per frame (eight with A held), Start jumps to
//! the header and Select back to the start of the image.

use log::info;
use pocket_core::core::{Button, Emulator, RomPath, StepContext, StepStatus};
use pocket_core::error::InitError;

use crate::lcd::{LCD_HEIGHT, LCD_WIDTH, Lcd};
use crate::pacing::FramePacer;
use crate::registry::{BackendEntry, BackendOptions};
use crate::slot::CartridgeSlot;

/// Four pixels per byte.
pub const ROW_BYTES: usize = LCD_WIDTH / 4;
const HEADER_OFFSET: usize = 0x100;
const FAST_SCROLL: usize = 8;

pub struct RomView {
    lcd: Lcd,
    pacer: FramePacer,
    slot: Option<CartridgeSlot>,
    offset: usize,
}

impl RomView {
    pub fn new(options: &BackendOptions) -> Self {
        Self {
            lcd: Lcd::new(),
            pacer: FramePacer::new(options.pacing),
            slot: None,
            offset: 0,
        }
    }

    /// Byte offset of the top-left pixel.
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn last_offset(len: usize) -> usize {
        len.saturating_sub(ROW_BYTES * LCD_HEIGHT) / ROW_BYTES * ROW_BYTES
    }

    fn render(&mut self) {
        let data = self.slot.as_ref().map(|s| s.cartridge().data()).unwrap_or(&[]);
        for y in 0..LCD_HEIGHT {
            for col in 0..ROW_BYTES {
                let byte = data.get(self.offset + y * ROW_BYTES + col).copied().unwrap_or(0);
                for px in 0..4 {
                    let shade = byte >> (6 - 2 * px) & 3;
                    self.lcd.set(col * 4 + px, y, shade);
                }
            }
        }
    }
}

impl Emulator for RomView {
    fn init(&mut self, rom: &RomPath) -> Result<(), InitError> {
        self.slot = Some(CartridgeSlot::insert(rom)?);
        self.offset = 0;
        self.pacer.reset();
        Ok(())
    }

    fn step(&mut self, ctx: &mut StepContext<'_>) -> StepStatus {
        let keys = ctx.keys();
        let len = self.slot.as_ref().map_or(0, |s| s.cartridge().data().len());
        let rows = if keys.is_pressed(Button::A) { FAST_SCROLL } else { 1 };

        if keys.is_pressed(Button::Select) {
            self.offset = 0;
        } else if keys.is_pressed(Button::Start) {
            self.offset = HEADER_OFFSET;
        } else if keys.is_pressed(Button::Down) {
            self.offset += rows * ROW_BYTES;
        } else if keys.is_pressed(Button::Up) {
            self.offset = self.offset.saturating_sub(rows * ROW_BYTES);
        }
        self.offset = self.offset.min(Self::last_offset(len));

        self.render();
        self.lcd.present(ctx);

        if let Some(slot) = &mut self.slot {
            slot.tick();
        }
        self.pacer.wait();
        StepStatus::Continue
    }

    fn save(&mut self) {
        if let Some(slot) = &mut self.slot {
            slot.save();
        }
    }

    fn teardown(&mut self) {
        if let Some(slot) = self.slot.take() {
            info!("closed \"{}\"", slot.cartridge().header().title);
        }
    }

    fn toggle_display_mode(&mut self) {
        self.lcd.toggle_palette();
    }
}

fn create(options: &BackendOptions) -> Box<dyn Emulator> {
    Box::new(RomView::new(options))
}

inventory::submit! {
    BackendEntry::new("romview", "scrollable view of the cartridge bytes", create)
}
