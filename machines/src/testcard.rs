//! Test card backend.
//!
//! Draws scrolling shade bars, one indicator per button, and the number
//! of button presses seen so far as a row of bits. The press counter
//! lives in the cartridge RAM, so on a battery-backed cartridge it
//! survives restarts through the save file.

use log::info;
use pocket_core::core::{Button, Emulator, Keys, RomPath, StepContext, StepStatus};
use pocket_core::error::InitError;

use crate::lcd::{LCD_HEIGHT, LCD_WIDTH, Lcd};
use crate::pacing::FramePacer;
use crate::registry::{BackendEntry, BackendOptions};
use crate::slot::CartridgeSlot;

const BAR_WIDTH: usize = 20;
const BARS_HEIGHT: usize = 112;
const KEY_ROW: usize = 118;
const KEY_BOX: usize = 16;
const COUNTER_ROW: usize = 138;
const COUNTER_BITS: usize = 16;

pub struct TestCard {
    lcd: Lcd,
    pacer: FramePacer,
    slot: Option<CartridgeSlot>,
    frame: u64,
    previous: Keys,
    presses: u32,
}

impl TestCard {
    pub fn new(options: &BackendOptions) -> Self {
        Self {
            lcd: Lcd::new(),
            pacer: FramePacer::new(options.pacing),
            slot: None,
            frame: 0,
            previous: Keys::default(),
            presses: 0,
        }
    }

    /// Button presses counted since the save was created.
    pub fn presses(&self) -> u32 {
        self.presses
    }

    fn load_counter(slot: &CartridgeSlot) -> u32 {
        let ram = slot.ram();
        u32::from_le_bytes([ram.read(0), ram.read(1), ram.read(2), ram.read(3)])
    }

    fn store_counter(&mut self) {
        if let Some(slot) = &mut self.slot {
            for (i, byte) in self.presses.to_le_bytes().into_iter().enumerate() {
                slot.ram_mut().write(i, byte);
            }
        }
    }

    fn render(&mut self, keys: Keys) {
        let lcd = &mut self.lcd;
        lcd.clear(0);

        let scroll = self.frame as usize;
        for x in 0..LCD_WIDTH {
            let shade = (((x + scroll) / BAR_WIDTH) % 4) as u8;
            lcd.fill_rect(x, 0, 1, BARS_HEIGHT, shade);
        }

        for (i, button) in Button::ALL.into_iter().enumerate() {
            let shade = if keys.is_pressed(button) { 3 } else { 1 };
            lcd.fill_rect(i * BAR_WIDTH + 2, KEY_ROW, KEY_BOX, KEY_BOX, shade);
        }

        let cell = LCD_WIDTH / COUNTER_BITS;
        for bit in 0..COUNTER_BITS {
            let set = self.presses >> (COUNTER_BITS - 1 - bit) & 1 != 0;
            let shade = if set { 3 } else { 1 };
            lcd.fill_rect(
                bit * cell,
                COUNTER_ROW,
                cell - 1,
                LCD_HEIGHT - COUNTER_ROW,
                shade,
            );
        }
    }
}

impl Emulator for TestCard {
    fn init(&mut self, rom: &RomPath) -> Result<(), InitError> {
        let slot = CartridgeSlot::insert(rom)?;
        self.presses = Self::load_counter(&slot);
        self.slot = Some(slot);
        self.frame = 0;
        self.previous = Keys::default();
        self.pacer.reset();
        Ok(())
    }

    fn step(&mut self, ctx: &mut StepContext<'_>) -> StepStatus {
        let keys = ctx.keys();
        let newly_pressed = keys.bits() & !self.previous.bits();
        self.previous = keys;
        if newly_pressed != 0 {
            self.presses = self.presses.wrapping_add(newly_pressed.count_ones());
            self.store_counter();
        }

        self.render(keys);
        self.lcd.present(ctx);

        if let Some(slot) = &mut self.slot {
            slot.tick();
        }
        self.frame += 1;
        self.pacer.wait();
        StepStatus::Continue
    }

    fn save(&mut self) {
        if let Some(slot) = &mut self.slot {
            slot.save();
        }
    }

    fn teardown(&mut self) {
        if self.slot.take().is_some() {
            info!("test card ejected after {} frames", self.frame);
        }
    }

    fn toggle_display_mode(&mut self) {
        self.lcd.toggle_palette();
    }
}

fn create(options: &BackendOptions) -> Box<dyn Emulator> {
    Box::new(TestCard::new(options))
}

inventory::submit! {
    BackendEntry::new("testcard", "shade bars, button indicators and a saved press counter", create)
}
