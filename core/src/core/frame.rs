//! Video frames and the single-slot buffer that hands them from the
//! emulation loop to the display.

use std::sync::Arc;

use log::warn;
use parking_lot::Mutex;

/// Width of a delivered frame in pixels.
pub const FRAME_WIDTH: usize = 256;
/// Height of a delivered frame in pixels.
pub const FRAME_HEIGHT: usize = 144;
pub const BYTES_PER_PIXEL: usize = 4;
pub const FRAME_BYTES: usize = FRAME_WIDTH * FRAME_HEIGHT * BYTES_PER_PIXEL;

/// Width of the part of the frame that is actually shown. The engine
/// renders into a 256 pixel wide buffer but the LCD is 160 pixels wide.
pub const VISIBLE_WIDTH: usize = 160;

/// One complete 256x144 RGBA frame.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    pixels: Box<[u8]>,
}

impl Frame {
    /// An all-zero (transparent black) frame.
    pub fn blank() -> Self {
        Self {
            pixels: vec![0u8; FRAME_BYTES].into_boxed_slice(),
        }
    }

    /// Copy a frame out of a raw buffer. Extra trailing bytes are
    /// ignored; `None` if `raw` is shorter than one frame.
    pub fn from_raw(raw: &[u8]) -> Option<Self> {
        let mut frame = Self::blank();
        frame.copy_from(raw).then_some(frame)
    }

    fn copy_from(&mut self, raw: &[u8]) -> bool {
        match raw.get(..FRAME_BYTES) {
            Some(src) => {
                self.pixels.copy_from_slice(src);
                true
            }
            None => false,
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA value of the pixel at (x, y).
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let offset = (y * FRAME_WIDTH + x) * BYTES_PER_PIXEL;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.pixels[offset..offset + BYTES_PER_PIXEL]);
        px
    }

    /// Bytes per row, for texture uploads.
    pub fn pitch(&self) -> usize {
        FRAME_WIDTH * BYTES_PER_PIXEL
    }

    /// The visible 160x144 region, tightly packed.
    pub fn visible_rgba(&self) -> Vec<u8> {
        let row_bytes = VISIBLE_WIDTH * BYTES_PER_PIXEL;
        let mut out = Vec::with_capacity(row_bytes * FRAME_HEIGHT);
        for row in self.pixels.chunks_exact(self.pitch()) {
            out.extend_from_slice(&row[..row_bytes]);
        }
        out
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &FRAME_WIDTH)
            .field("height", &FRAME_HEIGHT)
            .finish_non_exhaustive()
    }
}

struct Slot {
    frame: Option<Arc<Frame>>,
    generation: u64,
}

/// Holds the most recently published frame.
///
/// There is one writer (the emulation loop) and one reader (the display).
/// The lock is held only for the pointer swap or the reference clone; a
/// reader keeps its frame alive through the `Arc` it gets back, so the
/// writer never frees a frame that is being drawn.
pub struct FrameBuffer {
    slot: Mutex<Slot>,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                frame: None,
                generation: 0,
            }),
        }
    }

    /// Make `frame` the current frame.
    ///
    /// The previous frame is detached under the lock and released after
    /// it. If nobody else holds it, it is handed back so its allocation
    /// can be reused for the next frame.
    pub fn publish(&self, frame: Frame) -> Option<Frame> {
        let frame = Arc::new(frame);
        let previous = {
            let mut slot = self.slot.lock();
            slot.generation += 1;
            slot.frame.replace(frame)
        };
        previous.and_then(|old| Arc::try_unwrap(old).ok())
    }

    /// The current frame, or `None` when nothing has been published yet
    /// (nothing to draw).
    pub fn snapshot_for_draw(&self) -> Option<Arc<Frame>> {
        self.slot.lock().frame.clone()
    }

    /// The current frame together with its publish generation.
    pub fn snapshot_with_generation(&self) -> (Option<Arc<Frame>>, u64) {
        let slot = self.slot.lock();
        (slot.frame.clone(), slot.generation)
    }

    /// Number of frames published so far.
    pub fn generation(&self) -> u64 {
        self.slot.lock().generation
    }
}

/// Producer side of a [`FrameBuffer`], owned by the emulation loop.
///
/// Keeps the allocation of the last replaced frame around so steady
/// state publishing does not allocate pixel storage.
pub struct FrameWriter {
    target: Arc<FrameBuffer>,
    spare: Option<Frame>,
    rejected: bool,
}

impl FrameWriter {
    pub fn new(target: Arc<FrameBuffer>) -> Self {
        Self {
            target,
            spare: None,
            rejected: false,
        }
    }

    /// Copy `raw` into an owned frame and publish it.
    pub fn publish_raw(&mut self, raw: &[u8]) -> bool {
        let mut frame = self.spare.take().unwrap_or_else(Frame::blank);
        if !frame.copy_from(raw) {
            if !self.rejected {
                warn!(
                    "dropping short frame: {} bytes, expected at least {FRAME_BYTES}",
                    raw.len()
                );
                self.rejected = true;
            }
            self.spare = Some(frame);
            return false;
        }
        self.spare = self.target.publish(frame);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(byte: u8) -> Vec<u8> {
        vec![byte; FRAME_BYTES]
    }

    #[test]
    fn empty_buffer_has_nothing_to_draw() {
        let buffer = FrameBuffer::new();
        assert!(buffer.snapshot_for_draw().is_none());
        assert_eq!(buffer.generation(), 0);
    }

    #[test]
    fn publish_replaces_frame() {
        let buffer = FrameBuffer::new();
        buffer.publish(Frame::from_raw(&filled(1)).unwrap());
        buffer.publish(Frame::from_raw(&filled(2)).unwrap());

        let frame = buffer.snapshot_for_draw().unwrap();
        assert!(frame.pixels().iter().all(|&b| b == 2));
        assert_eq!(buffer.generation(), 2);
    }

    #[test]
    fn held_snapshot_survives_publish() {
        let buffer = FrameBuffer::new();
        buffer.publish(Frame::from_raw(&filled(7)).unwrap());
        let held = buffer.snapshot_for_draw().unwrap();

        // Reader still holds the old frame, so it cannot be recycled.
        let recycled = buffer.publish(Frame::from_raw(&filled(8)).unwrap());
        assert!(recycled.is_none());
        assert!(held.pixels().iter().all(|&b| b == 7));
    }

    #[test]
    fn unshared_previous_frame_is_recycled() {
        let buffer = FrameBuffer::new();
        assert!(buffer.publish(Frame::blank()).is_none());
        assert!(buffer.publish(Frame::blank()).is_some());
    }

    #[test]
    fn short_raw_buffer_is_rejected() {
        assert!(Frame::from_raw(&[0u8; 16]).is_none());

        let buffer = Arc::new(FrameBuffer::new());
        let mut writer = FrameWriter::new(Arc::clone(&buffer));
        assert!(!writer.publish_raw(&[0u8; FRAME_BYTES - 1]));
        assert_eq!(buffer.generation(), 0);
    }

    #[test]
    fn oversized_raw_buffer_is_truncated() {
        // The engine allocates 256x160x4 and only the first 144 rows count.
        let mut raw = vec![3u8; FRAME_WIDTH * 160 * BYTES_PER_PIXEL];
        raw[FRAME_BYTES..].fill(9);

        let frame = Frame::from_raw(&raw).unwrap();
        assert_eq!(frame.pixels().len(), FRAME_BYTES);
        assert!(frame.pixels().iter().all(|&b| b == 3));
    }

    #[test]
    fn visible_region_is_cropped() {
        let mut raw = filled(0);
        // Mark the first column past the visible edge on row 0.
        let offset = VISIBLE_WIDTH * BYTES_PER_PIXEL;
        raw[offset..offset + 4].copy_from_slice(&[1, 2, 3, 4]);
        raw[0..4].copy_from_slice(&[9, 9, 9, 255]);

        let frame = Frame::from_raw(&raw).unwrap();
        assert_eq!(frame.pixel(VISIBLE_WIDTH, 0), [1, 2, 3, 4]);

        let visible = frame.visible_rgba();
        assert_eq!(visible.len(), VISIBLE_WIDTH * FRAME_HEIGHT * 4);
        assert_eq!(&visible[0..4], &[9, 9, 9, 255]);
        assert!(!visible.chunks_exact(4).any(|px| px == [1, 2, 3, 4]));
    }
}
