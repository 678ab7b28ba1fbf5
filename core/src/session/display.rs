use std::sync::Arc;

use super::Session;
use crate::core::frame::{FRAME_HEIGHT, Frame, VISIBLE_WIDTH};

/// Reader side of the frame buffer plus the viewport geometry.
///
/// The host calls [`poll_redraw`](Self::poll_redraw) on its own cadence;
/// it yields a frame only when something new was published since the
/// last draw.
pub struct DisplaySurface {
    session: Arc<Session>,
    viewport_width: u32,
    scale: f32,
    drawn_generation: u64,
}

impl DisplaySurface {
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            viewport_width: VISIBLE_WIDTH as u32,
            scale: 1.0,
            drawn_generation: 0,
        }
    }

    /// Fit the visible 160 pixel wide LCD area to `px` host pixels.
    pub fn set_viewport_width(&mut self, px: u32) {
        self.viewport_width = px;
        self.scale = px as f32 / VISIBLE_WIDTH as f32;
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Host-pixel size of the drawn area, keeping the LCD aspect ratio.
    pub fn viewport_size(&self) -> (u32, u32) {
        let height = self.viewport_width as u64 * FRAME_HEIGHT as u64 / VISIBLE_WIDTH as u64;
        (self.viewport_width, height as u32)
    }

    /// Source rectangle (x, y, w, h) within a frame that gets drawn.
    pub fn source_rect(&self) -> (u32, u32, u32, u32) {
        (0, 0, VISIBLE_WIDTH as u32, FRAME_HEIGHT as u32)
    }

    /// True when a frame newer than the last drawn one is available.
    pub fn needs_redraw(&self) -> bool {
        self.session.frames().generation() != self.drawn_generation
    }

    /// The newest frame if it has not been drawn yet.
    pub fn poll_redraw(&mut self) -> Option<Arc<Frame>> {
        let (frame, generation) = self.session.frames().snapshot_with_generation();
        if generation == self.drawn_generation {
            return None;
        }
        self.drawn_generation = generation;
        frame
    }

    /// The current frame regardless of whether it was drawn before, for
    /// redraws the host needs anyway (resize, expose).
    pub fn snapshot_for_draw(&self) -> Option<Arc<Frame>> {
        self.session.frames().snapshot_for_draw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::Frame;

    #[test]
    fn scale_follows_viewport_width() {
        let mut surface = DisplaySurface::new(Session::new());
        assert_eq!(surface.scale(), 1.0);

        surface.set_viewport_width(640);
        assert_eq!(surface.scale(), 4.0);
        assert_eq!(surface.viewport_size(), (640, 576));

        surface.set_viewport_width(1080);
        assert_eq!(surface.scale(), 6.75);
        assert_eq!(surface.viewport_size(), (1080, 972));
    }

    #[test]
    fn redraw_only_after_publish() {
        let session = Session::new();
        let mut surface = DisplaySurface::new(Arc::clone(&session));
        assert!(!surface.needs_redraw());
        assert!(surface.poll_redraw().is_none());

        session.frames().publish(Frame::blank());
        assert!(surface.needs_redraw());
        assert!(surface.poll_redraw().is_some());
        assert!(surface.poll_redraw().is_none());

        // Forced redraws still see the frame.
        assert!(surface.snapshot_for_draw().is_some());
    }
}
