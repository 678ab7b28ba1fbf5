use pocket_core::core::{FRAME_HEIGHT, FRAME_WIDTH, Frame};
use pocket_core::session::DisplaySurface;
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect;
use sdl2::render::{Canvas, TextureCreator};
use sdl2::video::{Window, WindowContext};

use crate::error::FrontendError;

pub struct Video {
    canvas: Canvas<Window>,
    texture_creator: TextureCreator<WindowContext>,
}

impl Video {
    /// Create a window sized to the surface's viewport.
    pub fn new(
        sdl_video: &sdl2::VideoSubsystem,
        title: &str,
        surface: &DisplaySurface,
    ) -> Result<Self, FrontendError> {
        let (width, height) = surface.viewport_size();
        let window = sdl_video
            .window(title, width, height)
            .position_centered()
            .build()
            .map_err(|e| FrontendError::Sdl(e.to_string()))?;

        let canvas = window
            .into_canvas()
            .accelerated()
            .present_vsync()
            .build()
            .map_err(|e| FrontendError::Sdl(e.to_string()))?;

        let texture_creator = canvas.texture_creator();

        Ok(Self {
            canvas,
            texture_creator,
        })
    }

    pub fn set_title(&mut self, title: &str) {
        if let Err(e) = self.canvas.window_mut().set_title(title) {
            log::debug!("set_title: {e}");
        }
    }

    /// Upload a full-pitch frame and draw its visible area stretched to
    /// the window.
    pub fn present(
        &mut self,
        frame: &Frame,
        surface: &DisplaySurface,
    ) -> Result<(), FrontendError> {
        // R, G, B, A byte order in memory.
        let mut texture = self
            .texture_creator
            .create_texture_streaming(
                PixelFormatEnum::ABGR8888,
                FRAME_WIDTH as u32,
                FRAME_HEIGHT as u32,
            )
            .map_err(|e| FrontendError::Sdl(e.to_string()))?;

        texture
            .update(None, frame.pixels(), frame.pitch())
            .map_err(|e| FrontendError::Sdl(e.to_string()))?;

        let (x, y, w, h) = surface.source_rect();
        let src = Rect::new(x as i32, y as i32, w, h);

        self.canvas.clear();
        self.canvas
            .copy(&texture, src, None)
            .map_err(FrontendError::Sdl)?;
        self.canvas.present();
        Ok(())
    }
}
