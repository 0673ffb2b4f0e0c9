//! Blit the software back buffer to the window

use std::sync::Arc;

use handmade_core::FrameBuffer;
use pixels::{Pixels, SurfaceTexture, TextureError};
use thiserror::Error;
use winit::window::Window;

#[derive(Debug, Error)]
pub enum PresentError {
    #[error("pixels error: {0}")]
    Pixels(#[from] pixels::Error),

    #[error("texture error: {0}")]
    Texture(#[from] TextureError),
}

/// Scales the back buffer to the window through `pixels`.
pub struct Presenter {
    pixels: Pixels<'static>,
    buffer_size: (u32, u32),
}

impl Presenter {
    pub fn new(
        window: Arc<Window>,
        buffer_width: u32,
        buffer_height: u32,
    ) -> Result<Self, PresentError> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width.max(1), size.height.max(1), window);
        let pixels = Pixels::new(buffer_width, buffer_height, surface)?;
        Ok(Self {
            pixels,
            buffer_size: (buffer_width, buffer_height),
        })
    }

    pub fn resize_surface(&mut self, width: u32, height: u32) -> Result<(), PresentError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        Ok(self.pixels.resize_surface(width, height)?)
    }

    /// Copy `frame` into the texture and draw it.
    pub fn present(&mut self, frame: &FrameBuffer) -> Result<(), PresentError> {
        let size = (frame.width(), frame.height());
        if size != self.buffer_size {
            self.pixels.resize_buffer(size.0, size.1)?;
            self.buffer_size = size;
        }
        frame.write_rgba(self.pixels.frame_mut());
        Ok(self.pixels.render()?)
    }
}
