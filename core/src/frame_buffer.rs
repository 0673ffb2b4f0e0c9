//! Software back buffer

use handmade_shared::GameOffscreenBuffer;

/// Back buffer the game draws into, 32-bit `0x00RRGGBB` pixels.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pitch: u32,
    memory: Vec<u8>,
}

impl FrameBuffer {
    pub const BYTES_PER_PIXEL: u32 = 4;

    pub fn new(width: u32, height: u32) -> Self {
        let pitch = width * Self::BYTES_PER_PIXEL;
        Self {
            width,
            height,
            pitch,
            memory: vec![0; (pitch * height) as usize],
        }
    }

    /// Reallocate for a new size. Previous contents are discarded.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }
        *self = Self::new(width, height);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pitch(&self) -> u32 {
        self.pitch
    }

    pub fn bytes(&self) -> &[u8] {
        &self.memory
    }

    /// Raw view for the game module. Valid until the buffer is resized or dropped.
    pub fn as_abi(&mut self) -> GameOffscreenBuffer {
        GameOffscreenBuffer {
            memory: self.memory.as_mut_ptr(),
            width: self.width,
            height: self.height,
            pitch: self.pitch,
            bytes_per_pixel: Self::BYTES_PER_PIXEL,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let at = (y * self.pitch + x * Self::BYTES_PER_PIXEL) as usize;
        let bytes = self.memory.get(at..at + 4)?;
        Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn fill(&mut self, color: u32) {
        for pixel in self.memory.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color.to_le_bytes());
        }
    }

    /// One-pixel-wide line from `top` up to but excluding `bottom`, clipped.
    pub fn draw_vertical(&mut self, x: u32, top: u32, bottom: u32, color: u32) {
        if x >= self.width {
            return;
        }
        let bottom = bottom.min(self.height);
        for y in top..bottom {
            let at = (y * self.pitch + x * Self::BYTES_PER_PIXEL) as usize;
            self.memory[at..at + 4].copy_from_slice(&color.to_le_bytes());
        }
    }

    /// Convert to tightly packed RGBA, as expected by the presenter.
    ///
    /// `dst` must hold `width * height * 4` bytes. Extra bytes are left alone.
    pub fn write_rgba(&self, dst: &mut [u8]) {
        let row_bytes = (self.width * Self::BYTES_PER_PIXEL) as usize;
        for (src_row, dst_row) in self
            .memory
            .chunks_exact(self.pitch.max(1) as usize)
            .zip(dst.chunks_exact_mut(row_bytes.max(1)))
        {
            for (src, out) in src_row[..row_bytes]
                .chunks_exact(4)
                .zip(dst_row.chunks_exact_mut(4))
            {
                // B, G, R, X -> R, G, B, A
                out[0] = src[2];
                out[1] = src[1];
                out[2] = src[0];
                out[3] = 0xFF;
            }
        }
    }
}
