//! Rectangle fills into the platform's back buffer

/// Mutable view of a `0x00RRGGBB` back buffer.
pub struct Bitmap<'a> {
    pub memory: &'a mut [u8],
    pub width: u32,
    pub height: u32,
    pub pitch: u32,
}

const BYTES_PER_PIXEL: usize = 4;

pub fn pack_color(red: f32, green: f32, blue: f32) -> u32 {
    let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u32;
    (channel(red) << 16) | (channel(green) << 8) | channel(blue)
}

impl Bitmap<'_> {
    /// Fill `[min, max)` in pixels, clipped to the bitmap.
    pub fn fill_rect(&mut self, min_x: f32, min_y: f32, max_x: f32, max_y: f32, color: u32) {
        let clip = |value: f32, limit: u32| (value.round().max(0.0) as u32).min(limit) as usize;
        let min_x = clip(min_x, self.width);
        let min_y = clip(min_y, self.height);
        let max_x = clip(max_x, self.width);
        let max_y = clip(max_y, self.height);
        if min_x >= max_x || min_y >= max_y {
            return;
        }

        let bytes = color.to_le_bytes();
        let pitch = self.pitch as usize;
        for row in self.memory.chunks_exact_mut(pitch).take(max_y).skip(min_y) {
            for pixel in row[min_x * BYTES_PER_PIXEL..max_x * BYTES_PER_PIXEL]
                .chunks_exact_mut(BYTES_PER_PIXEL)
            {
                pixel.copy_from_slice(&bytes);
            }
        }
    }

    pub fn clear(&mut self, color: u32) {
        self.fill_rect(0.0, 0.0, self.width as f32, self.height as f32, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(memory: &[u8], pitch: usize, x: usize, y: usize) -> u32 {
        let at = y * pitch + x * 4;
        u32::from_le_bytes([memory[at], memory[at + 1], memory[at + 2], memory[at + 3]])
    }

    #[test]
    fn test_pack_color() {
        assert_eq!(pack_color(1.0, 0.0, 1.0), 0x00FF_00FF);
        assert_eq!(pack_color(0.5, 0.5, 0.5), 0x0080_8080);
        assert_eq!(pack_color(2.0, -1.0, 0.0), 0x00FF_0000);
    }

    #[test]
    fn test_fill_rect_is_half_open_and_clipped() {
        let mut memory = vec![0u8; 8 * 4 * 4];
        let mut bitmap = Bitmap {
            memory: &mut memory,
            width: 8,
            height: 4,
            pitch: 32,
        };
        bitmap.fill_rect(-5.0, 1.0, 2.0, 100.0, 0x00AB_CDEF);

        assert_eq!(pixel(&memory, 32, 0, 0), 0);
        assert_eq!(pixel(&memory, 32, 0, 1), 0x00AB_CDEF);
        assert_eq!(pixel(&memory, 32, 1, 3), 0x00AB_CDEF);
        assert_eq!(pixel(&memory, 32, 2, 1), 0);
    }

    #[test]
    fn test_empty_rect_draws_nothing() {
        let mut memory = vec![0u8; 4 * 4 * 4];
        let mut bitmap = Bitmap {
            memory: &mut memory,
            width: 4,
            height: 4,
            pitch: 16,
        };
        bitmap.fill_rect(3.0, 3.0, 1.0, 1.0, 0xFFFF_FFFF);
        bitmap.fill_rect(10.0, 0.0, 20.0, 4.0, 0xFFFF_FFFF);
        assert!(memory.iter().all(|&b| b == 0));
    }
}
