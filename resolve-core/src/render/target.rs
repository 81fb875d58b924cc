//! Output image in signed-normalized 8-bit storage.

use glam::Vec3;

const SNORM_MAX: f32 = 127.0;

#[inline]
pub fn encode_snorm(v: f32) -> i8 {
    (v.clamp(-1.0, 1.0) * SNORM_MAX).round() as i8
}

#[inline]
pub fn decode_snorm(v: i8) -> f32 {
    (v as f32 / SNORM_MAX).max(-1.0)
}

/// Write-only (during a dispatch) RGBA8 snorm image, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTarget {
    width: u32,
    height: u32,
    pixels: Vec<[i8; 4]>,
}

impl RenderTarget {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, pixels: vec![[0; 4]; width as usize * height as usize] }
    }

    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }

    pub fn pixels(&self) -> &[[i8; 4]] { &self.pixels }

    pub(crate) fn pixels_mut(&mut self) -> &mut [[i8; 4]] { &mut self.pixels }

    /// Encodes `(rgb, 1.0)`; out-of-range radiance clips to `[-1, 1]`.
    #[inline]
    pub fn encode(rgb: Vec3) -> [i8; 4] {
        [encode_snorm(rgb.x), encode_snorm(rgb.y), encode_snorm(rgb.z), encode_snorm(1.0)]
    }

    #[cfg(test)]
    pub fn store(&mut self, x: u32, y: u32, rgb: Vec3) {
        let i = y as usize * self.width as usize + x as usize;
        self.pixels[i] = Self::encode(rgb);
    }

    #[cfg(test)]
    pub fn load(&self, x: u32, y: u32) -> glam::Vec4 {
        let p = self.pixels[y as usize * self.width as usize + x as usize];
        glam::Vec4::from_array(p.map(decode_snorm))
    }

    /// Displayable RGBA8; negative channels show as black.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&p| p.map(|c| (decode_snorm(c).clamp(0.0, 1.0) * 255.0).round() as u8))
            .collect()
    }
}
