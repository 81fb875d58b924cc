//! G-buffer storage and the texel sampler.
//!
//! Four RGBA32F planes share one extent in the supersampled coordinate space:
//! position (w = linear depth), normal, diffuse albedo and specular (a = shininess).

pub mod io;

use glam::{Vec3, Vec4, Vec4Swizzles};

use crate::error::{ResolveError, ResolveResult};

/// Attributes of one G-buffer texel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Texel {
    pub position: Vec3,
    pub depth: f32,
    pub normal: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GBuffer {
    width: u32,
    height: u32,
    position: Vec<[f32; 4]>,
    normal: Vec<[f32; 4]>,
    diffuse: Vec<[f32; 4]>,
    specular: Vec<[f32; 4]>,
}

impl GBuffer {
    /// Zero-filled G-buffer; every texel reads back as background.
    pub fn new(width: u32, height: u32) -> Self {
        let n = width as usize * height as usize;
        Self {
            width,
            height,
            position: vec![[0.0; 4]; n],
            normal: vec![[0.0; 4]; n],
            diffuse: vec![[0.0; 4]; n],
            specular: vec![[0.0; 4]; n],
        }
    }

    #[cfg(test)]
    pub fn filled(width: u32, height: u32, texel: &Texel) -> Self {
        let mut g = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                g.set_texel(x, y, texel);
            }
        }
        g
    }

    pub fn from_planes(
        width: u32,
        height: u32,
        position: Vec<[f32; 4]>,
        normal: Vec<[f32; 4]>,
        diffuse: Vec<[f32; 4]>,
        specular: Vec<[f32; 4]>,
    ) -> ResolveResult<Self> {
        let n = width as usize * height as usize;
        for (name, len) in [
            ("position", position.len()),
            ("normal", normal.len()),
            ("diffuse", diffuse.len()),
            ("specular", specular.len()),
        ] {
            if len != n {
                return Err(ResolveError::extent(format!(
                    "{} plane has {} texels, expected {}x{} = {}",
                    name, len, width, height, n
                )));
            }
        }
        Ok(Self { width, height, position, normal, diffuse, specular })
    }

    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }

    /// Planes in file order: position, normal, diffuse, specular.
    pub fn planes(&self) -> [&[[f32; 4]]; 4] {
        [&self.position, &self.normal, &self.diffuse, &self.specular]
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(
            x < self.width && y < self.height,
            "texel ({}, {}) outside {}x{}",
            x,
            y,
            self.width,
            self.height
        );
        y as usize * self.width as usize + x as usize
    }

    /// Reads the full attribute bundle at `(x, y)`.
    ///
    /// Coordinates must lie inside the G-buffer extent; the dispatch layer checks
    /// extents once up front instead of per read.
    #[inline]
    pub fn texel(&self, x: u32, y: u32) -> Texel {
        let i = self.index(x, y);
        let p = Vec4::from_array(self.position[i]);
        let s = Vec4::from_array(self.specular[i]);
        Texel {
            position: p.xyz(),
            depth: p.w,
            normal: Vec4::from_array(self.normal[i]).xyz(),
            diffuse: Vec4::from_array(self.diffuse[i]).xyz(),
            specular: s.xyz(),
            shininess: s.w,
        }
    }

    /// Depth only; the edge detector reads nothing else.
    #[inline]
    pub fn depth(&self, x: u32, y: u32) -> f32 {
        self.position[self.index(x, y)][3]
    }

    pub fn set_texel(&mut self, x: u32, y: u32, t: &Texel) {
        let i = self.index(x, y);
        self.position[i] = t.position.extend(t.depth).to_array();
        self.normal[i] = t.normal.extend(0.0).to_array();
        self.diffuse[i] = t.diffuse.extend(1.0).to_array();
        self.specular[i] = t.specular.extend(t.shininess).to_array();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Texel {
        Texel {
            position: Vec3::new(1.0, 2.0, 3.0),
            depth: 42.0,
            normal: Vec3::Y,
            diffuse: Vec3::new(0.5, 0.25, 0.125),
            specular: Vec3::splat(0.75),
            shininess: 16.0,
        }
    }

    #[test]
    fn texel_reads_back_what_was_written() {
        let mut g = GBuffer::new(4, 3);
        g.set_texel(3, 2, &sample());
        assert_eq!(g.texel(3, 2), sample());
        assert_eq!(g.depth(3, 2), 42.0);
        assert_eq!(g.texel(0, 0), Texel::default());
    }

    #[test]
    fn depth_and_shininess_are_packed_in_w() {
        let mut g = GBuffer::new(1, 1);
        g.set_texel(0, 0, &sample());
        let [pos, _, _, spec] = g.planes();
        assert_eq!(pos[0][3], 42.0);
        assert_eq!(spec[0][3], 16.0);
    }

    #[test]
    fn from_planes_checks_lengths() {
        let plane = |n: usize| vec![[0.0; 4]; n];
        let ok = GBuffer::from_planes(2, 1, plane(2), plane(2), plane(2), plane(2));
        assert!(ok.is_ok());
        let bad = GBuffer::from_planes(2, 2, plane(4), plane(3), plane(4), plane(4));
        assert!(matches!(bad, Err(ResolveError::InvalidExtent(_))));
    }
}
