//! Per-pixel resolve policies over an `S x S` block of G-buffer texels.

use glam::Vec3;

use super::shading::{shade, LightCamera};
use crate::gbuffer::GBuffer;

/// Depth divergence above which a block is treated as spanning more than one surface.
/// The comparison is strict: a divergence of exactly this value is not an edge.
pub const EDGE_DEPTH_THRESHOLD: f32 = 1.0e-4;

/// Texel coordinates of the block behind output pixel `(px, py)`, x-major.
pub fn block_texels(px: u32, py: u32, s: u32) -> impl Iterator<Item = (u32, u32)> {
    let (ox, oy) = (px * s, py * s);
    (0..s).flat_map(move |i| (0..s).map(move |j| (ox + i, oy + j)))
}

/// One shading evaluation at the block's first corner.
pub fn shade_single(g: &GBuffer, lc: &LightCamera, px: u32, py: u32, s: u32) -> Vec3 {
    shade(&g.texel(px * s, py * s), lc)
}

/// Box filter of shaded radiance over the whole block.
pub fn shade_supersampled(g: &GBuffer, lc: &LightCamera, px: u32, py: u32, s: u32) -> Vec3 {
    let sum = block_texels(px, py, s)
        .fold(Vec3::ZERO, |acc, (x, y)| acc + shade(&g.texel(x, y), lc));
    sum / (s * s) as f32
}

/// True when any texel's depth differs from the corner depth by more than
/// [`EDGE_DEPTH_THRESHOLD`]. Stops at the first divergent texel.
pub fn is_edge(g: &GBuffer, px: u32, py: u32, s: u32) -> bool {
    let z_ref = g.depth(px * s, py * s);
    block_texels(px, py, s).any(|(x, y)| (z_ref - g.depth(x, y)).abs() > EDGE_DEPTH_THRESHOLD)
}

/// Adaptive resolve: full supersampling on edge blocks, a single evaluation otherwise.
/// Returns the color and whether the block was classified as an edge.
pub fn shade_adaptive(g: &GBuffer, lc: &LightCamera, px: u32, py: u32, s: u32) -> (Vec3, bool) {
    if is_edge(g, px, py, s) {
        (shade_supersampled(g, lc, px, py, s), true)
    } else {
        (shade_single(g, lc, px, py, s), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gbuffer::Texel;
    use glam::Mat4;

    fn params() -> LightCamera {
        LightCamera {
            light_world_position: Vec3::new(0.0, 4.0, 0.0),
            view: Mat4::IDENTITY,
            normal: Mat4::IDENTITY,
        }
    }

    // Texels differ in position and material so averages are distinguishable
    // from any single sample.
    fn varied_texel(x: u32, y: u32, depth: f32) -> Texel {
        let fx = x as f32;
        let fy = y as f32;
        Texel {
            position: Vec3::new(fx - 1.0, -2.0 + 0.1 * fy, -8.0 - fx),
            depth,
            normal: Vec3::new(0.1 * fx, 1.0, 0.2 * fy),
            diffuse: Vec3::new(0.2 + 0.1 * fx, 0.5, 0.3 + 0.05 * fy),
            specular: Vec3::splat(0.4),
            shininess: 8.0 + fx + fy,
        }
    }

    /// 2x2 G-buffer (one output pixel at S=2) with the given depths in block order.
    fn block_2x2(depths: [f32; 4]) -> GBuffer {
        let mut g = GBuffer::new(2, 2);
        for (k, (x, y)) in block_texels(0, 0, 2).enumerate() {
            g.set_texel(x, y, &varied_texel(x, y, depths[k]));
        }
        g
    }

    #[test]
    fn block_covers_all_subtexels_once() {
        let mut seen: Vec<_> = block_texels(3, 1, 3).collect();
        seen.sort();
        let mut want = Vec::new();
        for x in 9..12 {
            for y in 3..6 {
                want.push((x, y));
            }
        }
        assert_eq!(seen, want);
    }

    #[test]
    fn supersample_is_mean_of_subtexel_shading() {
        let g = block_2x2([1.0, 2.0, 3.0, 4.0]);
        let lc = params();
        let manual = (0..2)
            .flat_map(|x| (0..2).map(move |y| (x, y)))
            .map(|(x, y)| shade(&g.texel(x, y), &lc))
            .fold(Vec3::ZERO, |a, b| a + b)
            / 4.0;
        let got = shade_supersampled(&g, &lc, 0, 0, 2);
        assert!((got - manual).abs().max_element() < 1e-6);
    }

    #[test]
    fn threshold_boundary_is_strict() {
        let exact = block_2x2([0.0, 0.0, 0.0, EDGE_DEPTH_THRESHOLD]);
        assert!(!is_edge(&exact, 0, 0, 2));

        let over = block_2x2([0.0, 0.0, 0.0, EDGE_DEPTH_THRESHOLD * 1.0001]);
        assert!(is_edge(&over, 0, 0, 2));

        let below_ref = block_2x2([0.0, -EDGE_DEPTH_THRESHOLD * 1.0001, 0.0, 0.0]);
        assert!(is_edge(&below_ref, 0, 0, 2));
    }

    #[test]
    fn small_divergence_shades_corner_once() {
        let g = block_2x2([1.0, 1.0, 1.0, 1.00005]);
        let lc = params();
        let (rgb, edge) = shade_adaptive(&g, &lc, 0, 0, 2);
        assert!(!edge);
        assert_eq!(rgb, shade(&g.texel(0, 0), &lc));
        assert_ne!(rgb, shade_supersampled(&g, &lc, 0, 0, 2));
    }

    #[test]
    fn large_divergence_uses_four_sample_average() {
        let g = block_2x2([1.0, 1.0, 1.0, 1.0002]);
        let lc = params();
        let (rgb, edge) = shade_adaptive(&g, &lc, 0, 0, 2);
        assert!(edge);
        assert_eq!(rgb, shade_supersampled(&g, &lc, 0, 0, 2));
    }

    #[test]
    fn flat_block_matches_corner_exactly() {
        let mut g = GBuffer::new(6, 6);
        for y in 0..6 {
            for x in 0..6 {
                g.set_texel(x, y, &varied_texel(x, y, 5.0));
            }
        }
        let lc = params();
        for (px, py) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            let (rgb, edge) = shade_adaptive(&g, &lc, px, py, 3);
            assert!(!edge);
            assert_eq!(rgb, shade(&g.texel(px * 3, py * 3), &lc));
        }
    }

    #[test]
    fn subsample_one_makes_policies_agree() {
        let g = block_2x2([1.0, 7.0, 3.0, 9.0]);
        let lc = params();
        for (px, py) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            let single = shade_single(&g, &lc, px, py, 1);
            assert_eq!(shade_supersampled(&g, &lc, px, py, 1), single);
            assert_eq!(shade_adaptive(&g, &lc, px, py, 1), (single, false));
        }
    }
}
