//! Blinn-Phong shading of a single G-buffer texel.

use glam::{Mat4, Vec3};

use crate::config::schema::ResolveConfig;
use crate::gbuffer::Texel;

/// Added to `N·H` before exponentiation so a zero base with a fractional
/// shininess stays defined.
pub const SPECULAR_EPS: f32 = 1.0e-8;

/// Light and camera parameters shared read-only by every invocation of a dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightCamera {
    pub light_world_position: Vec3,
    pub view: Mat4,
    pub normal: Mat4,
}

impl LightCamera {
    pub fn new(light_world_position: Vec3, view: Mat4) -> Self {
        Self { light_world_position, view, normal: view.inverse().transpose() }
    }

    pub fn from_config(cfg: &ResolveConfig) -> Self {
        let c = &cfg.camera;
        let view = Mat4::look_at_rh(Vec3::from(c.eye), Vec3::from(c.target), Vec3::from(c.up));
        Self::new(Vec3::from(cfg.light.position), view)
    }
}

impl Default for LightCamera {
    fn default() -> Self {
        Self::from_config(&ResolveConfig::default())
    }
}

pub fn shade(t: &Texel, lc: &LightCamera) -> Vec3 {
    let pos_view = lc.view.transform_point3(t.position);
    let norm_view = lc.normal.transform_vector3(t.normal);
    let light_view = lc.view.transform_point3(lc.light_world_position);

    // Background texels carry a zero normal; normalize_or_zero keeps them black.
    let v = (-pos_view).normalize_or_zero();
    let n = norm_view.normalize_or_zero();
    let l = (light_view - pos_view).normalize_or_zero();
    let h = (v + l).normalize_or_zero();

    let ndotl = n.dot(l).max(0.0);
    let ndoth = n.dot(h).max(0.0);

    t.diffuse * ndotl + t.specular * (ndoth + SPECULAR_EPS).powf(t.shininess)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_params(light: Vec3) -> LightCamera {
        LightCamera { light_world_position: light, view: Mat4::IDENTITY, normal: Mat4::IDENTITY }
    }

    fn facing_texel() -> Texel {
        Texel {
            position: Vec3::new(0.0, 0.0, -10.0),
            depth: 10.0,
            normal: Vec3::Z,
            diffuse: Vec3::new(0.8, 0.4, 0.2),
            specular: Vec3::ZERO,
            shininess: 1.0,
        }
    }

    #[test]
    fn head_on_light_gives_full_diffuse() {
        let rgb = shade(&facing_texel(), &identity_params(Vec3::ZERO));
        assert!((rgb - Vec3::new(0.8, 0.4, 0.2)).abs().max_element() < 1e-6);
    }

    #[test]
    fn light_behind_surface_gives_no_diffuse() {
        let rgb = shade(&facing_texel(), &identity_params(Vec3::new(0.0, 0.0, -20.0)));
        assert_eq!(rgb, Vec3::ZERO);
    }

    #[test]
    fn mirror_configuration_gives_full_specular() {
        let mut t = facing_texel();
        t.diffuse = Vec3::ZERO;
        t.specular = Vec3::splat(0.5);
        t.shininess = 64.0;
        // Light at the eye: H == N, so the highlight peaks.
        let rgb = shade(&t, &identity_params(Vec3::ZERO));
        assert!((rgb - Vec3::splat(0.5)).abs().max_element() < 1e-4);
    }

    #[test]
    fn result_is_not_clamped() {
        let mut t = facing_texel();
        t.diffuse = Vec3::splat(3.0);
        let rgb = shade(&t, &identity_params(Vec3::ZERO));
        assert!(rgb.x > 2.9);
    }

    #[test]
    fn fractional_shininess_with_grazing_half_vector_stays_finite() {
        let mut t = facing_texel();
        t.normal = Vec3::X;
        t.specular = Vec3::ONE;
        t.shininess = 0.5;
        let rgb = shade(&t, &identity_params(Vec3::new(0.0, 0.0, 10.0)));
        assert!(rgb.is_finite());
    }

    #[test]
    fn background_texel_shades_to_black() {
        let rgb = shade(&Texel::default(), &LightCamera::default());
        assert!(rgb.is_finite());
        assert_eq!(rgb, Vec3::ZERO);
    }

    #[test]
    fn rigid_view_normal_matrix_matches_view_rotation() {
        let lc = LightCamera::default();
        let n = Vec3::new(0.3, 0.8, -0.2).normalize();
        let a = lc.normal.transform_vector3(n);
        let b = lc.view.transform_vector3(n);
        assert!((a - b).abs().max_element() < 1e-5);
    }
}
