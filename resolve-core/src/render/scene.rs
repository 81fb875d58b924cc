//! Analytic G-buffer generator: spheres over a ground plane, one primary ray per
//! texel. Used for demos and benchmarks where no external geometry pass exists.

use glam::Vec3;

use crate::config::CameraConfig;
use crate::gbuffer::{GBuffer, Texel};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub material: Material,
}

/// Infinite plane `dot(normal, p) == offset`.
#[derive(Debug, Clone, Copy)]
pub struct Ground {
    pub normal: Vec3,
    pub offset: f32,
    pub material: Material,
}

#[derive(Debug, Clone, Default)]
pub struct SyntheticScene {
    pub spheres: Vec<Sphere>,
    pub ground: Option<Ground>,
}

struct Hit {
    t: f32,
    normal: Vec3,
    material: Material,
}

impl Sphere {
    fn intersect(&self, origin: Vec3, dir: Vec3) -> Option<Hit> {
        let oc = origin - self.center;
        let b = oc.dot(dir);
        let c = oc.length_squared() - self.radius * self.radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let sq = disc.sqrt();
        let t = if -b - sq > 0.0 { -b - sq } else { -b + sq };
        if t <= 0.0 {
            return None;
        }
        let p = origin + dir * t;
        Some(Hit { t, normal: (p - self.center) / self.radius, material: self.material })
    }
}

impl Ground {
    fn intersect(&self, origin: Vec3, dir: Vec3) -> Option<Hit> {
        let denom = self.normal.dot(dir);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = (self.offset - self.normal.dot(origin)) / denom;
        (t > 0.0).then_some(Hit { t, normal: self.normal, material: self.material })
    }
}

impl SyntheticScene {
    /// A grey floor with a glossy red and a matte blue sphere, framed by the
    /// default camera.
    pub fn default_scene() -> Self {
        Self {
            spheres: vec![
                Sphere {
                    center: Vec3::new(-9.0, 5.0, 0.0),
                    radius: 5.0,
                    material: Material {
                        diffuse: Vec3::new(0.8, 0.15, 0.1),
                        specular: Vec3::splat(0.6),
                        shininess: 48.0,
                    },
                },
                Sphere {
                    center: Vec3::new(8.0, 4.0, 6.0),
                    radius: 4.0,
                    material: Material {
                        diffuse: Vec3::new(0.1, 0.25, 0.8),
                        specular: Vec3::splat(0.1),
                        shininess: 4.0,
                    },
                },
            ],
            ground: Some(Ground {
                normal: Vec3::Y,
                offset: 0.0,
                material: Material {
                    diffuse: Vec3::splat(0.55),
                    specular: Vec3::splat(0.2),
                    shininess: 16.0,
                },
            }),
        }
    }

    fn nearest(&self, origin: Vec3, dir: Vec3) -> Option<Hit> {
        self.spheres
            .iter()
            .filter_map(|s| s.intersect(origin, dir))
            .chain(self.ground.iter().filter_map(|g| g.intersect(origin, dir)))
            .min_by(|a, b| a.t.total_cmp(&b.t))
    }

    /// Ray-casts a `width x height` G-buffer. `w` of position holds the linear
    /// view depth; hits outside `[near, far]` and misses stay zero.
    pub fn rasterize(&self, cam: &CameraConfig, width: u32, height: u32) -> GBuffer {
        let mut g = GBuffer::new(width, height);
        if width == 0 || height == 0 {
            return g;
        }
        let eye = Vec3::from(cam.eye);
        let forward = (Vec3::from(cam.target) - eye).normalize();
        let right = forward.cross(Vec3::from(cam.up)).normalize();
        let up = right.cross(forward);
        let tan_half = (cam.fov_deg.to_radians() * 0.5).tan();
        let aspect = width as f32 / height as f32;

        for y in 0..height {
            for x in 0..width {
                let sx = (2.0 * (x as f32 + 0.5) / width as f32 - 1.0) * aspect * tan_half;
                let sy = (1.0 - 2.0 * (y as f32 + 0.5) / height as f32) * tan_half;
                let dir = (forward + right * sx + up * sy).normalize();
                let Some(hit) = self.nearest(eye, dir) else { continue; };
                let position = eye + dir * hit.t;
                let depth = (position - eye).dot(forward);
                if depth < cam.near || depth > cam.far {
                    continue;
                }
                g.set_texel(x, y, &Texel {
                    position,
                    depth,
                    normal: hit.normal,
                    diffuse: hit.material.diffuse,
                    specular: hit.material.specular,
                    shininess: hit.material.shininess,
                });
            }
        }
        g
    }
}
