//! Dispatch entry: resolves every output pixel of a render target in parallel.
//!
//! Invocations are grouped into work groups for scheduling only. Each rayon job
//! owns one band of `work_group.y` output rows and walks it tile by tile, so no
//! two jobs ever touch the same output pixel and nothing is synchronized.

use std::num::NonZeroU32;
use std::time::Instant;

use glam::Vec3;
use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::resolve::{shade_adaptive, shade_single, shade_supersampled};
use super::shading::LightCamera;
use super::target::RenderTarget;
use crate::config::AaMode;
use crate::error::{ResolveError, ResolveResult};
use crate::gbuffer::GBuffer;

pub const DEFAULT_WORK_GROUP: [u32; 2] = [32, 32];

/// Counters accumulated over one dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchStats {
    pub pixels: u64,
    pub edge_pixels: u64,
    pub shading_evaluations: u64,
}

impl DispatchStats {
    pub fn merge(self, other: Self) -> Self {
        Self {
            pixels: self.pixels + other.pixels,
            edge_pixels: self.edge_pixels + other.edge_pixels,
            shading_evaluations: self.shading_evaluations + other.shading_evaluations,
        }
    }
}

/// Outcome of resolving one output pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelResolve {
    pub rgb: Vec3,
    pub edge: bool,
    pub evaluations: u32,
}

/// Read-only inputs of a dispatch, borrowed by every invocation.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    gbuffer: &'a GBuffer,
    params: &'a LightCamera,
    subsample: u32,
}

impl<'a> Resolver<'a> {
    pub fn new(gbuffer: &'a GBuffer, params: &'a LightCamera, subsample: NonZeroU32) -> Self {
        let s = subsample.get();
        if gbuffer.width() % s != 0 || gbuffer.height() % s != 0 {
            warn!(
                "G-buffer {}x{} is not a multiple of subsample {}; trailing texels are ignored",
                gbuffer.width(), gbuffer.height(), s
            );
        }
        Self { gbuffer, params, subsample: s }
    }

    pub fn subsample(&self) -> u32 { self.subsample }

    /// Largest output extent whose blocks all lie inside the G-buffer.
    pub fn output_extent(&self) -> (u32, u32) {
        (self.gbuffer.width() / self.subsample, self.gbuffer.height() / self.subsample)
    }

    /// Resolves output pixel `(px, py)` with exactly one policy.
    pub fn resolve_pixel(&self, mode: AaMode, px: u32, py: u32) -> PixelResolve {
        let (g, lc, s) = (self.gbuffer, self.params, self.subsample);
        let block = s * s;
        match mode {
            AaMode::None => PixelResolve {
                rgb: shade_single(g, lc, px, py, s),
                edge: false,
                evaluations: 1,
            },
            AaMode::Supersample => PixelResolve {
                rgb: shade_supersampled(g, lc, px, py, s),
                edge: false,
                evaluations: block,
            },
            AaMode::AdaptiveMultisample => {
                let (rgb, edge) = shade_adaptive(g, lc, px, py, s);
                PixelResolve { rgb, edge, evaluations: if edge { block } else { 1 } }
            }
        }
    }

    /// Resolves every pixel of `target` and writes `(rgb, 1.0)` once per pixel.
    pub fn dispatch(
        &self,
        mode: AaMode,
        work_group: [u32; 2],
        target: &mut RenderTarget,
    ) -> ResolveResult<DispatchStats> {
        let [wx, wy] = work_group;
        if wx == 0 || wy == 0 {
            return Err(ResolveError::InvalidWorkGroup(wx, wy));
        }
        let (max_w, max_h) = self.output_extent();
        let (width, height) = (target.width(), target.height());
        if width > max_w || height > max_h {
            return Err(ResolveError::TargetTooLarge {
                target_w: width,
                target_h: height,
                max_w,
                max_h,
            });
        }
        if width == 0 || height == 0 {
            return Ok(DispatchStats::default());
        }

        let started = Instant::now();
        let band_len = width as usize * wy as usize;
        let stats = target
            .pixels_mut()
            .par_chunks_mut(band_len)
            .enumerate()
            .map(|(band, rows)| {
                let y0 = band as u32 * wy;
                let band_rows = (rows.len() / width as usize) as u32;
                let mut stats = DispatchStats::default();
                for tx in (0..width).step_by(wx as usize) {
                    let tx_end = (tx + wx).min(width);
                    for dy in 0..band_rows {
                        let row = dy as usize * width as usize;
                        for px in tx..tx_end {
                            let r = self.resolve_pixel(mode, px, y0 + dy);
                            rows[row + px as usize] = RenderTarget::encode(r.rgb);
                            stats.pixels += 1;
                            stats.edge_pixels += r.edge as u64;
                            stats.shading_evaluations += r.evaluations as u64;
                        }
                    }
                }
                stats
            })
            .reduce(DispatchStats::default, DispatchStats::merge);

        info!(
            "resolved {}x{} mode={} subsample={} edges={} evaluations={} in {:?}",
            width,
            height,
            mode,
            self.subsample,
            stats.edge_pixels,
            stats.shading_evaluations,
            started.elapsed()
        );
        Ok(stats)
    }
}

/// Allocates a target at the full output extent and dispatches into it.
pub fn resolve_image(
    gbuffer: &GBuffer,
    params: &LightCamera,
    mode: AaMode,
    subsample: NonZeroU32,
    work_group: [u32; 2],
) -> ResolveResult<(RenderTarget, DispatchStats)> {
    let resolver = Resolver::new(gbuffer, params, subsample);
    let (w, h) = resolver.output_extent();
    if w == 0 || h == 0 {
        return Err(ResolveError::extent(format!(
            "G-buffer {}x{} is smaller than one {}x{} block",
            gbuffer.width(), gbuffer.height(), subsample, subsample
        )));
    }
    let mut target = RenderTarget::new(w, h);
    let stats = resolver.dispatch(mode, work_group, &mut target)?;
    Ok((target, stats))
}
