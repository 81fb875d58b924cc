use std::num::NonZeroU32;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use resolve_core::config::{self, schema::ResolveConfig, AaMode};
use resolve_core::export::FrameMeta;
use resolve_core::gbuffer::{self, GBuffer};
use resolve_core::render::scene::SyntheticScene;
use resolve_core::render::{self, resolve_image, LightCamera, RenderTarget};
use resolve_core::VERSION;

#[derive(Parser, Debug)]
#[command(name = "resolve", version = VERSION, about = "Deferred-shading antialiasing resolve")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

/// Overrides applied on top of the YAML config.
#[derive(Args, Debug)]
struct ResolveArgs {
    /// Resolve config YAML; defaults are used when omitted
    #[arg(long)]
    config: Option<String>,
    /// none | ssaa | msaa, or the enumerant 0 | 1 | 2
    #[arg(long)]
    mode: Option<AaMode>,
    #[arg(long)]
    subsample: Option<NonZeroU32>,
}

impl ResolveArgs {
    fn load(&self) -> Result<ResolveConfig> {
        let mut cfg = match &self.config {
            Some(path) => {
                config::load_from_path(path).with_context(|| format!("loading config {}", path))?
            }
            None => ResolveConfig::default(),
        };
        if let Some(mode) = self.mode { cfg.mode = mode; }
        if let Some(s) = self.subsample { cfg.subsample = s; }
        Ok(cfg)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a resolve config with defaults filled in
    Inspect { path: Option<String> },
    /// Resolve a .gbuf file into a PNG
    Render {
        #[arg(long)]
        gbuffer: String,
        #[command(flatten)]
        resolve: ResolveArgs,
        #[arg(long, default_value = "out.png")]
        out: String,
        /// Also write frame metadata as JSON
        #[arg(long)]
        meta: Option<String>,
    },
    /// Ray-cast the built-in scene into a .gbuf at width*subsample x height*subsample
    Synth {
        #[arg(long, default_value_t = 640)]
        width: u32,
        #[arg(long, default_value_t = 360)]
        height: u32,
        #[command(flatten)]
        resolve: ResolveArgs,
        #[arg(long, default_value = "scene.gbuf")]
        out: String,
    },
    /// Synthesize and resolve the built-in scene in one step
    Demo {
        #[arg(long, default_value_t = 640)]
        width: u32,
        #[arg(long, default_value_t = 360)]
        height: u32,
        #[command(flatten)]
        resolve: ResolveArgs,
        #[arg(long, default_value = "demo.png")]
        out: String,
        #[arg(long)]
        meta: Option<String>,
    },
}

/// G-buffer extent for an output of `width x height` at subsample `s`.
fn gbuffer_extent(width: u32, height: u32, s: NonZeroU32) -> Result<(u32, u32)> {
    let s = s.get();
    match (width.checked_mul(s), height.checked_mul(s)) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(anyhow!("{}x{} at subsample {} overflows the G-buffer extent", width, height, s)),
    }
}

fn synthesize(cfg: &ResolveConfig, width: u32, height: u32) -> Result<GBuffer> {
    let (w, h) = gbuffer_extent(width, height, cfg.subsample)?;
    Ok(SyntheticScene::default_scene().rasterize(&cfg.camera, w, h))
}

fn resolve_and_write(
    g: &GBuffer,
    cfg: &ResolveConfig,
    out: &str,
    meta: Option<&str>,
) -> Result<()> {
    let params = LightCamera::from_config(cfg);
    let (target, stats) = resolve_image(g, &params, cfg.mode, cfg.subsample, cfg.work_group)?;
    write_png(&target, out)?;
    println!("Wrote {}x{} image to {}", target.width(), target.height(), out);

    let frame = FrameMeta {
        width: target.width(),
        height: target.height(),
        mode: cfg.mode,
        subsample: cfg.subsample.get(),
        stats,
    };
    println!(
        "  mode={} subsample={} edge pixels={} ({:.1}%) shading evaluations={}",
        frame.mode,
        frame.subsample,
        stats.edge_pixels,
        frame.edge_ratio() * 100.0,
        stats.shading_evaluations
    );
    if let Some(path) = meta {
        frame.write_meta(path).with_context(|| format!("writing metadata {}", path))?;
        println!("Wrote metadata to {}", path);
    }
    Ok(())
}

fn write_png(target: &RenderTarget, out: &str) -> Result<()> {
    let img = image::RgbaImage::from_raw(target.width(), target.height(), target.to_rgba8())
        .ok_or_else(|| anyhow!("Failed to create image from raw"))?;
    img.save(out).with_context(|| format!("saving {}", out))?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .write_style(env_logger::WriteStyle::Auto)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Inspect { path } => {
            let cfg = match path {
                Some(p) => {
                    config::load_from_path(&p).with_context(|| format!("loading config {}", p))?
                }
                None => ResolveConfig::default(),
            };
            println!("{}", render::describe());
            println!("  mode: {}", cfg.mode);
            println!("  subsample: {}", cfg.subsample);
            println!("  work group: {}x{}", cfg.work_group[0], cfg.work_group[1]);
            let cam = &cfg.camera;
            println!(
                "  camera: eye={:?} target={:?} fov={:.1}° clip=[{}, {}]",
                cam.eye, cam.target, cam.fov_deg, cam.near, cam.far
            );
            println!("  light: {:?}", cfg.light.position);
        }
        Command::Render { gbuffer: path, resolve, out, meta } => {
            let cfg = resolve.load()?;
            let g = gbuffer::io::load(&path)
                .with_context(|| format!("loading G-buffer {}", path))?;
            info!("loaded {} ({}x{})", path, g.width(), g.height());
            resolve_and_write(&g, &cfg, &out, meta.as_deref())?;
        }
        Command::Synth { width, height, resolve, out } => {
            let cfg = resolve.load()?;
            let g = synthesize(&cfg, width, height)?;
            gbuffer::io::save(&g, &out).with_context(|| format!("writing G-buffer {}", out))?;
            println!("Wrote {}x{} G-buffer to {}", g.width(), g.height(), out);
        }
        Command::Demo { width, height, resolve, out, meta } => {
            let cfg = resolve.load()?;
            let g = synthesize(&cfg, width, height)?;
            resolve_and_write(&g, &cfg, &out, meta.as_deref())?;
        }
    }
    Ok(())
}
