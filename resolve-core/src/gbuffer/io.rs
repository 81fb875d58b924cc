//! `.gbuf` container: a 16-byte header followed by the four RGBA32F planes.
//!
//! Layout (little-endian): magic `GBUF`, version, width, height, then position,
//! normal, diffuse and specular planes, row-major, four f32 per texel.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use bytemuck::{Pod, Zeroable};
use log::debug;

use super::GBuffer;
use crate::error::{ResolveError, ResolveResult};

pub const MAGIC: [u8; 4] = *b"GBUF";
pub const VERSION: u32 = 1;

const TEXEL_BYTES: u64 = 16;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct Header {
    magic: [u8; 4],
    version: u32,
    width: u32,
    height: u32,
}

pub fn write_to<W: Write>(g: &GBuffer, mut w: W) -> ResolveResult<()> {
    let header = Header {
        magic: MAGIC,
        version: VERSION.to_le(),
        width: g.width().to_le(),
        height: g.height().to_le(),
    };
    w.write_all(bytemuck::bytes_of(&header))?;
    for plane in g.planes() {
        if cfg!(target_endian = "little") {
            w.write_all(bytemuck::cast_slice(plane))?;
        } else {
            for v in plane.iter().flatten() {
                w.write_all(&v.to_le_bytes())?;
            }
        }
    }
    w.flush()?;
    Ok(())
}

pub fn read_from<R: Read>(mut r: R) -> ResolveResult<GBuffer> {
    let mut raw = [0u8; std::mem::size_of::<Header>()];
    r.read_exact(&mut raw)
        .map_err(|e| ResolveError::gbuffer_file(format!("header: {}", e)))?;
    let header: Header = bytemuck::pod_read_unaligned(&raw);
    if header.magic != MAGIC {
        return Err(ResolveError::gbuffer_file(format!("bad magic {:?}", header.magic)));
    }
    let version = u32::from_le(header.version);
    if version != VERSION {
        return Err(ResolveError::gbuffer_file(format!("unsupported version {}", version)));
    }
    let (width, height) = (u32::from_le(header.width), u32::from_le(header.height));
    let plane_bytes = (width as u64)
        .checked_mul(height as u64)
        .and_then(|n| n.checked_mul(TEXEL_BYTES))
        .filter(|&n| usize::try_from(n).is_ok())
        .ok_or_else(|| {
            ResolveError::gbuffer_file(format!("extent {}x{} overflows", width, height))
        })?;

    // Grows with the data actually present, so a lying header cannot force a
    // plane-sized allocation before the truncation is noticed.
    let mut read_plane = |name: &str| -> ResolveResult<Vec<[f32; 4]>> {
        let mut bytes = Vec::new();
        r.by_ref().take(plane_bytes).read_to_end(&mut bytes)?;
        if bytes.len() as u64 != plane_bytes {
            return Err(ResolveError::gbuffer_file(format!(
                "{} plane truncated: {} of {} bytes",
                name,
                bytes.len(),
                plane_bytes
            )));
        }
        let mut plane: Vec<[f32; 4]> = bytemuck::pod_collect_to_vec(&bytes);
        if cfg!(target_endian = "big") {
            for v in plane.iter_mut().flatten() {
                *v = f32::from_bits(u32::from_le(v.to_bits()));
            }
        }
        Ok(plane)
    };
    let position = read_plane("position")?;
    let normal = read_plane("normal")?;
    let diffuse = read_plane("diffuse")?;
    let specular = read_plane("specular")?;
    debug!("read G-buffer {}x{}", width, height);
    GBuffer::from_planes(width, height, position, normal, diffuse, specular)
}

pub fn save<P: AsRef<Path>>(g: &GBuffer, path: P) -> ResolveResult<()> {
    let f = File::create(path)?;
    write_to(g, BufWriter::new(f))
}

pub fn load<P: AsRef<Path>>(path: P) -> ResolveResult<GBuffer> {
    let f = File::open(path)?;
    read_from(BufReader::new(f))
}
