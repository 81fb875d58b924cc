//! Frame metadata written next to resolved images.

use std::path::Path;

use crate::config::AaMode;
use crate::error::ResolveResult;
use crate::render::DispatchStats;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameMeta {
    pub width: u32,
    pub height: u32,
    pub mode: AaMode,
    pub subsample: u32,
    pub stats: DispatchStats,
}

impl FrameMeta {
    /// Fraction of pixels that took the full supersampling path.
    pub fn edge_ratio(&self) -> f64 {
        if self.stats.pixels == 0 {
            return 0.0;
        }
        self.stats.edge_pixels as f64 / self.stats.pixels as f64
    }

    pub fn to_json(&self) -> ResolveResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_meta<P: AsRef<Path>>(&self, path: P) -> ResolveResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
