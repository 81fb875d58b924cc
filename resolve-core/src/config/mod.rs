pub mod schema;

use log::debug;
use schema::ResolveConfig;

use crate::error::{ResolveError, ResolveResult};

pub use schema::{AaMode, CameraConfig, LightConfig};

pub fn load_from_yaml_str(s: &str) -> ResolveResult<ResolveConfig> {
    let cfg: ResolveConfig = serde_yaml::from_str(s)?;
    validate(&cfg)?;
    debug!(
        "loaded resolve config: mode={} subsample={} work_group={}x{}",
        cfg.mode, cfg.subsample, cfg.work_group[0], cfg.work_group[1]
    );
    Ok(cfg)
}

pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> ResolveResult<ResolveConfig> {
    let data = std::fs::read_to_string(path)?;
    load_from_yaml_str(&data)
}

pub fn validate(cfg: &ResolveConfig) -> ResolveResult<()> {
    let [wx, wy] = cfg.work_group;
    if wx == 0 || wy == 0 {
        return Err(ResolveError::InvalidWorkGroup(wx, wy));
    }
    Ok(())
}
