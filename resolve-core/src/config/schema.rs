use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

pub const DEFAULT_SUBSAMPLE: NonZeroU32 = match NonZeroU32::new(2) {
    Some(s) => s,
    None => panic!("default subsample must be non-zero"),
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    pub mode: AaMode,
    pub subsample: NonZeroU32,
    pub work_group: [u32; 2],
    pub camera: CameraConfig,
    pub light: LightConfig,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            mode: AaMode::None,
            subsample: DEFAULT_SUBSAMPLE,
            work_group: [32, 32],
            camera: CameraConfig::default(),
            light: LightConfig::default(),
        }
    }
}

/// Antialiasing policy applied uniformly to every pixel of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "ModeValue")]
pub enum AaMode {
    None,
    Supersample,
    AdaptiveMultisample,
}

/// Accepts either the integer enumerant or a name in config files.
#[derive(Deserialize)]
#[serde(untagged)]
enum ModeValue {
    Index(i32),
    Name(String),
}

impl TryFrom<ModeValue> for AaMode {
    type Error = ResolveError;

    fn try_from(value: ModeValue) -> Result<Self, Self::Error> {
        match value {
            ModeValue::Index(n) => AaMode::try_from(n),
            ModeValue::Name(s) => s.parse(),
        }
    }
}

impl AaMode {
    pub const ALL: [AaMode; 3] = [AaMode::None, AaMode::Supersample, AaMode::AdaptiveMultisample];

    pub fn as_str(self) -> &'static str {
        match self {
            AaMode::None => "none",
            AaMode::Supersample => "supersample",
            AaMode::AdaptiveMultisample => "adaptive_multisample",
        }
    }
}

impl fmt::Display for AaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// 0 = none, 1 = ssaa, 2 = msaa; anything else is rejected here so a dispatch
// never sees an unrecognized mode.
impl TryFrom<i32> for AaMode {
    type Error = ResolveError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AaMode::None),
            1 => Ok(AaMode::Supersample),
            2 => Ok(AaMode::AdaptiveMultisample),
            other => Err(ResolveError::UnknownMode(other.to_string())),
        }
    }
}

impl FromStr for AaMode {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<i32>() {
            return AaMode::try_from(n);
        }
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(AaMode::None),
            "supersample" | "ssaa" => Ok(AaMode::Supersample),
            "adaptive_multisample" | "adaptive" | "msaa" => Ok(AaMode::AdaptiveMultisample),
            _ => Err(ResolveError::UnknownMode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: [f32; 3],
    pub target: [f32; 3],
    pub up: [f32; 3],
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [0.0, 15.0, 55.0],
            target: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            fov_deg: 30.0,
            near: 1.0,
            far: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub position: [f32; 3],
}

impl Default for LightConfig {
    fn default() -> Self {
        Self { position: [0.0, 10.0, 0.0] }
    }
}
