//! Error type shared by every fallible operation in the resolve core.

/// Centralized error type for configuration, G-buffer I/O and dispatch setup.
#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    #[error("invalid extent: {0}")]
    InvalidExtent(String),

    #[error("render target {target_w}x{target_h} exceeds resolvable area {max_w}x{max_h}")]
    TargetTooLarge { target_w: u32, target_h: u32, max_w: u32, max_h: u32 },

    #[error("work group must be non-zero, got {0}x{1}")]
    InvalidWorkGroup(u32, u32),

    #[error("unknown antialiasing mode: {0}")]
    UnknownMode(String),

    #[error("bad G-buffer file: {0}")]
    BadGBufferFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ResolveError {
    pub fn extent<T: ToString>(msg: T) -> Self {
        ResolveError::InvalidExtent(msg.to_string())
    }

    pub fn gbuffer_file<T: ToString>(msg: T) -> Self {
        ResolveError::BadGBufferFile(msg.to_string())
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;
