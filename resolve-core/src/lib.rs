pub mod config;
pub mod error;
pub mod export;
pub mod gbuffer;
pub mod render;

pub use error::{ResolveError, ResolveResult};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
