pub mod dispatch;
pub mod resolve;
pub mod scene;
pub mod shading;
pub mod target;

pub use dispatch::{resolve_image, DispatchStats, PixelResolve, Resolver, DEFAULT_WORK_GROUP};
pub use shading::{shade, LightCamera};
pub use target::RenderTarget;

pub fn describe() -> &'static str {
    "Deferred resolve: shade G-buffer texels, box-filter blocks, supersample only depth edges"
}
