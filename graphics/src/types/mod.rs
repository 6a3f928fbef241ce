//! Common types and descriptors for graphics resources.
//!
//! This module contains format enums, usage flags, and descriptor structs
//! used throughout the graphics system.

mod buffer;
mod common;
mod presentation;
mod texture;

pub use buffer::{BufferDescriptor, BufferUsage};
pub use common::{ClearOptions, IndexElementSize, PrimitiveType, Rectangle, Viewport};
pub use presentation::PresentationParameters;
pub use texture::{
    calculate_mip_levels, CubeMapFace, DepthFormat, RenderTargetDescriptor, RenderTargetUsage,
    SurfaceFormat, TextureDescriptor, TextureKind,
};
