//! Blend, depth-stencil and rasterizer state aggregates.
//!
//! Each aggregate is a plain value object. Two states are "the same" when all
//! of their fields compare equal; the device uses that to skip redundant
//! native state changes.

mod blend;
mod depth_stencil;
mod rasterizer;

pub use blend::{Blend, BlendFunction, BlendState, ColorWriteChannels};
pub use depth_stencil::{CompareFunction, DepthStencilState, StencilOperation};
pub use rasterizer::{CullMode, FillMode, RasterizerState};
