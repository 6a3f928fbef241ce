//! # Stamen Core
//!
//! Backend-agnostic pipeline state value types shared by the device state
//! synchronizer and the effect translator.
//!
//! - [`state`] - blend, depth-stencil and rasterizer aggregates
//! - [`sampler`] - sampler state and texture filters
//! - [`color`] - packed RGBA color

pub mod color;
pub mod sampler;
pub mod state;

pub use color::Color;
pub use sampler::{FilterAxes, FilterAxis, SamplerState, TextureAddressMode, TextureFilter};
pub use state::{
    Blend, BlendFunction, BlendState, ColorWriteChannels, CompareFunction, CullMode,
    DepthStencilState, FillMode, RasterizerState, StencilOperation,
};

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
