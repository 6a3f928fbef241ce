//! # Stamen Graphics
//!
//! Retained-mode graphics device state tracking over a native 3D context.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`GraphicsDevice`] - Authoritative pipeline state with redundant-call elimination
//! - [`NativeContext`] - Trait for native context implementations
//! - [`Effect`] - Compiled effect object model whose passes replay state onto the device
//! - [`DummyBackend`] - Recording context for testing
//!
//! ## Example
//!
//! ```ignore
//! use stamen_graphics::{DummyBackend, GraphicsDevice, PresentationParameters};
//!
//! let mut device = GraphicsDevice::new(DummyBackend::new(), PresentationParameters::new(1280, 720));
//! let effect = device.create_effect(&bytes)?;
//! effect.current_technique().passes()[0].apply(&mut device)?;
//! device.draw_primitives(PrimitiveType::TriangleList, 0, 2)?;
//! device.present()?;
//! ```

pub mod backend;
pub mod device;
pub mod effect;
pub mod error;
pub mod resources;
pub mod types;

// Re-export main types for convenience
pub use backend::NativeContext;
#[cfg(feature = "dummy")]
pub use backend::{DummyBackend, NativeCall};
pub use device::{
    DeviceCapabilities, GraphicsDevice, PipelineSnapshot, RenderTargetBinding, VertexBufferBinding,
};
pub use effect::{
    Effect, EffectAnnotation, EffectParameter, EffectPass, EffectTechnique, ParameterClass,
    ParameterType,
};
pub use error::{ErrorKind, GraphicsError, GraphicsResult};
pub use resources::{GraphicsResource, IndexBuffer, Texture, VertexBuffer};
pub use types::{
    BufferUsage, ClearOptions, CubeMapFace, DepthFormat, IndexElementSize, PresentationParameters,
    PrimitiveType, Rectangle, RenderTargetUsage, SurfaceFormat, TextureDescriptor, Viewport,
};

pub use stamen_core;

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the graphics subsystem.
///
/// This should be called before using any graphics functionality.
pub fn init() {
    log::info!("Stamen Graphics v{} initialized", VERSION);
}
