//! Native context abstraction layer.
//!
//! The device and effect layers never talk to a graphics API directly. Every
//! native operation they need goes through the [`NativeContext`] trait, which a
//! backend implements once.
//!
//! # Available Backends
//!
//! - `dummy` (default): records every call; used by tests and benchmarks
//!
//! # Contract
//!
//! State setters are fire-and-forget: the device has already removed redundant
//! calls, so a backend applies whatever it is given. Viewport and scissor
//! values arrive in native orientation (already flipped when rendering to the
//! backbuffer). Operations that can fail return [`GraphicsResult`].

#[cfg(feature = "dummy")]
pub mod dummy;

use glam::Vec4;
use stamen_core::{BlendState, DepthStencilState, RasterizerState, SamplerState};

use crate::device::DeviceCapabilities;
use crate::effect::descriptor::{EffectDescriptor, StateChanges};
use crate::error::GraphicsResult;
use crate::types::{
    BufferDescriptor, ClearOptions, CubeMapFace, DepthFormat, IndexElementSize,
    PresentationParameters, PrimitiveType, Rectangle, TextureDescriptor, Viewport,
};

#[cfg(feature = "dummy")]
pub use dummy::{DummyBackend, NativeCall};

macro_rules! native_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub(crate) u64);

        impl $name {
            /// Wrap a backend-specific handle value.
            pub fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            /// The backend-specific handle value.
            pub fn raw(self) -> u64 {
                self.0
            }
        }
    };
}

native_handle!(
    /// Handle to a native texture.
    TextureHandle
);
native_handle!(
    /// Handle to a native vertex or index buffer.
    BufferHandle
);
native_handle!(
    /// Handle to a native compiled effect.
    EffectHandle
);
native_handle!(
    /// Slot of a technique inside a compiled effect's descriptor.
    TechniqueHandle
);

/// A render target as seen by the native layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeRenderTarget {
    pub texture: TextureHandle,
    pub face: Option<CubeMapFace>,
}

/// A vertex stream as seen by the native layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeVertexBinding {
    pub buffer: BufferHandle,
    pub vertex_stride: u32,
    pub vertex_offset: i32,
    pub instance_frequency: i32,
}

/// Result of loading an effect blob.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeEffect {
    pub handle: EffectHandle,
    pub descriptor: EffectDescriptor,
}

/// Every native operation consumed by the device and effect layers.
///
/// The trait is object safe so resources can release themselves through a
/// `&mut dyn NativeContext` without knowing the concrete backend.
pub trait NativeContext {
    /// Backend name, for logging.
    fn name(&self) -> &'static str;

    /// Report what the context supports.
    fn capabilities(&self) -> DeviceCapabilities;

    // ------------------------------------------------------------------
    // Pipeline state
    // ------------------------------------------------------------------

    fn set_blend_state(&mut self, state: &BlendState);

    fn set_depth_stencil_state(&mut self, state: &DepthStencilState);

    /// Apply rasterizer state. Winding and scissor rules depend on whether an
    /// offscreen target is bound.
    fn apply_rasterizer_state(&mut self, state: &RasterizerState, render_target_bound: bool);

    fn set_viewport(&mut self, viewport: &Viewport);

    fn set_scissor_rect(&mut self, rect: &Rectangle);

    /// Check that the sampler bound at `slot` can sample `texture` and apply both.
    fn verify_sampler(&mut self, slot: usize, texture: Option<TextureHandle>, sampler: &SamplerState);

    // ------------------------------------------------------------------
    // Targets
    // ------------------------------------------------------------------

    /// Bind offscreen targets. An empty slice rebinds the backbuffer.
    fn set_render_targets(&mut self, targets: &[NativeRenderTarget], depth_format: DepthFormat);

    fn generate_target_mipmaps(&mut self, texture: TextureHandle);

    fn clear(&mut self, options: ClearOptions, color: Vec4, depth: f32, stencil: i32);

    /// Resize the backbuffer after a device reset.
    fn reset_backbuffer(&mut self, presentation: &PresentationParameters, render_target_bound: bool);

    fn present(&mut self);

    /// Read the backbuffer as tightly packed RGBA8 rows, bottom row first.
    fn read_backbuffer(&mut self, data: &mut [u8], width: i32, height: i32) -> GraphicsResult<()>;

    // ------------------------------------------------------------------
    // Geometry and draws
    // ------------------------------------------------------------------

    fn bind_index_buffer(&mut self, buffer: BufferHandle, element_size: IndexElementSize);

    /// Wire vertex attributes. `bindings_changed` is false when the bindings
    /// are the same as for the previous draw.
    fn apply_vertex_attributes(
        &mut self,
        bindings: &[NativeVertexBinding],
        bindings_changed: bool,
        base_vertex: i32,
    );

    fn draw_indexed_primitives(
        &mut self,
        primitive_type: PrimitiveType,
        start_index: u32,
        index_count: u32,
        element_size: IndexElementSize,
    );

    fn draw_instanced_primitives(
        &mut self,
        primitive_type: PrimitiveType,
        start_index: u32,
        index_count: u32,
        element_size: IndexElementSize,
        instance_count: u32,
    );

    fn draw_primitives(&mut self, primitive_type: PrimitiveType, vertex_start: u32, vertex_count: u32);

    // ------------------------------------------------------------------
    // Resources
    // ------------------------------------------------------------------

    fn create_texture(&mut self, descriptor: &TextureDescriptor) -> GraphicsResult<TextureHandle>;

    fn delete_texture(&mut self, texture: TextureHandle);

    fn set_texture_data(
        &mut self,
        texture: TextureHandle,
        level: u32,
        rect: Rectangle,
        data: &[u8],
    ) -> GraphicsResult<()>;

    fn get_texture_data(
        &mut self,
        texture: TextureHandle,
        level: u32,
        rect: Rectangle,
        data: &mut [u8],
    ) -> GraphicsResult<()>;

    fn create_buffer(&mut self, descriptor: &BufferDescriptor) -> GraphicsResult<BufferHandle>;

    fn delete_buffer(&mut self, buffer: BufferHandle);

    fn set_buffer_data(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) -> GraphicsResult<()>;

    // ------------------------------------------------------------------
    // Effects
    // ------------------------------------------------------------------

    /// Hand a compiled effect blob to the effect compiler.
    fn create_effect(&mut self, code: &[u8]) -> GraphicsResult<NativeEffect>;

    fn delete_effect(&mut self, effect: EffectHandle);

    fn set_effect_technique(&mut self, effect: EffectHandle, technique: TechniqueHandle);

    /// Apply pass `pass` of the effect's current technique and report the
    /// state it changed.
    fn apply_effect(&mut self, effect: EffectHandle, pass: usize) -> GraphicsResult<StateChanges>;

    /// Release the context. Called once, after every resource is disposed.
    fn dispose(&mut self);
}
