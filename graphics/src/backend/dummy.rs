//! Dummy native context for testing and development.
//!
//! This backend doesn't perform actual GPU operations. It records every call
//! it receives so tests can assert on exactly what the device issued, and it
//! serves effect descriptors and pass state changes registered up front.

use std::collections::HashMap;

use glam::Vec4;
use stamen_core::{BlendState, DepthStencilState, RasterizerState, SamplerState};

use crate::device::DeviceCapabilities;
use crate::effect::descriptor::{EffectDescriptor, StateChanges};
use crate::error::{GraphicsError, GraphicsResult};
use crate::types::{
    BufferDescriptor, ClearOptions, DepthFormat, IndexElementSize, PresentationParameters,
    PrimitiveType, Rectangle, TextureDescriptor, Viewport,
};

use super::{
    BufferHandle, EffectHandle, NativeContext, NativeEffect, NativeRenderTarget,
    NativeVertexBinding, TechniqueHandle, TextureHandle,
};

/// One recorded native call.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeCall {
    SetBlendState(BlendState),
    SetDepthStencilState(DepthStencilState),
    ApplyRasterizerState {
        state: RasterizerState,
        render_target_bound: bool,
    },
    SetViewport(Viewport),
    SetScissorRect(Rectangle),
    VerifySampler {
        slot: usize,
        texture: Option<TextureHandle>,
        sampler: SamplerState,
    },
    SetRenderTargets {
        targets: Vec<NativeRenderTarget>,
        depth_format: DepthFormat,
    },
    GenerateTargetMipmaps(TextureHandle),
    Clear {
        options: ClearOptions,
        color: Vec4,
        depth: f32,
        stencil: i32,
    },
    ResetBackbuffer {
        width: i32,
        height: i32,
        render_target_bound: bool,
    },
    Present,
    ReadBackbuffer {
        width: i32,
        height: i32,
    },
    BindIndexBuffer(BufferHandle),
    ApplyVertexAttributes {
        bindings: Vec<NativeVertexBinding>,
        bindings_changed: bool,
        base_vertex: i32,
    },
    DrawIndexedPrimitives {
        primitive_type: PrimitiveType,
        start_index: u32,
        index_count: u32,
    },
    DrawInstancedPrimitives {
        primitive_type: PrimitiveType,
        start_index: u32,
        index_count: u32,
        instance_count: u32,
    },
    DrawPrimitives {
        primitive_type: PrimitiveType,
        vertex_start: u32,
        vertex_count: u32,
    },
    CreateTexture(TextureHandle),
    DeleteTexture(TextureHandle),
    SetTextureData {
        texture: TextureHandle,
        level: u32,
        rect: Rectangle,
    },
    GetTextureData {
        texture: TextureHandle,
        level: u32,
        rect: Rectangle,
    },
    CreateBuffer(BufferHandle),
    DeleteBuffer(BufferHandle),
    SetBufferData {
        buffer: BufferHandle,
        offset: u64,
        len: usize,
    },
    CreateEffect(EffectHandle),
    DeleteEffect(EffectHandle),
    SetEffectTechnique {
        effect: EffectHandle,
        technique: TechniqueHandle,
    },
    ApplyEffect {
        effect: EffectHandle,
        pass: usize,
    },
    Dispose,
}

impl NativeCall {
    /// Returns true for calls issued by a draw.
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            Self::DrawIndexedPrimitives { .. }
                | Self::DrawInstancedPrimitives { .. }
                | Self::DrawPrimitives { .. }
        )
    }
}

#[derive(Debug, Clone)]
struct RegisteredEffect {
    descriptor: EffectDescriptor,
    // Keyed by (technique slot, pass index).
    pass_changes: HashMap<(u64, usize), StateChanges>,
}

#[derive(Debug)]
struct LoadedEffect {
    code: Vec<u8>,
    technique: Option<TechniqueHandle>,
}

/// Dummy native context.
#[derive(Debug)]
pub struct DummyBackend {
    capabilities: DeviceCapabilities,
    calls: Vec<NativeCall>,
    next_handle: u64,
    effects: HashMap<Vec<u8>, RegisteredEffect>,
    loaded_effects: HashMap<EffectHandle, LoadedEffect>,
    texture_data: HashMap<(TextureHandle, u32), Vec<u8>>,
    backbuffer: Vec<u8>,
    disposed: bool,
}

impl DummyBackend {
    /// Create a new dummy backend.
    pub fn new() -> Self {
        Self {
            capabilities: DeviceCapabilities::default(),
            calls: Vec::new(),
            next_handle: 1,
            effects: HashMap::new(),
            loaded_effects: HashMap::new(),
            texture_data: HashMap::new(),
            backbuffer: Vec::new(),
            disposed: false,
        }
    }

    /// Report the given capabilities instead of the defaults.
    pub fn with_capabilities(mut self, capabilities: DeviceCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Serve `descriptor` when `code` is loaded as an effect.
    pub fn register_effect(&mut self, code: impl Into<Vec<u8>>, descriptor: EffectDescriptor) {
        self.effects.insert(
            code.into(),
            RegisteredEffect {
                descriptor,
                pass_changes: HashMap::new(),
            },
        );
    }

    /// Report `changes` when `pass` of technique slot `technique` is applied
    /// for the effect loaded from `code`.
    pub fn set_pass_state_changes(
        &mut self,
        code: &[u8],
        technique: u64,
        pass: usize,
        changes: StateChanges,
    ) {
        if let Some(effect) = self.effects.get_mut(code) {
            effect.pass_changes.insert((technique, pass), changes);
        }
    }

    /// Contents returned by backbuffer reads, bottom row first.
    pub fn set_backbuffer_contents(&mut self, pixels: Vec<u8>) {
        self.backbuffer = pixels;
    }

    /// Every call recorded so far.
    pub fn calls(&self) -> &[NativeCall] {
        &self.calls
    }

    /// Take the recorded calls, leaving the log empty.
    pub fn take_calls(&mut self) -> Vec<NativeCall> {
        std::mem::take(&mut self.calls)
    }

    /// Forget recorded calls.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of recorded calls matching `predicate`.
    pub fn count_calls(&self, predicate: impl Fn(&NativeCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    /// Whether [`NativeContext::dispose`] has been called.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn allocate_handle(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    fn record(&mut self, call: NativeCall) {
        log::trace!("DummyBackend: {:?}", call);
        self.calls.push(call);
    }
}

impl Default for DummyBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeContext for DummyBackend {
    fn name(&self) -> &'static str {
        "Dummy"
    }

    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    fn set_blend_state(&mut self, state: &BlendState) {
        self.record(NativeCall::SetBlendState(state.clone()));
    }

    fn set_depth_stencil_state(&mut self, state: &DepthStencilState) {
        self.record(NativeCall::SetDepthStencilState(state.clone()));
    }

    fn apply_rasterizer_state(&mut self, state: &RasterizerState, render_target_bound: bool) {
        self.record(NativeCall::ApplyRasterizerState {
            state: state.clone(),
            render_target_bound,
        });
    }

    fn set_viewport(&mut self, viewport: &Viewport) {
        self.record(NativeCall::SetViewport(*viewport));
    }

    fn set_scissor_rect(&mut self, rect: &Rectangle) {
        self.record(NativeCall::SetScissorRect(*rect));
    }

    fn verify_sampler(&mut self, slot: usize, texture: Option<TextureHandle>, sampler: &SamplerState) {
        self.record(NativeCall::VerifySampler {
            slot,
            texture,
            sampler: sampler.clone(),
        });
    }

    fn set_render_targets(&mut self, targets: &[NativeRenderTarget], depth_format: DepthFormat) {
        self.record(NativeCall::SetRenderTargets {
            targets: targets.to_vec(),
            depth_format,
        });
    }

    fn generate_target_mipmaps(&mut self, texture: TextureHandle) {
        self.record(NativeCall::GenerateTargetMipmaps(texture));
    }

    fn clear(&mut self, options: ClearOptions, color: Vec4, depth: f32, stencil: i32) {
        self.record(NativeCall::Clear {
            options,
            color,
            depth,
            stencil,
        });
    }

    fn reset_backbuffer(&mut self, presentation: &PresentationParameters, render_target_bound: bool) {
        self.record(NativeCall::ResetBackbuffer {
            width: presentation.back_buffer_width,
            height: presentation.back_buffer_height,
            render_target_bound,
        });
    }

    fn present(&mut self) {
        self.record(NativeCall::Present);
    }

    fn read_backbuffer(&mut self, data: &mut [u8], width: i32, height: i32) -> GraphicsResult<()> {
        self.record(NativeCall::ReadBackbuffer { width, height });
        let len = data.len().min(self.backbuffer.len());
        data[..len].copy_from_slice(&self.backbuffer[..len]);
        data[len..].fill(0);
        Ok(())
    }

    fn bind_index_buffer(&mut self, buffer: BufferHandle, _element_size: IndexElementSize) {
        self.record(NativeCall::BindIndexBuffer(buffer));
    }

    fn apply_vertex_attributes(
        &mut self,
        bindings: &[NativeVertexBinding],
        bindings_changed: bool,
        base_vertex: i32,
    ) {
        self.record(NativeCall::ApplyVertexAttributes {
            bindings: bindings.to_vec(),
            bindings_changed,
            base_vertex,
        });
    }

    fn draw_indexed_primitives(
        &mut self,
        primitive_type: PrimitiveType,
        start_index: u32,
        index_count: u32,
        _element_size: IndexElementSize,
    ) {
        self.record(NativeCall::DrawIndexedPrimitives {
            primitive_type,
            start_index,
            index_count,
        });
    }

    fn draw_instanced_primitives(
        &mut self,
        primitive_type: PrimitiveType,
        start_index: u32,
        index_count: u32,
        _element_size: IndexElementSize,
        instance_count: u32,
    ) {
        self.record(NativeCall::DrawInstancedPrimitives {
            primitive_type,
            start_index,
            index_count,
            instance_count,
        });
    }

    fn draw_primitives(&mut self, primitive_type: PrimitiveType, vertex_start: u32, vertex_count: u32) {
        self.record(NativeCall::DrawPrimitives {
            primitive_type,
            vertex_start,
            vertex_count,
        });
    }

    fn create_texture(&mut self, descriptor: &TextureDescriptor) -> GraphicsResult<TextureHandle> {
        let handle = TextureHandle(self.allocate_handle());
        log::trace!(
            "DummyBackend: creating texture {:?} ({}x{}, {} levels)",
            descriptor.label,
            descriptor.width(),
            descriptor.height(),
            descriptor.level_count()
        );
        self.record(NativeCall::CreateTexture(handle));
        Ok(handle)
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        self.texture_data.retain(|(handle, _), _| *handle != texture);
        self.record(NativeCall::DeleteTexture(texture));
    }

    fn set_texture_data(
        &mut self,
        texture: TextureHandle,
        level: u32,
        rect: Rectangle,
        data: &[u8],
    ) -> GraphicsResult<()> {
        self.texture_data.insert((texture, level), data.to_vec());
        self.record(NativeCall::SetTextureData {
            texture,
            level,
            rect,
        });
        Ok(())
    }

    fn get_texture_data(
        &mut self,
        texture: TextureHandle,
        level: u32,
        rect: Rectangle,
        data: &mut [u8],
    ) -> GraphicsResult<()> {
        let stored = self
            .texture_data
            .get(&(texture, level))
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let len = data.len().min(stored.len());
        data[..len].copy_from_slice(&stored[..len]);
        data[len..].fill(0);
        self.record(NativeCall::GetTextureData {
            texture,
            level,
            rect,
        });
        Ok(())
    }

    fn create_buffer(&mut self, descriptor: &BufferDescriptor) -> GraphicsResult<BufferHandle> {
        let handle = BufferHandle(self.allocate_handle());
        log::trace!(
            "DummyBackend: creating buffer {:?} (size: {})",
            descriptor.label,
            descriptor.size
        );
        self.record(NativeCall::CreateBuffer(handle));
        Ok(handle)
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        self.record(NativeCall::DeleteBuffer(buffer));
    }

    fn set_buffer_data(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) -> GraphicsResult<()> {
        self.record(NativeCall::SetBufferData {
            buffer,
            offset,
            len: data.len(),
        });
        Ok(())
    }

    fn create_effect(&mut self, code: &[u8]) -> GraphicsResult<NativeEffect> {
        let descriptor = self
            .effects
            .get(code)
            .map(|effect| effect.descriptor.clone())
            .ok_or_else(|| {
                GraphicsError::Backend(format!("no effect registered for {} byte blob", code.len()))
            })?;
        let handle = EffectHandle(self.allocate_handle());
        self.loaded_effects.insert(
            handle,
            LoadedEffect {
                code: code.to_vec(),
                technique: None,
            },
        );
        self.record(NativeCall::CreateEffect(handle));
        Ok(NativeEffect { handle, descriptor })
    }

    fn delete_effect(&mut self, effect: EffectHandle) {
        self.loaded_effects.remove(&effect);
        self.record(NativeCall::DeleteEffect(effect));
    }

    fn set_effect_technique(&mut self, effect: EffectHandle, technique: TechniqueHandle) {
        if let Some(loaded) = self.loaded_effects.get_mut(&effect) {
            loaded.technique = Some(technique);
        }
        self.record(NativeCall::SetEffectTechnique { effect, technique });
    }

    fn apply_effect(&mut self, effect: EffectHandle, pass: usize) -> GraphicsResult<StateChanges> {
        self.record(NativeCall::ApplyEffect { effect, pass });
        let loaded = self
            .loaded_effects
            .get(&effect)
            .ok_or_else(|| GraphicsError::Backend(format!("unknown effect {}", effect.0)))?;
        let technique = loaded
            .technique
            .ok_or_else(|| GraphicsError::Backend("no technique selected".to_string()))?;
        Ok(self
            .effects
            .get(&loaded.code)
            .and_then(|registered| registered.pass_changes.get(&(technique.0, pass)))
            .cloned()
            .unwrap_or_default())
    }

    fn dispose(&mut self) {
        self.disposed = true;
        self.record(NativeCall::Dispose);
    }
}
