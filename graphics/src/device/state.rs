//! Pipeline state setters with redundancy elimination.

use std::rc::Rc;

use glam::Vec4;
use stamen_core::{BlendState, Color, DepthStencilState, RasterizerState, SamplerState};

use crate::backend::NativeContext;
use crate::error::{GraphicsError, GraphicsResult};
use crate::resources::Texture;
use crate::types::{ClearOptions, DepthFormat, Rectangle, Viewport};

use super::{GraphicsDevice, MAX_TEXTURE_SLOTS};

/// Borrowed view of the device's current pipeline state.
///
/// Effect passes seed their state translation from it.
#[derive(Debug, Clone, Copy)]
pub struct PipelineSnapshot<'a> {
    pub blend: &'a BlendState,
    pub depth_stencil: &'a DepthStencilState,
    pub rasterizer: &'a RasterizerState,
    pub sampler_states: &'a [Rc<SamplerState>],
}

fn same<T: PartialEq>(current: &Rc<T>, new: &Rc<T>) -> bool {
    Rc::ptr_eq(current, new) || **current == **new
}

impl<C: NativeContext> GraphicsDevice<C> {
    pub fn blend_state(&self) -> &Rc<BlendState> {
        &self.blend_state
    }

    /// Set the blend state. Pushed immediately if it differs from the current one.
    pub fn set_blend_state(&mut self, state: Rc<BlendState>) {
        if same(&self.blend_state, &state) {
            return;
        }
        self.context.set_blend_state(&state);
        self.blend_state = state;
    }

    pub fn depth_stencil_state(&self) -> &Rc<DepthStencilState> {
        &self.depth_stencil_state
    }

    /// Set the depth-stencil state. Pushed immediately if it differs from the
    /// current one.
    pub fn set_depth_stencil_state(&mut self, state: Rc<DepthStencilState>) {
        if same(&self.depth_stencil_state, &state) {
            return;
        }
        self.context.set_depth_stencil_state(&state);
        self.depth_stencil_state = state;
    }

    pub fn rasterizer_state(&self) -> &Rc<RasterizerState> {
        &self.rasterizer_state
    }

    /// Set the rasterizer state. Applied before the next draw.
    pub fn set_rasterizer_state(&mut self, state: Rc<RasterizerState>) {
        if same(&self.rasterizer_state, &state) {
            return;
        }
        self.rasterizer_state = state;
        self.rasterizer_sync.mark_dirty();
    }

    /// Current viewport, in logical coordinates.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        if self.viewport == viewport {
            return;
        }
        self.viewport = viewport;
        self.push_viewport();
    }

    /// Current scissor rectangle, in logical coordinates.
    pub fn scissor_rect(&self) -> Rectangle {
        self.scissor_rect
    }

    pub fn set_scissor_rect(&mut self, rect: Rectangle) {
        if self.scissor_rect == rect {
            return;
        }
        self.scissor_rect = rect;
        self.push_scissor_rect();
    }

    pub(super) fn push_viewport(&mut self) {
        let viewport = if self.render_targets_bound() {
            self.viewport
        } else {
            self.viewport.flipped(self.presentation.back_buffer_height)
        };
        self.context.set_viewport(&viewport);
    }

    pub(super) fn push_scissor_rect(&mut self) {
        let rect = if self.render_targets_bound() {
            self.scissor_rect
        } else {
            self.scissor_rect
                .flipped(self.presentation.back_buffer_height)
        };
        self.context.set_scissor_rect(&rect);
    }

    // ------------------------------------------------------------------
    // Textures and samplers
    // ------------------------------------------------------------------

    /// Texture bound to `slot`.
    pub fn texture(&self, slot: usize) -> Option<&Rc<Texture>> {
        self.textures.get(slot).and_then(Option::as_ref)
    }

    /// Bind a texture to `slot`. The binding is verified before the next draw.
    pub fn set_texture(&mut self, slot: usize, texture: Option<Rc<Texture>>) -> GraphicsResult<()> {
        let current = self.textures.get_mut(slot).ok_or_else(|| slot_error(slot))?;
        let unchanged = match (current.as_ref(), texture.as_ref()) {
            (None, None) => true,
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        };
        if !unchanged {
            *current = texture;
            self.sampler_queue.push(slot);
        }
        Ok(())
    }

    /// Sampler state of every slot.
    pub fn sampler_states(&self) -> &[Rc<SamplerState>] {
        &self.sampler_states
    }

    /// Set the sampler state of `slot`. The binding is verified before the
    /// next draw.
    pub fn set_sampler_state(&mut self, slot: usize, state: Rc<SamplerState>) -> GraphicsResult<()> {
        let current = self
            .sampler_states
            .get_mut(slot)
            .ok_or_else(|| slot_error(slot))?;
        if !same(current, &state) {
            *current = state;
            self.sampler_queue.push(slot);
        }
        Ok(())
    }

    /// Number of slots waiting for verification.
    pub fn pending_sampler_count(&self) -> usize {
        self.sampler_queue.len()
    }

    /// Borrow the current pipeline state.
    pub fn pipeline_snapshot(&self) -> PipelineSnapshot<'_> {
        PipelineSnapshot {
            blend: &self.blend_state,
            depth_stencil: &self.depth_stencil_state,
            rasterizer: &self.rasterizer_state,
            sampler_states: &self.sampler_states,
        }
    }

    /// Push pending rasterizer and sampler state.
    pub(super) fn apply_state(&mut self) {
        if self.rasterizer_sync.take() {
            let bound = self.render_targets_bound();
            self.context
                .apply_rasterizer_state(&self.rasterizer_state, bound);
        }
        while let Some(slot) = self.sampler_queue.pop() {
            let texture = self.textures[slot].as_ref().map(|texture| texture.handle());
            self.context
                .verify_sampler(slot, texture, &self.sampler_states[slot]);
        }
    }

    // ------------------------------------------------------------------
    // Clear
    // ------------------------------------------------------------------

    /// Depth format of the current target: the first bound render target, or
    /// the backbuffer.
    pub fn current_depth_format(&self) -> DepthFormat {
        match self.render_targets.first() {
            Some(binding) => binding.target().depth_format(),
            None => self.presentation.depth_stencil_format,
        }
    }

    /// Clear the color target, plus depth and stencil where the current depth
    /// format has them.
    pub fn clear(&mut self, color: Color) -> GraphicsResult<()> {
        self.clear_with(
            ClearOptions::all(),
            color.to_vec4(),
            self.viewport.max_depth,
            0,
        )
    }

    /// Clear the selected buffers. Depth and stencil bits are dropped when the
    /// current depth format lacks them.
    pub fn clear_with(
        &mut self,
        options: ClearOptions,
        color: Vec4,
        depth: f32,
        stencil: i32,
    ) -> GraphicsResult<()> {
        let format = self.current_depth_format();
        let mut options = options;
        if !format.has_depth() {
            options.remove(ClearOptions::DEPTH_BUFFER);
        }
        if !format.has_stencil() {
            options.remove(ClearOptions::STENCIL);
        }
        if options.is_empty() {
            return Ok(());
        }
        self.live_context()?.clear(options, color, depth, stencil);
        Ok(())
    }
}

fn slot_error(slot: usize) -> GraphicsError {
    GraphicsError::InvalidParameter(format!(
        "texture slot {slot} out of range (max {MAX_TEXTURE_SLOTS})"
    ))
}
