//! Render-target switching.

use std::rc::Rc;

use crate::backend::{NativeContext, NativeRenderTarget};
use crate::error::{GraphicsError, GraphicsResult};
use crate::resources::{GraphicsResource, Texture};
use crate::types::{ClearOptions, CubeMapFace, DepthFormat, Rectangle, RenderTargetUsage, Viewport};

use super::{discard_color, GraphicsDevice, RenderTargetBinding, MAX_RENDER_TARGETS};

impl<C: NativeContext> GraphicsDevice<C> {
    /// Currently bound render targets. Empty when drawing to the backbuffer.
    pub fn render_targets(&self) -> &[RenderTargetBinding] {
        &self.render_targets
    }

    /// Whether any offscreen target is bound.
    pub fn render_targets_bound(&self) -> bool {
        !self.render_targets.is_empty()
    }

    /// Bind a single 2D render target, or the backbuffer for `None`.
    pub fn set_render_target(&mut self, target: Option<&Rc<Texture>>) -> GraphicsResult<()> {
        match target {
            Some(target) => self.set_render_targets(&[RenderTargetBinding::new(Rc::clone(target))]),
            None => self.set_render_targets(&[]),
        }
    }

    /// Bind one face of a cube render target.
    pub fn set_render_target_cube(&mut self, target: &Rc<Texture>, face: CubeMapFace) -> GraphicsResult<()> {
        self.set_render_targets(&[RenderTargetBinding::cube(Rc::clone(target), face)])
    }

    /// Bind `targets`, or the backbuffer when the slice is empty.
    ///
    /// Binding the set that is already bound does nothing. Otherwise targets
    /// leaving the set get their mipmaps regenerated, viewport and scissor are
    /// reset to the new target size, and the new target is cleared when its
    /// usage discards contents.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::InvalidParameter`] for more than
    /// [`MAX_RENDER_TARGETS`] bindings, for textures that are not render
    /// targets, and for a cube face that does not match the texture kind.
    pub fn set_render_targets(&mut self, targets: &[RenderTargetBinding]) -> GraphicsResult<()> {
        if targets.len() > MAX_RENDER_TARGETS {
            return Err(GraphicsError::InvalidParameter(format!(
                "{} render targets bound, at most {MAX_RENDER_TARGETS} supported",
                targets.len()
            )));
        }
        if targets == self.render_targets.as_slice() {
            return Ok(());
        }
        for binding in targets {
            validate_binding(binding)?;
        }
        if self.disposed {
            return Err(GraphicsError::Disposed("graphics device"));
        }

        let was_bound = self.render_targets_bound();
        let previous = std::mem::replace(&mut self.render_targets, targets.to_vec());

        let (width, height, usage) = match targets.first() {
            None => {
                self.context.set_render_targets(&[], DepthFormat::None);
                for binding in &previous {
                    generate_mipmaps(&mut self.context, binding.target());
                }
                (
                    self.presentation.back_buffer_width,
                    self.presentation.back_buffer_height,
                    self.presentation.render_target_usage,
                )
            }
            Some(first) => {
                let native: Vec<NativeRenderTarget> = targets
                    .iter()
                    .map(|binding| NativeRenderTarget {
                        texture: binding.target().handle(),
                        face: binding.face(),
                    })
                    .collect();
                self.context
                    .set_render_targets(&native, first.target().depth_format());
                for binding in &previous {
                    let still_bound = targets
                        .iter()
                        .any(|t| Rc::ptr_eq(t.target(), binding.target()));
                    if !still_bound {
                        generate_mipmaps(&mut self.context, binding.target());
                    }
                }
                let target = first.target();
                (
                    target.width() as i32,
                    target.height() as i32,
                    target.render_target_usage(),
                )
            }
        };
        log::trace!(
            "GraphicsDevice: bound {} render target(s), {width}x{height}",
            targets.len()
        );

        if was_bound != self.render_targets_bound() {
            self.rasterizer_sync.mark_dirty();
        }

        self.viewport = Viewport::from_dimensions(width, height);
        self.scissor_rect = Rectangle::from_dimensions(width, height);
        self.push_viewport();
        self.push_scissor_rect();

        if usage == RenderTargetUsage::DiscardContents {
            self.clear_with(
                ClearOptions::all(),
                discard_color(),
                self.viewport.max_depth,
                0,
            )?;
        }
        Ok(())
    }
}

fn validate_binding(binding: &RenderTargetBinding) -> GraphicsResult<()> {
    let target = binding.target();
    if target.is_disposed() {
        return Err(GraphicsError::Disposed("render target"));
    }
    if target.render_target().is_none() {
        return Err(GraphicsError::InvalidParameter(format!(
            "texture {:?} is not a render target",
            target.label()
        )));
    }
    if target.is_cube() != binding.face().is_some() {
        return Err(GraphicsError::InvalidParameter(format!(
            "cube face {:?} does not match texture {:?}",
            binding.face(),
            target.label()
        )));
    }
    Ok(())
}

fn generate_mipmaps<C: NativeContext>(context: &mut C, target: &Texture) {
    if target.level_count() > 1 {
        context.generate_target_mipmaps(target.handle());
    }
}
