//! Geometry bindings and draw calls.

use std::rc::Rc;

use crate::backend::{NativeContext, NativeVertexBinding};
use crate::error::{GraphicsError, GraphicsResult};
use crate::resources::{IndexBuffer, VertexBuffer};
use crate::types::PrimitiveType;

use super::{GraphicsDevice, VertexBufferBinding, MAX_VERTEX_BUFFERS};

impl<C: NativeContext> GraphicsDevice<C> {
    /// Currently bound vertex streams.
    pub fn vertex_buffers(&self) -> &[VertexBufferBinding] {
        &self.vertex_buffers
    }

    /// Bind a single vertex stream.
    pub fn set_vertex_buffer(&mut self, buffer: &Rc<VertexBuffer>, vertex_offset: i32) -> GraphicsResult<()> {
        self.set_vertex_buffers(&[VertexBufferBinding::new(Rc::clone(buffer), vertex_offset)])
    }

    /// Bind vertex streams. Identical bindings are ignored.
    pub fn set_vertex_buffers(&mut self, bindings: &[VertexBufferBinding]) -> GraphicsResult<()> {
        if bindings.len() > MAX_VERTEX_BUFFERS {
            return Err(GraphicsError::InvalidParameter(format!(
                "{} vertex buffers bound, at most {MAX_VERTEX_BUFFERS} supported",
                bindings.len()
            )));
        }
        if bindings == self.vertex_buffers.as_slice() {
            return Ok(());
        }
        self.vertex_buffers = bindings.to_vec();
        self.vertex_sync.mark_dirty();
        Ok(())
    }

    pub fn indices(&self) -> Option<&Rc<IndexBuffer>> {
        self.indices.as_ref()
    }

    /// Set the index buffer used by indexed draws.
    pub fn set_indices(&mut self, indices: Option<Rc<IndexBuffer>>) {
        self.indices = indices;
    }

    /// Draw indexed primitives from the bound vertex and index buffers.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::InvalidParameter`] if no index buffer is bound.
    pub fn draw_indexed_primitives(
        &mut self,
        primitive_type: PrimitiveType,
        base_vertex: i32,
        start_index: u32,
        primitive_count: u32,
    ) -> GraphicsResult<()> {
        let indices = self.prepare_indexed_draw(base_vertex)?;
        self.context.draw_indexed_primitives(
            primitive_type,
            start_index,
            primitive_type.element_count(primitive_count),
            indices.element_size(),
        );
        Ok(())
    }

    /// Draw `instance_count` instances of indexed primitives.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::FeatureNotSupported`] without touching any
    /// state if the device lacks hardware instancing.
    pub fn draw_instanced_primitives(
        &mut self,
        primitive_type: PrimitiveType,
        base_vertex: i32,
        start_index: u32,
        primitive_count: u32,
        instance_count: u32,
    ) -> GraphicsResult<()> {
        if !self.capabilities.supports_hardware_instancing {
            return Err(GraphicsError::FeatureNotSupported(
                "hardware instancing".to_string(),
            ));
        }
        let indices = self.prepare_indexed_draw(base_vertex)?;
        self.context.draw_instanced_primitives(
            primitive_type,
            start_index,
            primitive_type.element_count(primitive_count),
            indices.element_size(),
            instance_count,
        );
        Ok(())
    }

    /// Draw non-indexed primitives from the bound vertex buffers.
    pub fn draw_primitives(
        &mut self,
        primitive_type: PrimitiveType,
        vertex_start: u32,
        primitive_count: u32,
    ) -> GraphicsResult<()> {
        self.live_context()?;
        self.apply_state();
        self.apply_vertex_bindings(0);
        self.context.draw_primitives(
            primitive_type,
            vertex_start,
            primitive_type.element_count(primitive_count),
        );
        Ok(())
    }

    fn prepare_indexed_draw(&mut self, base_vertex: i32) -> GraphicsResult<Rc<IndexBuffer>> {
        let indices = self.indices.clone().ok_or_else(|| {
            GraphicsError::InvalidParameter("indexed draw without an index buffer".to_string())
        })?;
        self.live_context()?;
        self.apply_state();
        self.context
            .bind_index_buffer(indices.handle(), indices.element_size());
        self.apply_vertex_bindings(base_vertex);
        Ok(indices)
    }

    fn apply_vertex_bindings(&mut self, base_vertex: i32) {
        let bindings: Vec<NativeVertexBinding> = self
            .vertex_buffers
            .iter()
            .map(|binding| NativeVertexBinding {
                buffer: binding.buffer().handle(),
                vertex_stride: binding.buffer().vertex_stride(),
                vertex_offset: binding.vertex_offset(),
                instance_frequency: binding.instance_frequency(),
            })
            .collect();
        let changed = self.vertex_sync.take();
        self.context
            .apply_vertex_attributes(&bindings, changed, base_vertex);
    }
}
