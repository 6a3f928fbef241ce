//! Render-target and vertex-stream bindings.
//!
//! Both compare by resource identity, not by resource contents.

use std::rc::Rc;

use crate::resources::{Texture, VertexBuffer};
use crate::types::CubeMapFace;

/// One color target: a render-target texture and, for cube maps, the face.
#[derive(Debug, Clone)]
pub struct RenderTargetBinding {
    target: Rc<Texture>,
    face: Option<CubeMapFace>,
}

impl RenderTargetBinding {
    /// Bind a 2D render target.
    pub fn new(target: Rc<Texture>) -> Self {
        Self { target, face: None }
    }

    /// Bind one face of a cube render target.
    pub fn cube(target: Rc<Texture>, face: CubeMapFace) -> Self {
        Self {
            target,
            face: Some(face),
        }
    }

    pub fn target(&self) -> &Rc<Texture> {
        &self.target
    }

    pub fn face(&self) -> Option<CubeMapFace> {
        self.face
    }
}

impl PartialEq for RenderTargetBinding {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.target, &other.target) && self.face == other.face
    }
}

impl From<Rc<Texture>> for RenderTargetBinding {
    fn from(target: Rc<Texture>) -> Self {
        Self::new(target)
    }
}

/// One vertex stream.
#[derive(Debug, Clone)]
pub struct VertexBufferBinding {
    buffer: Rc<VertexBuffer>,
    vertex_offset: i32,
    instance_frequency: i32,
}

impl VertexBufferBinding {
    /// Per-vertex stream starting at `vertex_offset`.
    pub fn new(buffer: Rc<VertexBuffer>, vertex_offset: i32) -> Self {
        Self::instanced(buffer, vertex_offset, 0)
    }

    /// Stream advanced once every `instance_frequency` instances.
    pub fn instanced(buffer: Rc<VertexBuffer>, vertex_offset: i32, instance_frequency: i32) -> Self {
        Self {
            buffer,
            vertex_offset,
            instance_frequency,
        }
    }

    pub fn buffer(&self) -> &Rc<VertexBuffer> {
        &self.buffer
    }

    pub fn vertex_offset(&self) -> i32 {
        self.vertex_offset
    }

    pub fn instance_frequency(&self) -> i32 {
        self.instance_frequency
    }
}

impl PartialEq for VertexBufferBinding {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.buffer, &other.buffer)
            && self.vertex_offset == other.vertex_offset
            && self.instance_frequency == other.instance_frequency
    }
}
