//! Vertex and index buffer resources.
//!
//! Storage itself lives in the native layer; these types carry identity,
//! element layout and the native handle.

use std::cell::Cell;
use std::marker::PhantomData;
use std::rc::Rc;

use bytemuck::Pod;

use crate::backend::{BufferHandle, NativeContext};
use crate::device::GraphicsDevice;
use crate::error::{GraphicsError, GraphicsResult};
use crate::types::{BufferUsage, IndexElementSize};

use super::GraphicsResource;

/// A buffer of vertices with a fixed stride.
///
/// Created by [`GraphicsDevice::create_vertex_buffer`].
pub struct VertexBuffer {
    handle: BufferHandle,
    vertex_stride: u32,
    vertex_count: u32,
    usage: BufferUsage,
    disposed: Cell<bool>,
    _not_send: PhantomData<Rc<()>>,
}

impl VertexBuffer {
    pub(crate) fn new(
        handle: BufferHandle,
        vertex_stride: u32,
        vertex_count: u32,
        usage: BufferUsage,
    ) -> Self {
        Self {
            handle,
            vertex_stride,
            vertex_count,
            usage,
            disposed: Cell::new(false),
            _not_send: PhantomData,
        }
    }

    pub fn handle(&self) -> BufferHandle {
        self.handle
    }

    /// Size of one vertex in bytes.
    pub fn vertex_stride(&self) -> u32 {
        self.vertex_stride
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.vertex_stride as u64 * self.vertex_count as u64
    }

    /// Upload vertices starting at byte `offset`.
    pub fn set_data<C: NativeContext, T: Pod>(
        &self,
        device: &mut GraphicsDevice<C>,
        offset: u64,
        data: &[T],
    ) -> GraphicsResult<()> {
        write_buffer(device, self.handle, &self.disposed, self.size(), offset, data)
    }
}

/// A buffer of 16- or 32-bit indices.
///
/// Created by [`GraphicsDevice::create_index_buffer`].
pub struct IndexBuffer {
    handle: BufferHandle,
    element_size: IndexElementSize,
    index_count: u32,
    usage: BufferUsage,
    disposed: Cell<bool>,
    _not_send: PhantomData<Rc<()>>,
}

impl IndexBuffer {
    pub(crate) fn new(
        handle: BufferHandle,
        element_size: IndexElementSize,
        index_count: u32,
        usage: BufferUsage,
    ) -> Self {
        Self {
            handle,
            element_size,
            index_count,
            usage,
            disposed: Cell::new(false),
            _not_send: PhantomData,
        }
    }

    pub fn handle(&self) -> BufferHandle {
        self.handle
    }

    pub fn element_size(&self) -> IndexElementSize {
        self.element_size
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.element_size.size_in_bytes() as u64 * self.index_count as u64
    }

    /// Upload indices starting at byte `offset`.
    pub fn set_data<C: NativeContext, T: Pod>(
        &self,
        device: &mut GraphicsDevice<C>,
        offset: u64,
        data: &[T],
    ) -> GraphicsResult<()> {
        write_buffer(device, self.handle, &self.disposed, self.size(), offset, data)
    }
}

fn write_buffer<C: NativeContext, T: Pod>(
    device: &mut GraphicsDevice<C>,
    handle: BufferHandle,
    disposed: &Cell<bool>,
    capacity: u64,
    offset: u64,
    data: &[T],
) -> GraphicsResult<()> {
    if disposed.get() {
        return Err(GraphicsError::Disposed("buffer"));
    }
    let bytes: &[u8] = bytemuck::cast_slice(data);
    if offset + bytes.len() as u64 > capacity {
        return Err(GraphicsError::InvalidParameter(format!(
            "writing {} bytes at offset {offset} overflows a {capacity} byte buffer",
            bytes.len()
        )));
    }
    device.live_context()?.set_buffer_data(handle, offset, bytes)
}

macro_rules! buffer_resource {
    ($ty:ident, $label:literal) => {
        impl GraphicsResource for $ty {
            fn dispose(&self, context: &mut dyn NativeContext) {
                if !self.disposed.replace(true) {
                    context.delete_buffer(self.handle);
                }
            }

            fn is_disposed(&self) -> bool {
                self.disposed.get()
            }
        }

        impl Drop for $ty {
            fn drop(&mut self) {
                if !self.disposed.get() {
                    log::warn!(concat!($label, " {:?} dropped without dispose"), self.handle);
                }
            }
        }

        impl std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($ty))
                    .field("handle", &self.handle)
                    .field("size", &self.size())
                    .field("usage", &self.usage)
                    .finish()
            }
        }
    };
}

buffer_resource!(VertexBuffer, "VertexBuffer");
buffer_resource!(IndexBuffer, "IndexBuffer");

static_assertions::assert_not_impl_any!(VertexBuffer: Send, Sync);
static_assertions::assert_not_impl_any!(IndexBuffer: Send, Sync);
