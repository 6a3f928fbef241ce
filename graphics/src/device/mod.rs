//! Graphics device.
//!
//! The [`GraphicsDevice`] owns the authoritative copy of the pipeline
//! configuration and forwards only real changes to its [`NativeContext`].
//! It is also the factory for every resource and keeps a weak registry of
//! them so that disposing the device disposes whatever is still alive.

mod bindings;
mod draw;
mod render_targets;
mod state;
mod sync;

use std::rc::{Rc, Weak};

use glam::Vec4;
use stamen_core::{BlendState, Color, DepthStencilState, RasterizerState, SamplerState};

use crate::backend::NativeContext;
use crate::error::{GraphicsError, GraphicsResult};
use crate::resources::{GraphicsResource, IndexBuffer, Texture, VertexBuffer};
use crate::types::{
    BufferDescriptor, BufferUsage, IndexElementSize, PresentationParameters, Rectangle,
    TextureDescriptor, Viewport,
};

pub use bindings::{RenderTargetBinding, VertexBufferBinding};
pub use state::PipelineSnapshot;

use sync::{SamplerQueue, SyncState};

/// Maximum number of simultaneously bound color targets.
pub const MAX_RENDER_TARGETS: usize = 4;

/// Maximum number of vertex streams.
pub const MAX_VERTEX_BUFFERS: usize = 16;

/// Number of texture and sampler slots.
pub const MAX_TEXTURE_SLOTS: usize = 16;

/// Capabilities of a graphics device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceCapabilities {
    /// Whether instanced draws are supported.
    pub supports_hardware_instancing: bool,
    /// Maximum texture dimension.
    pub max_texture_dimension: u32,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            supports_hardware_instancing: true,
            max_texture_dimension: 16384,
        }
    }
}

/// Color used to fill targets whose previous contents are discarded.
///
/// Debug builds use a loud purple so that reads of discarded contents stand out.
pub(crate) fn discard_color() -> Vec4 {
    if cfg!(debug_assertions) {
        Color::new(68, 34, 136, 255).to_vec4()
    } else {
        Color::BLACK.to_vec4()
    }
}

type Observer = Box<dyn FnMut()>;

/// A graphics device that tracks pipeline state over a native context.
///
/// Every state setter is idempotent: setting a value equal to the current one
/// issues no native call. Rasterizer state and sampler bindings are applied
/// lazily right before a draw.
///
/// # Thread Safety
///
/// `GraphicsDevice` is neither `Send` nor `Sync`. Resources are shared with
/// `Rc` and all calls are immediate.
///
/// # Example
///
/// ```ignore
/// let mut device = GraphicsDevice::new(DummyBackend::new(), PresentationParameters::new(1280, 720));
///
/// let target = device.create_texture(
///     &TextureDescriptor::new_2d(256, 256, SurfaceFormat::Color)
///         .with_render_target(DepthFormat::Depth24Stencil8, RenderTargetUsage::DiscardContents),
/// )?;
/// device.set_render_target(Some(&target))?;
/// device.set_blend_state(Rc::new(BlendState::alpha_blend()));
/// device.draw_primitives(PrimitiveType::TriangleList, 0, 2)?;
/// ```
pub struct GraphicsDevice<C: NativeContext> {
    context: C,
    capabilities: DeviceCapabilities,
    presentation: PresentationParameters,

    blend_state: Rc<BlendState>,
    depth_stencil_state: Rc<DepthStencilState>,
    rasterizer_state: Rc<RasterizerState>,
    rasterizer_sync: SyncState,
    viewport: Viewport,
    scissor_rect: Rectangle,

    textures: [Option<Rc<Texture>>; MAX_TEXTURE_SLOTS],
    sampler_states: [Rc<SamplerState>; MAX_TEXTURE_SLOTS],
    sampler_queue: SamplerQueue,

    render_targets: Vec<RenderTargetBinding>,
    vertex_buffers: Vec<VertexBufferBinding>,
    vertex_sync: SyncState,
    indices: Option<Rc<IndexBuffer>>,

    // Weak references to everything created through this device.
    resources: Vec<Weak<dyn GraphicsResource>>,
    resetting_observers: Vec<Observer>,
    reset_observers: Vec<Observer>,
    disposing_observers: Vec<Observer>,
    disposed: bool,
}

impl<C: NativeContext> GraphicsDevice<C> {
    /// Create a device over `context` and apply the default pipeline state.
    pub fn new(context: C, presentation: PresentationParameters) -> Self {
        let capabilities = context.capabilities();
        log::debug!(
            "GraphicsDevice: created over {} backend, backbuffer {}x{}",
            context.name(),
            presentation.back_buffer_width,
            presentation.back_buffer_height
        );

        let viewport =
            Viewport::from_dimensions(presentation.back_buffer_width, presentation.back_buffer_height);
        let mut device = Self {
            context,
            capabilities,
            presentation,
            blend_state: Rc::new(BlendState::opaque()),
            depth_stencil_state: Rc::new(DepthStencilState::depth_default()),
            rasterizer_state: Rc::new(RasterizerState::cull_counter_clockwise()),
            rasterizer_sync: SyncState::Dirty,
            viewport,
            scissor_rect: viewport.bounds(),
            textures: std::array::from_fn(|_| None),
            sampler_states: std::array::from_fn(|_| Rc::new(SamplerState::linear_wrap())),
            sampler_queue: SamplerQueue::default(),
            render_targets: Vec::new(),
            vertex_buffers: Vec::new(),
            vertex_sync: SyncState::Clean,
            indices: None,
            resources: Vec::new(),
            resetting_observers: Vec::new(),
            reset_observers: Vec::new(),
            disposing_observers: Vec::new(),
            disposed: false,
        };

        device.context.set_blend_state(&device.blend_state);
        device
            .context
            .set_depth_stencil_state(&device.depth_stencil_state);
        device.push_viewport();
        device.push_scissor_rect();
        device
    }

    /// Get the native context.
    pub fn context(&self) -> &C {
        &self.context
    }

    /// Mutable access to the native context, bypassing state tracking.
    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// The native context, or an error once the device is disposed.
    pub(crate) fn live_context(&mut self) -> GraphicsResult<&mut C> {
        if self.disposed {
            return Err(GraphicsError::Disposed("graphics device"));
        }
        Ok(&mut self.context)
    }

    /// Get the device capabilities.
    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    /// Current backbuffer configuration.
    pub fn presentation_parameters(&self) -> &PresentationParameters {
        &self.presentation
    }

    /// Whether [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ------------------------------------------------------------------
    // Resources
    // ------------------------------------------------------------------

    /// Create a texture.
    ///
    /// # Errors
    ///
    /// Returns an error if the texture dimensions are zero or exceed device
    /// limits, or if the native layer fails to allocate it.
    pub fn create_texture(&mut self, descriptor: &TextureDescriptor) -> GraphicsResult<Rc<Texture>> {
        let max_dim = self.capabilities.max_texture_dimension;
        if descriptor.width() > max_dim || descriptor.height() > max_dim {
            return Err(GraphicsError::InvalidParameter(format!(
                "texture dimension exceeds maximum {max_dim}"
            )));
        }
        if descriptor.width() == 0 || descriptor.height() == 0 {
            return Err(GraphicsError::InvalidParameter(
                "texture dimensions cannot be zero".to_string(),
            ));
        }

        let handle = self.live_context()?.create_texture(descriptor)?;
        let texture = Rc::new(Texture::new(handle, descriptor.clone()));
        let weak: Weak<Texture> = Rc::downgrade(&texture);
        self.track(weak);

        log::trace!(
            "GraphicsDevice: created texture {:?}, size={}x{}, levels={}",
            descriptor.label,
            descriptor.width(),
            descriptor.height(),
            texture.level_count()
        );
        Ok(texture)
    }

    /// Create a vertex buffer holding `vertex_count` vertices of `vertex_stride` bytes.
    pub fn create_vertex_buffer(
        &mut self,
        vertex_stride: u32,
        vertex_count: u32,
        usage: BufferUsage,
    ) -> GraphicsResult<Rc<VertexBuffer>> {
        let size = vertex_stride as u64 * vertex_count as u64;
        let handle = self.create_buffer(size, usage | BufferUsage::VERTEX)?;
        let buffer = Rc::new(VertexBuffer::new(handle, vertex_stride, vertex_count, usage));
        let weak: Weak<VertexBuffer> = Rc::downgrade(&buffer);
        self.track(weak);
        Ok(buffer)
    }

    /// Create an index buffer holding `index_count` indices.
    pub fn create_index_buffer(
        &mut self,
        element_size: IndexElementSize,
        index_count: u32,
        usage: BufferUsage,
    ) -> GraphicsResult<Rc<IndexBuffer>> {
        let size = element_size.size_in_bytes() as u64 * index_count as u64;
        let handle = self.create_buffer(size, usage | BufferUsage::INDEX)?;
        let buffer = Rc::new(IndexBuffer::new(handle, element_size, index_count, usage));
        let weak: Weak<IndexBuffer> = Rc::downgrade(&buffer);
        self.track(weak);
        Ok(buffer)
    }

    fn create_buffer(&mut self, size: u64, usage: BufferUsage) -> GraphicsResult<crate::backend::BufferHandle> {
        if size == 0 {
            return Err(GraphicsError::InvalidParameter(
                "buffer size cannot be zero".to_string(),
            ));
        }
        let descriptor = BufferDescriptor::new(size, usage);
        let handle = self.live_context()?.create_buffer(&descriptor)?;
        log::trace!("GraphicsDevice: created buffer, size={size}, usage={usage:?}");
        Ok(handle)
    }

    /// Register a resource for disposal with the device.
    pub(crate) fn track<R: GraphicsResource + 'static>(&mut self, resource: Weak<R>) {
        if self.resources.len() == self.resources.capacity() {
            self.resources.retain(|weak| weak.strong_count() > 0);
        }
        self.resources.push(resource);
    }

    /// Get the number of live resources created by this device.
    pub fn resource_count(&self) -> usize {
        self.resources
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    fn live_resources(&self) -> Vec<Rc<dyn GraphicsResource>> {
        self.resources.iter().filter_map(Weak::upgrade).collect()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Call `observer` right before the device is reset.
    pub fn on_device_resetting(&mut self, observer: impl FnMut() + 'static) {
        self.resetting_observers.push(Box::new(observer));
    }

    /// Call `observer` after the device has been reset.
    pub fn on_device_reset(&mut self, observer: impl FnMut() + 'static) {
        self.reset_observers.push(Box::new(observer));
    }

    /// Call `observer` when the device starts disposing.
    pub fn on_disposing(&mut self, observer: impl FnMut() + 'static) {
        self.disposing_observers.push(Box::new(observer));
    }

    /// Apply new presentation parameters.
    ///
    /// Viewport and scissor are reset to the new backbuffer size.
    pub fn reset(&mut self, presentation: PresentationParameters) -> GraphicsResult<()> {
        if self.disposed {
            return Err(GraphicsError::Disposed("graphics device"));
        }
        log::debug!(
            "GraphicsDevice: reset to {}x{}",
            presentation.back_buffer_width,
            presentation.back_buffer_height
        );
        for observer in &mut self.resetting_observers {
            observer();
        }

        self.presentation = presentation;
        let bound = self.render_targets_bound();
        self.context.reset_backbuffer(&self.presentation, bound);

        self.viewport = Viewport::from_dimensions(
            presentation.back_buffer_width,
            presentation.back_buffer_height,
        );
        self.scissor_rect = self.viewport.bounds();
        self.push_viewport();
        self.push_scissor_rect();

        for resource in self.live_resources() {
            resource.device_reset();
        }
        for observer in &mut self.reset_observers {
            observer();
        }
        Ok(())
    }

    /// Present the backbuffer.
    pub fn present(&mut self) -> GraphicsResult<()> {
        self.live_context()?.present();
        Ok(())
    }

    /// Copy the backbuffer into `data` as RGBA8 rows, top row first.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::InvalidParameter`] if `data` is smaller than
    /// the backbuffer.
    pub fn get_back_buffer_data<T: bytemuck::Pod>(&mut self, data: &mut [T]) -> GraphicsResult<()> {
        let width = self.presentation.back_buffer_width;
        let height = self.presentation.back_buffer_height;
        let row = width.max(0) as usize * 4;
        let needed = row * height.max(0) as usize;

        let bytes: &mut [u8] = bytemuck::cast_slice_mut(data);
        if bytes.len() < needed {
            return Err(GraphicsError::InvalidParameter(format!(
                "backbuffer needs {needed} bytes, destination has {}",
                bytes.len()
            )));
        }
        let bytes = &mut bytes[..needed];
        self.live_context()?.read_backbuffer(bytes, width, height)?;

        // The native read is bottom-up.
        let rows = height.max(0) as usize;
        for y in 0..rows / 2 {
            let (top, bottom) = bytes.split_at_mut((rows - 1 - y) * row);
            top[y * row..(y + 1) * row].swap_with_slice(&mut bottom[..row]);
        }
        Ok(())
    }

    /// Dispose every live resource, then the native context.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        log::debug!("GraphicsDevice: disposing");
        for observer in &mut self.disposing_observers {
            observer();
        }

        let resources = self.live_resources();
        self.resources.clear();
        for resource in resources {
            resource.dispose(&mut self.context);
        }

        self.render_targets.clear();
        self.vertex_buffers.clear();
        self.indices = None;
        self.textures = std::array::from_fn(|_| None);

        self.context.dispose();
        self.disposed = true;
    }
}

impl<C: NativeContext> Drop for GraphicsDevice<C> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<C: NativeContext> std::fmt::Debug for GraphicsDevice<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphicsDevice")
            .field("backend", &self.context.name())
            .field("capabilities", &self.capabilities)
            .field("presentation", &self.presentation)
            .field("render_targets", &self.render_targets.len())
            .field("disposed", &self.disposed)
            .finish()
    }
}

#[cfg(feature = "dummy")]
static_assertions::assert_not_impl_any!(GraphicsDevice<crate::backend::DummyBackend>: Send, Sync);

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::backend::{DummyBackend, NativeCall};
    use crate::types::{RenderTargetUsage, SurfaceFormat};

    fn create_test_device() -> GraphicsDevice<DummyBackend> {
        let mut device = GraphicsDevice::new(DummyBackend::new(), PresentationParameters::new(4, 2));
        device.context_mut().clear_calls();
        device
    }

    #[test]
    fn test_initial_state_is_pushed() {
        let device = GraphicsDevice::new(DummyBackend::new(), PresentationParameters::new(64, 32));
        let calls = device.context().calls();
        assert_eq!(calls[0], NativeCall::SetBlendState(BlendState::opaque()));
        assert_eq!(
            calls[1],
            NativeCall::SetDepthStencilState(DepthStencilState::depth_default())
        );
        assert_eq!(calls[2], NativeCall::SetViewport(Viewport::new(0, 0, 64, 32)));
    }

    #[test]
    fn test_create_texture() {
        let mut device = create_test_device();
        let texture = device
            .create_texture(&TextureDescriptor::new_2d(512, 512, SurfaceFormat::Color))
            .unwrap();
        assert_eq!(texture.width(), 512);
        assert_eq!(device.resource_count(), 1);
    }

    #[test]
    fn test_create_texture_zero_size() {
        let mut device = create_test_device();
        let result = device.create_texture(&TextureDescriptor::new_2d(0, 512, SurfaceFormat::Color));
        assert!(matches!(result, Err(GraphicsError::InvalidParameter(_))));
    }

    #[test]
    fn test_create_texture_over_limit() {
        let backend = DummyBackend::new().with_capabilities(DeviceCapabilities {
            max_texture_dimension: 256,
            ..DeviceCapabilities::default()
        });
        let mut device = GraphicsDevice::new(backend, PresentationParameters::default());
        let result = device.create_texture(&TextureDescriptor::new_cube(512, SurfaceFormat::Color));
        assert!(result.is_err());
    }

    #[test]
    fn test_create_buffer_zero_size() {
        let mut device = create_test_device();
        assert!(device
            .create_vertex_buffer(16, 0, BufferUsage::empty())
            .is_err());
    }

    #[test]
    fn test_resource_cleanup() {
        let mut device = create_test_device();
        {
            let buffer = device
                .create_index_buffer(IndexElementSize::SixteenBits, 6, BufferUsage::empty())
                .unwrap();
            assert_eq!(device.resource_count(), 1);
            buffer.dispose(device.context_mut());
        }
        assert_eq!(device.resource_count(), 0);
    }

    #[test]
    fn test_dispose_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut device = create_test_device();
        let texture = device
            .create_texture(&TextureDescriptor::new_2d(4, 4, SurfaceFormat::Color))
            .unwrap();
        let observed = Rc::clone(&log);
        device.on_disposing(move || observed.borrow_mut().push("disposing"));
        device.context_mut().clear_calls();

        device.dispose();
        assert_eq!(*log.borrow(), vec!["disposing"]);
        assert!(texture.is_disposed());
        assert_eq!(
            device.context().calls(),
            &[NativeCall::DeleteTexture(texture.handle()), NativeCall::Dispose]
        );

        device.dispose();
        assert_eq!(device.context().count_calls(|c| *c == NativeCall::Dispose), 1);
        assert!(matches!(device.present(), Err(GraphicsError::Disposed(_))));
    }

    #[test]
    fn test_reset_notifies_and_resizes() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut device = create_test_device();
        let before = Rc::clone(&log);
        let after = Rc::clone(&log);
        device.on_device_resetting(move || before.borrow_mut().push("resetting"));
        device.on_device_reset(move || after.borrow_mut().push("reset"));

        device
            .reset(PresentationParameters::new(100, 50).with_usage(RenderTargetUsage::PreserveContents))
            .unwrap();
        assert_eq!(*log.borrow(), vec!["resetting", "reset"]);
        assert_eq!(device.viewport(), Viewport::new(0, 0, 100, 50));
        assert_eq!(device.scissor_rect(), Rectangle::new(0, 0, 100, 50));
        assert_eq!(
            device.context().calls()[0],
            NativeCall::ResetBackbuffer {
                width: 100,
                height: 50,
                render_target_bound: false
            }
        );
    }

    #[test]
    fn test_back_buffer_rows_are_flipped() {
        let mut device = create_test_device();
        // 4x2 backbuffer, bottom row first.
        let mut native = vec![1u8; 16];
        native.extend(vec![2u8; 16]);
        device.context_mut().set_backbuffer_contents(native);

        let mut pixels = [0u32; 8];
        device.get_back_buffer_data(&mut pixels).unwrap();
        assert_eq!(pixels[0], 0x0202_0202);
        assert_eq!(pixels[7], 0x0101_0101);
    }

    #[test]
    fn test_back_buffer_destination_too_small() {
        let mut device = create_test_device();
        let mut pixels = [0u32; 7];
        assert!(matches!(
            device.get_back_buffer_data(&mut pixels),
            Err(GraphicsError::InvalidParameter(_))
        ));
        assert!(device.context().calls().is_empty());
    }
}
