//! Texture resource.

use std::cell::Cell;
use std::marker::PhantomData;
use std::rc::Rc;

use bytemuck::Pod;

use crate::backend::{NativeContext, TextureHandle};
use crate::device::GraphicsDevice;
use crate::error::{GraphicsError, GraphicsResult};
use crate::types::{
    DepthFormat, Rectangle, RenderTargetDescriptor, RenderTargetUsage, SurfaceFormat,
    TextureDescriptor, TextureKind,
};

use super::GraphicsResource;

/// A texture resource.
///
/// Textures are created by [`GraphicsDevice::create_texture`] and are
/// reference-counted. A texture whose descriptor carries render-target
/// properties can be bound with
/// [`GraphicsDevice::set_render_targets`].
///
/// # Example
///
/// ```ignore
/// let target = device.create_texture(
///     &TextureDescriptor::new_2d(256, 256, SurfaceFormat::Color)
///         .with_render_target(DepthFormat::Depth24Stencil8, RenderTargetUsage::DiscardContents),
/// )?;
/// device.set_render_target(Some(&target))?;
/// ```
pub struct Texture {
    handle: TextureHandle,
    descriptor: TextureDescriptor,
    level_count: u32,
    disposed: Cell<bool>,
    _not_send: PhantomData<Rc<()>>,
}

impl Texture {
    /// Create a new texture (called by GraphicsDevice).
    pub(crate) fn new(handle: TextureHandle, descriptor: TextureDescriptor) -> Self {
        let level_count = descriptor.level_count();
        Self {
            handle,
            descriptor,
            level_count,
            disposed: Cell::new(false),
            _not_send: PhantomData,
        }
    }

    /// Get the native handle.
    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    /// Get the texture descriptor.
    pub fn descriptor(&self) -> &TextureDescriptor {
        &self.descriptor
    }

    /// Get the texture width.
    pub fn width(&self) -> u32 {
        self.descriptor.width()
    }

    /// Get the texture height.
    pub fn height(&self) -> u32 {
        self.descriptor.height()
    }

    /// Get the surface format.
    pub fn format(&self) -> SurfaceFormat {
        self.descriptor.format
    }

    /// Number of mip levels.
    pub fn level_count(&self) -> u32 {
        self.level_count
    }

    /// Returns true for cube maps.
    pub fn is_cube(&self) -> bool {
        matches!(self.descriptor.kind, TextureKind::Cube { .. })
    }

    /// Render-target properties, if this texture can be bound as a target.
    pub fn render_target(&self) -> Option<&RenderTargetDescriptor> {
        self.descriptor.render_target.as_ref()
    }

    /// Depth-stencil format of the attached buffer (`None` for plain textures).
    pub fn depth_format(&self) -> DepthFormat {
        self.render_target()
            .map_or(DepthFormat::None, |target| target.depth_format)
    }

    /// Bind-time content policy (`PreserveContents` for plain textures).
    pub fn render_target_usage(&self) -> RenderTargetUsage {
        self.render_target()
            .map_or(RenderTargetUsage::PreserveContents, |target| target.usage)
    }

    /// Get the texture label, if set.
    pub fn label(&self) -> Option<&str> {
        self.descriptor.label.as_deref()
    }

    /// Dimensions of mip level `level`.
    pub fn level_size(&self, level: u32) -> (u32, u32) {
        (
            (self.width() >> level).max(1),
            (self.height() >> level).max(1),
        )
    }

    /// Upload pixels to `rect` of mip level `level` (the whole level when
    /// `rect` is `None`).
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::InvalidParameter`] if the level or rectangle
    /// is out of range or `data` is smaller than the region.
    pub fn set_data<C: NativeContext, T: Pod>(
        &self,
        device: &mut GraphicsDevice<C>,
        level: u32,
        rect: Option<Rectangle>,
        data: &[T],
    ) -> GraphicsResult<()> {
        let (rect, size) = self.validate_region(level, rect)?;
        let bytes: &[u8] = bytemuck::cast_slice(data);
        if bytes.len() < size {
            return Err(GraphicsError::InvalidParameter(format!(
                "texture data has {} bytes but the region needs {size}",
                bytes.len()
            )));
        }
        device
            .live_context()?
            .set_texture_data(self.handle, level, rect, &bytes[..size])
    }

    /// Download pixels from `rect` of mip level `level` into `data`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::InvalidParameter`] if the level or rectangle
    /// is out of range or `data` is too small to hold the region.
    pub fn get_data<C: NativeContext, T: Pod>(
        &self,
        device: &mut GraphicsDevice<C>,
        level: u32,
        rect: Option<Rectangle>,
        data: &mut [T],
    ) -> GraphicsResult<()> {
        let (rect, size) = self.validate_region(level, rect)?;
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(data);
        if bytes.len() < size {
            return Err(GraphicsError::InvalidParameter(format!(
                "destination has {} bytes but the region needs {size}",
                bytes.len()
            )));
        }
        device
            .live_context()?
            .get_texture_data(self.handle, level, rect, &mut bytes[..size])
    }

    fn validate_region(&self, level: u32, rect: Option<Rectangle>) -> GraphicsResult<(Rectangle, usize)> {
        if self.disposed.get() {
            return Err(GraphicsError::Disposed("texture"));
        }
        if level >= self.level_count {
            return Err(GraphicsError::InvalidParameter(format!(
                "mip level {level} out of range ({} levels)",
                self.level_count
            )));
        }
        let (width, height) = self.level_size(level);
        let rect = rect.unwrap_or_else(|| Rectangle::from_dimensions(width as i32, height as i32));
        let fits = rect.x >= 0
            && rect.y >= 0
            && rect.width > 0
            && rect.height > 0
            && i64::from(rect.x) + i64::from(rect.width) <= i64::from(width)
            && i64::from(rect.y) + i64::from(rect.height) <= i64::from(height);
        if !fits {
            return Err(GraphicsError::InvalidParameter(format!(
                "rectangle {rect:?} outside {width}x{height} level {level}"
            )));
        }
        let size = self
            .format()
            .data_size(rect.width as u32, rect.height as u32);
        Ok((rect, size))
    }
}

impl GraphicsResource for Texture {
    fn dispose(&self, context: &mut dyn NativeContext) {
        if !self.disposed.replace(true) {
            context.delete_texture(self.handle);
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        if !self.disposed.get() {
            log::warn!(
                "Texture {:?} ({:?}) dropped without dispose",
                self.label(),
                self.handle
            );
        }
    }
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("kind", &self.descriptor.kind)
            .field("format", &self.descriptor.format)
            .field("levels", &self.level_count)
            .field("label", &self.descriptor.label)
            .finish()
    }
}

// Textures are shared through `Rc` and use `Cell`; they stay on the device's thread.
static_assertions::assert_not_impl_any!(Texture: Send, Sync);

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use crate::backend::{DummyBackend, NativeCall};

    fn texture(descriptor: TextureDescriptor) -> Texture {
        Texture::new(TextureHandle::from_raw(7), descriptor)
    }

    #[test]
    fn test_texture_debug() {
        let tex = texture(TextureDescriptor::new_2d(1920, 1080, SurfaceFormat::Color));
        let debug = format!("{:?}", tex);
        assert!(debug.contains("Texture"));
        assert!(debug.contains("1920"));
        tex.disposed.set(true);
    }

    #[test]
    fn test_level_sizes() {
        let tex = texture(TextureDescriptor::new_2d(64, 16, SurfaceFormat::Color).with_mipmaps());
        assert_eq!(tex.level_count(), 7);
        assert_eq!(tex.level_size(0), (64, 16));
        assert_eq!(tex.level_size(3), (8, 2));
        assert_eq!(tex.level_size(6), (1, 1));
        tex.disposed.set(true);
    }

    #[test]
    fn test_render_target_properties() {
        let plain = texture(TextureDescriptor::new_cube(32, SurfaceFormat::Color));
        assert!(plain.is_cube());
        assert_eq!(plain.depth_format(), DepthFormat::None);
        assert!(plain.render_target().is_none());
        plain.disposed.set(true);

        let target = texture(
            TextureDescriptor::new_2d(8, 8, SurfaceFormat::Color)
                .with_render_target(DepthFormat::Depth16, RenderTargetUsage::DiscardContents),
        );
        assert_eq!(target.depth_format(), DepthFormat::Depth16);
        assert_eq!(
            target.render_target_usage(),
            RenderTargetUsage::DiscardContents
        );
        target.disposed.set(true);
    }

    #[test]
    fn test_region_extent_overflow_rejected() {
        let tex = texture(TextureDescriptor::new_2d(4, 4, SurfaceFormat::Color));
        for rect in [
            Rectangle::new(1, 0, i32::MAX, 1),
            Rectangle::new(0, i32::MAX, 1, 1),
            Rectangle::new(i32::MAX, i32::MAX, i32::MAX, i32::MAX),
        ] {
            let err = tex.validate_region(0, Some(rect)).unwrap_err();
            assert!(matches!(err, GraphicsError::InvalidParameter(_)));
        }
        let (rect, size) = tex.validate_region(0, Some(Rectangle::new(2, 2, 2, 2))).unwrap();
        assert_eq!(rect, Rectangle::new(2, 2, 2, 2));
        assert_eq!(size, 16);
        tex.disposed.set(true);
    }

    #[test]
    fn test_dispose_once() {
        let mut backend = DummyBackend::new();
        let tex = texture(TextureDescriptor::new_2d(4, 4, SurfaceFormat::Color));
        tex.dispose(&mut backend);
        tex.dispose(&mut backend);
        assert!(tex.is_disposed());
        assert_eq!(
            backend.calls(),
            &[NativeCall::DeleteTexture(TextureHandle::from_raw(7))]
        );
    }
}
