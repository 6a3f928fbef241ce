//! Backbuffer configuration.

use super::{DepthFormat, RenderTargetUsage, SurfaceFormat};

/// Configuration of the default render target.
///
/// Passed to the device on creation and again on every
/// [`reset`](crate::GraphicsDevice::reset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PresentationParameters {
    /// Backbuffer width in pixels.
    pub back_buffer_width: i32,
    /// Backbuffer height in pixels.
    pub back_buffer_height: i32,
    /// Backbuffer color format.
    pub back_buffer_format: SurfaceFormat,
    /// Backbuffer depth-stencil format.
    pub depth_stencil_format: DepthFormat,
    /// Content policy applied when the backbuffer becomes the target again.
    pub render_target_usage: RenderTargetUsage,
}

impl Default for PresentationParameters {
    fn default() -> Self {
        Self {
            back_buffer_width: 800,
            back_buffer_height: 480,
            back_buffer_format: SurfaceFormat::Color,
            depth_stencil_format: DepthFormat::None,
            render_target_usage: RenderTargetUsage::DiscardContents,
        }
    }
}

impl PresentationParameters {
    /// Create parameters for a backbuffer of the given size.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            back_buffer_width: width,
            back_buffer_height: height,
            ..Self::default()
        }
    }

    /// Set the depth-stencil format.
    pub fn with_depth_format(mut self, format: DepthFormat) -> Self {
        self.depth_stencil_format = format;
        self
    }

    /// Set the render target usage policy.
    pub fn with_usage(mut self, usage: RenderTargetUsage) -> Self {
        self.render_target_usage = usage;
        self
    }
}
