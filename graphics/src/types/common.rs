//! Common types shared across the graphics system.

use bitflags::bitflags;

// ============================================================================
// Viewport
// ============================================================================

/// Viewport configuration for rendering.
///
/// Coordinates are always logical: origin at the top-left corner of the
/// current render target (or of the backbuffer when none is bound). The device
/// performs any vertical flip the native layer needs.
///
/// # Example
///
/// ```ignore
/// let viewport = Viewport::new(0, 0, 1280, 720).with_depth_range(0.0, 0.5);
/// device.set_viewport(viewport);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// X coordinate of the viewport's top-left corner.
    pub x: i32,
    /// Y coordinate of the viewport's top-left corner.
    pub y: i32,
    /// Width of the viewport.
    pub width: i32,
    /// Height of the viewport.
    pub height: i32,
    /// Minimum depth value (default: 0.0).
    pub min_depth: f32,
    /// Maximum depth value (default: 1.0).
    pub max_depth: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

impl Viewport {
    /// Create a new viewport with standard `[0, 1]` depth range.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }

    /// Create a viewport from dimensions with origin at (0, 0).
    pub fn from_dimensions(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Set the depth range.
    pub fn with_depth_range(mut self, min_depth: f32, max_depth: f32) -> Self {
        self.min_depth = min_depth;
        self.max_depth = max_depth;
        self
    }

    /// The rectangle covered by this viewport.
    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(self.x, self.y, self.width, self.height)
    }

    /// Mirror the viewport vertically inside a surface of `surface_height`.
    pub fn flipped(mut self, surface_height: i32) -> Self {
        self.y = surface_height - self.y - self.height;
        self
    }
}

// ============================================================================
// Rectangle
// ============================================================================

/// Integer rectangle, used for scissor clipping and sub-region transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rectangle {
    /// X coordinate of the top-left corner.
    pub x: i32,
    /// Y coordinate of the top-left corner.
    pub y: i32,
    /// Width of the rectangle.
    pub width: i32,
    /// Height of the rectangle.
    pub height: i32,
}

impl Rectangle {
    /// Create a new rectangle.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from dimensions with origin at (0, 0).
    pub fn from_dimensions(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Mirror the rectangle vertically inside a surface of `surface_height`.
    pub fn flipped(mut self, surface_height: i32) -> Self {
        self.y = surface_height - self.y - self.height;
        self
    }
}

// ============================================================================
// Clear
// ============================================================================

bitflags! {
    /// Buffers affected by a clear.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearOptions: u32 {
        /// Color target(s).
        const TARGET = 1 << 0;
        /// Depth buffer.
        const DEPTH_BUFFER = 1 << 1;
        /// Stencil buffer.
        const STENCIL = 1 << 2;
    }
}

// ============================================================================
// Primitives
// ============================================================================

/// Topology of the primitives submitted by a draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Independent triangles.
    TriangleList,
    /// Triangles sharing edges with their predecessor.
    TriangleStrip,
    /// Independent line segments.
    LineList,
    /// Connected line segments.
    LineStrip,
}

impl PrimitiveType {
    /// Number of vertices (or indices) consumed by `primitive_count` primitives.
    pub fn element_count(self, primitive_count: u32) -> u32 {
        match self {
            Self::LineList => primitive_count * 2,
            Self::LineStrip => primitive_count + 1,
            Self::TriangleList => primitive_count * 3,
            Self::TriangleStrip => primitive_count + 2,
        }
    }
}

/// Width of an index buffer element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexElementSize {
    /// `u16` indices.
    SixteenBits,
    /// `u32` indices.
    ThirtyTwoBits,
}

impl IndexElementSize {
    /// Size of one index in bytes.
    pub fn size_in_bytes(self) -> u32 {
        match self {
            Self::SixteenBits => 2,
            Self::ThirtyTwoBits => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PrimitiveType::LineList, 4, 8)]
    #[case(PrimitiveType::LineStrip, 4, 5)]
    #[case(PrimitiveType::TriangleList, 4, 12)]
    #[case(PrimitiveType::TriangleStrip, 4, 6)]
    fn test_element_count(
        #[case] primitive: PrimitiveType,
        #[case] primitives: u32,
        #[case] expected: u32,
    ) {
        assert_eq!(primitive.element_count(primitives), expected);
    }

    #[test]
    fn test_viewport_flip() {
        let viewport = Viewport::new(10, 20, 100, 50).flipped(600);
        assert_eq!(viewport.y, 530);
        assert_eq!(viewport.flipped(600).y, 20);
    }

    #[test]
    fn test_scissor_flip() {
        let rect = Rectangle::new(0, 0, 64, 64).flipped(480);
        assert_eq!(rect, Rectangle::new(0, 416, 64, 64));
    }
}
