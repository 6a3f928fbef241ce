//! Texture types and descriptors.

/// Pixel format of a color surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SurfaceFormat {
    /// 8-bit RGBA, unsigned normalized.
    #[default]
    Color,
    /// 5-6-5 packed BGR.
    Bgr565,
    /// 5-5-5-1 packed BGRA.
    Bgra5551,
    /// 4-4-4-4 packed BGRA.
    Bgra4444,
    /// BC1 block compression.
    Dxt1,
    /// BC2 block compression.
    Dxt3,
    /// BC3 block compression.
    Dxt5,
    /// 8-bit alpha only.
    Alpha8,
    /// 32-bit float, red only.
    Single,
    /// 32-bit float RG.
    Vector2,
    /// 32-bit float RGBA.
    Vector4,
    /// 16-bit float, red only.
    HalfSingle,
    /// 16-bit float RG.
    HalfVector2,
    /// 16-bit float RGBA.
    HalfVector4,
}

impl SurfaceFormat {
    /// Returns true for 4x4 block compressed formats.
    pub fn is_block_compressed(self) -> bool {
        matches!(self, Self::Dxt1 | Self::Dxt3 | Self::Dxt5)
    }

    /// Size in bytes of one pixel, or of one 4x4 block for compressed formats.
    pub fn block_size(self) -> u32 {
        match self {
            Self::Alpha8 => 1,
            Self::Bgr565 | Self::Bgra5551 | Self::Bgra4444 | Self::HalfSingle => 2,
            Self::Color | Self::Single | Self::HalfVector2 => 4,
            Self::Dxt1 | Self::Vector2 | Self::HalfVector4 => 8,
            Self::Dxt3 | Self::Dxt5 | Self::Vector4 => 16,
        }
    }

    /// Bytes needed to hold a `width` x `height` region in this format.
    pub fn data_size(self, width: u32, height: u32) -> usize {
        let (w, h) = if self.is_block_compressed() {
            (width.div_ceil(4), height.div_ceil(4))
        } else {
            (width, height)
        };
        w as usize * h as usize * self.block_size() as usize
    }
}

/// Format of the depth-stencil buffer attached to a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DepthFormat {
    /// No depth-stencil buffer.
    #[default]
    None,
    /// 16-bit depth.
    Depth16,
    /// 24-bit depth.
    Depth24,
    /// 24-bit depth with 8-bit stencil.
    Depth24Stencil8,
}

impl DepthFormat {
    /// Returns true if this format has a depth component.
    pub fn has_depth(self) -> bool {
        self != Self::None
    }

    /// Returns true if this format has a stencil component.
    pub fn has_stencil(self) -> bool {
        self == Self::Depth24Stencil8
    }
}

/// What happens to a surface's contents when it is bound as a render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderTargetUsage {
    /// Contents are cleared on bind.
    #[default]
    DiscardContents,
    /// Contents are kept across binds.
    PreserveContents,
    /// Platform decides; treated as preserve.
    PlatformContents,
}

/// Face of a cube map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeMapFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

/// Shape of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    /// Two-dimensional texture.
    Texture2d { width: u32, height: u32 },
    /// Cube map with square faces.
    Cube { size: u32 },
}

/// Render-target properties of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RenderTargetDescriptor {
    /// Attached depth-stencil buffer format.
    pub depth_format: DepthFormat,
    /// Bind-time content policy.
    pub usage: RenderTargetUsage,
}

/// Descriptor for creating a texture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureDescriptor {
    /// Debug label for the texture.
    pub label: Option<String>,
    /// Shape and size.
    pub kind: TextureKind,
    /// Whether a full mip chain is allocated.
    pub mipmap: bool,
    /// Surface format.
    pub format: SurfaceFormat,
    /// Present when the texture can be bound as a render target.
    pub render_target: Option<RenderTargetDescriptor>,
}

impl TextureDescriptor {
    /// Create a new 2D texture descriptor.
    pub fn new_2d(width: u32, height: u32, format: SurfaceFormat) -> Self {
        Self {
            label: None,
            kind: TextureKind::Texture2d { width, height },
            mipmap: false,
            format,
            render_target: None,
        }
    }

    /// Create a new cube texture descriptor.
    pub fn new_cube(size: u32, format: SurfaceFormat) -> Self {
        Self {
            label: None,
            kind: TextureKind::Cube { size },
            mipmap: false,
            format,
            render_target: None,
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Allocate a full mip chain.
    pub fn with_mipmaps(mut self) -> Self {
        self.mipmap = true;
        self
    }

    /// Make the texture bindable as a render target.
    pub fn with_render_target(mut self, depth_format: DepthFormat, usage: RenderTargetUsage) -> Self {
        self.render_target = Some(RenderTargetDescriptor {
            depth_format,
            usage,
        });
        self
    }

    /// Width of the top level.
    pub fn width(&self) -> u32 {
        match self.kind {
            TextureKind::Texture2d { width, .. } => width,
            TextureKind::Cube { size } => size,
        }
    }

    /// Height of the top level.
    pub fn height(&self) -> u32 {
        match self.kind {
            TextureKind::Texture2d { height, .. } => height,
            TextureKind::Cube { size } => size,
        }
    }

    /// Number of mip levels this descriptor allocates.
    pub fn level_count(&self) -> u32 {
        if self.mipmap {
            calculate_mip_levels(self.width(), self.height())
        } else {
            1
        }
    }
}

/// Length of a full mip chain for a `width` x `height` surface.
pub fn calculate_mip_levels(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    u32::BITS - largest.leading_zeros()
}
