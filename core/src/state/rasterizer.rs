//! Rasterizer state aggregate.

/// Which triangle winding is culled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullMode {
    /// Draw both faces.
    None,
    /// Cull clockwise-wound triangles.
    CullClockwiseFace,
    /// Cull counter-clockwise-wound triangles.
    CullCounterClockwiseFace,
}

/// Polygon fill mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FillMode {
    /// Filled triangles.
    Solid,
    /// Triangle edges only.
    WireFrame,
}

/// Rasterizer configuration.
///
/// The native layer resolves the effective winding of this state against the
/// current render-target binding, so it is committed lazily before each draw.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterizerState {
    pub cull_mode: CullMode,
    pub fill_mode: FillMode,
    pub depth_bias: f32,
    pub slope_scale_depth_bias: f32,
    pub multi_sample_anti_alias: bool,
    pub scissor_test_enable: bool,
}

impl RasterizerState {
    /// No culling.
    pub fn cull_none() -> Self {
        Self {
            cull_mode: CullMode::None,
            ..Self::default()
        }
    }

    /// Cull clockwise faces.
    pub fn cull_clockwise() -> Self {
        Self {
            cull_mode: CullMode::CullClockwiseFace,
            ..Self::default()
        }
    }

    /// Cull counter-clockwise faces (the default).
    pub fn cull_counter_clockwise() -> Self {
        Self::default()
    }
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self {
            cull_mode: CullMode::CullCounterClockwiseFace,
            fill_mode: FillMode::Solid,
            depth_bias: 0.0,
            slope_scale_depth_bias: 0.0,
            multi_sample_anti_alias: true,
            scissor_test_enable: false,
        }
    }
}
