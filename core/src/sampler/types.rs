//! Sampler state and filter/address mode definitions.

/// Texture address mode (wrapping behavior).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureAddressMode {
    /// Repeat.
    #[default]
    Wrap,
    /// Clamp to edge.
    Clamp,
    /// Mirrored repeat.
    Mirror,
}

/// Filtering applied on a single sampling axis (magnification, minification
/// or mip selection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterAxis {
    /// Nearest neighbor.
    Point,
    /// Linear interpolation.
    Linear,
    /// Anisotropic filtering.
    Anisotropic,
}

/// Composite texture filter.
///
/// Each variant fixes the magnification, minification and mip filters at once.
/// Use [`TextureFilter::axes`] and [`TextureFilter::from_axes`] to move between
/// the composite and the per-axis representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFilter {
    /// Linear on every axis.
    #[default]
    Linear,
    /// Point on every axis.
    Point,
    /// Anisotropic min/mag, linear mip.
    Anisotropic,
    /// Linear min/mag, point mip.
    LinearMipPoint,
    /// Point min/mag, linear mip.
    PointMipLinear,
    /// Linear min, point mag, linear mip.
    MinLinearMagPointMipLinear,
    /// Linear min, point mag, point mip.
    MinLinearMagPointMipPoint,
    /// Point min, linear mag, linear mip.
    MinPointMagLinearMipLinear,
    /// Point min, linear mag, point mip.
    MinPointMagLinearMipPoint,
}

/// Per-axis view of a [`TextureFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterAxes {
    pub mag: FilterAxis,
    pub min: FilterAxis,
    pub mip: FilterAxis,
}

impl TextureFilter {
    /// Decompose into magnification, minification and mip filters.
    pub fn axes(self) -> FilterAxes {
        use FilterAxis::{Anisotropic, Linear, Point};
        let (mag, min, mip) = match self {
            Self::Linear => (Linear, Linear, Linear),
            Self::Point => (Point, Point, Point),
            Self::Anisotropic => (Anisotropic, Anisotropic, Linear),
            Self::LinearMipPoint => (Linear, Linear, Point),
            Self::PointMipLinear => (Point, Point, Linear),
            Self::MinLinearMagPointMipLinear => (Point, Linear, Linear),
            Self::MinLinearMagPointMipPoint => (Point, Linear, Point),
            Self::MinPointMagLinearMipLinear => (Linear, Point, Linear),
            Self::MinPointMagLinearMipPoint => (Linear, Point, Point),
        };
        FilterAxes { mag, min, mip }
    }

    /// Combine per-axis filters into the closest composite filter.
    ///
    /// Anisotropy on the magnification or minification axis selects
    /// [`TextureFilter::Anisotropic`]; an anisotropic mip axis counts as linear.
    pub fn from_axes(axes: FilterAxes) -> Self {
        use FilterAxis::{Anisotropic, Linear, Point};
        if axes.mag == Anisotropic || axes.min == Anisotropic {
            return Self::Anisotropic;
        }
        let mip_linear = axes.mip != Point;
        match (axes.mag, axes.min, mip_linear) {
            (Linear, Linear, true) => Self::Linear,
            (Linear, Linear, false) => Self::LinearMipPoint,
            (Point, Point, true) => Self::PointMipLinear,
            (Point, Point, false) => Self::Point,
            (Point, Linear, true) => Self::MinLinearMagPointMipLinear,
            (Point, Linear, false) => Self::MinLinearMagPointMipPoint,
            (Linear, Point, true) => Self::MinPointMagLinearMipLinear,
            (Linear, Point, false) => Self::MinPointMagLinearMipPoint,
            (Anisotropic, _, _) | (_, Anisotropic, _) => Self::Anisotropic,
        }
    }
}

/// Sampler configuration bound to one texture slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerState {
    /// Composite filter.
    pub filter: TextureFilter,
    /// Address mode for U coordinate.
    pub address_u: TextureAddressMode,
    /// Address mode for V coordinate.
    pub address_v: TextureAddressMode,
    /// Address mode for W coordinate.
    pub address_w: TextureAddressMode,
    /// Maximum anisotropy level.
    pub max_anisotropy: i32,
    /// Index of the largest mip level that may be sampled.
    pub max_mip_level: i32,
    /// Bias added to the computed mip level.
    pub mip_map_level_of_detail_bias: f32,
}

impl SamplerState {
    fn with(filter: TextureFilter, address: TextureAddressMode) -> Self {
        Self {
            filter,
            address_u: address,
            address_v: address,
            address_w: address,
            ..Self::default()
        }
    }

    /// Linear filtering, wrapped.
    pub fn linear_wrap() -> Self {
        Self::with(TextureFilter::Linear, TextureAddressMode::Wrap)
    }

    /// Linear filtering, clamped.
    pub fn linear_clamp() -> Self {
        Self::with(TextureFilter::Linear, TextureAddressMode::Clamp)
    }

    /// Point filtering, wrapped.
    pub fn point_wrap() -> Self {
        Self::with(TextureFilter::Point, TextureAddressMode::Wrap)
    }

    /// Point filtering, clamped.
    pub fn point_clamp() -> Self {
        Self::with(TextureFilter::Point, TextureAddressMode::Clamp)
    }

    /// Anisotropic filtering, wrapped.
    pub fn anisotropic_wrap() -> Self {
        Self::with(TextureFilter::Anisotropic, TextureAddressMode::Wrap)
    }

    /// Anisotropic filtering, clamped.
    pub fn anisotropic_clamp() -> Self {
        Self::with(TextureFilter::Anisotropic, TextureAddressMode::Clamp)
    }

    /// Set address mode for all coordinates.
    pub fn with_address_mode(mut self, mode: TextureAddressMode) -> Self {
        self.address_u = mode;
        self.address_v = mode;
        self.address_w = mode;
        self
    }
}

impl Default for SamplerState {
    fn default() -> Self {
        Self {
            filter: TextureFilter::Linear,
            address_u: TextureAddressMode::Wrap,
            address_v: TextureAddressMode::Wrap,
            address_w: TextureAddressMode::Wrap,
            max_anisotropy: 4,
            max_mip_level: 0,
            mip_map_level_of_detail_bias: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TextureFilter::Linear)]
    #[case(TextureFilter::Point)]
    #[case(TextureFilter::Anisotropic)]
    #[case(TextureFilter::LinearMipPoint)]
    #[case(TextureFilter::PointMipLinear)]
    #[case(TextureFilter::MinLinearMagPointMipLinear)]
    #[case(TextureFilter::MinLinearMagPointMipPoint)]
    #[case(TextureFilter::MinPointMagLinearMipLinear)]
    #[case(TextureFilter::MinPointMagLinearMipPoint)]
    fn test_filter_axes_are_lossless(#[case] filter: TextureFilter) {
        assert_eq!(TextureFilter::from_axes(filter.axes()), filter);
    }

    #[test]
    fn test_anisotropic_on_one_axis_wins() {
        let axes = FilterAxes {
            mag: FilterAxis::Point,
            min: FilterAxis::Anisotropic,
            mip: FilterAxis::Point,
        };
        assert_eq!(TextureFilter::from_axes(axes), TextureFilter::Anisotropic);
    }

    #[test]
    fn test_presets() {
        let s = SamplerState::point_clamp();
        assert_eq!(s.filter, TextureFilter::Point);
        assert_eq!(s.address_w, TextureAddressMode::Clamp);
        assert_eq!(SamplerState::default(), SamplerState::linear_wrap());
    }
}
