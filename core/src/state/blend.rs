//! Blend state aggregate.

use bitflags::bitflags;

use crate::color::Color;

/// Blend factor applied to a source or destination color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Blend {
    /// (1, 1, 1, 1)
    One,
    /// (0, 0, 0, 0)
    Zero,
    /// Source color.
    SourceColor,
    /// One minus source color.
    InverseSourceColor,
    /// Source alpha.
    SourceAlpha,
    /// One minus source alpha.
    InverseSourceAlpha,
    /// Destination color.
    DestinationColor,
    /// One minus destination color.
    InverseDestinationColor,
    /// Destination alpha.
    DestinationAlpha,
    /// One minus destination alpha.
    InverseDestinationAlpha,
    /// The constant blend factor.
    BlendFactor,
    /// One minus the constant blend factor.
    InverseBlendFactor,
    /// min(source alpha, 1 - destination alpha).
    SourceAlphaSaturation,
}

/// How source and destination terms are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFunction {
    /// source + destination
    Add,
    /// source - destination
    Subtract,
    /// destination - source
    ReverseSubtract,
    /// max(source, destination)
    Max,
    /// min(source, destination)
    Min,
}

bitflags! {
    /// Color channels written to a render target.
    ///
    /// Bit layout matches the packed channel mask reported by the effect
    /// compiler (red = bit 0 .. alpha = bit 3).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColorWriteChannels: u32 {
        /// Red channel.
        const RED = 1 << 0;
        /// Green channel.
        const GREEN = 1 << 1;
        /// Blue channel.
        const BLUE = 1 << 2;
        /// Alpha channel.
        const ALPHA = 1 << 3;
        /// All channels.
        const ALL = Self::RED.bits() | Self::GREEN.bits() | Self::BLUE.bits() | Self::ALPHA.bits();
    }
}

/// Blend configuration for all bound render targets.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendState {
    /// Combination function for the alpha channel.
    pub alpha_blend_function: BlendFunction,
    /// Destination factor for the alpha channel.
    pub alpha_destination_blend: Blend,
    /// Source factor for the alpha channel.
    pub alpha_source_blend: Blend,
    /// Combination function for the color channels.
    pub color_blend_function: BlendFunction,
    /// Destination factor for the color channels.
    pub color_destination_blend: Blend,
    /// Source factor for the color channels.
    pub color_source_blend: Blend,
    /// Write mask of the first render target.
    pub color_write_channels: ColorWriteChannels,
    /// Write mask of the second render target.
    pub color_write_channels1: ColorWriteChannels,
    /// Write mask of the third render target.
    pub color_write_channels2: ColorWriteChannels,
    /// Write mask of the fourth render target.
    pub color_write_channels3: ColorWriteChannels,
    /// Constant used by [`Blend::BlendFactor`].
    pub blend_factor: Color,
    /// Sample coverage mask.
    pub multi_sample_mask: i32,
}

impl BlendState {
    fn with_factors(source: Blend, destination: Blend) -> Self {
        Self {
            alpha_source_blend: source,
            alpha_destination_blend: destination,
            color_source_blend: source,
            color_destination_blend: destination,
            ..Self::default()
        }
    }

    /// Overwrite the destination (`One`, `Zero`).
    pub fn opaque() -> Self {
        Self::with_factors(Blend::One, Blend::Zero)
    }

    /// Premultiplied alpha blending.
    pub fn alpha_blend() -> Self {
        Self::with_factors(Blend::One, Blend::InverseSourceAlpha)
    }

    /// Additive blending.
    pub fn additive() -> Self {
        Self::with_factors(Blend::SourceAlpha, Blend::One)
    }

    /// Straight (non-premultiplied) alpha blending.
    pub fn non_premultiplied() -> Self {
        Self::with_factors(Blend::SourceAlpha, Blend::InverseSourceAlpha)
    }
}

impl Default for BlendState {
    fn default() -> Self {
        Self {
            alpha_blend_function: BlendFunction::Add,
            alpha_destination_blend: Blend::Zero,
            alpha_source_blend: Blend::One,
            color_blend_function: BlendFunction::Add,
            color_destination_blend: Blend::Zero,
            color_source_blend: Blend::One,
            color_write_channels: ColorWriteChannels::ALL,
            color_write_channels1: ColorWriteChannels::ALL,
            color_write_channels2: ColorWriteChannels::ALL,
            color_write_channels3: ColorWriteChannels::ALL,
            blend_factor: Color::WHITE,
            multi_sample_mask: -1,
        }
    }
}
