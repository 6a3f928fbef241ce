//! Mapping tables between effect compiler enumerations and device enums.
//!
//! Each table is a fixed-size array indexed by the compiler's raw code. A
//! `None` slot is a code the device cannot express; looking it up is a
//! compatibility error.

use static_assertions::const_assert_eq;
use stamen_core::{
    Blend, BlendFunction, CompareFunction, CullMode, FillMode, FilterAxis, StencilOperation,
    TextureAddressMode,
};

use crate::error::{GraphicsError, GraphicsResult};

use super::codes::{symbol_class, symbol_type, z_buffer_type};
use super::parameter::{ParameterClass, ParameterType};

/// A compiler-to-device enumeration mapping.
#[derive(Debug)]
pub struct EnumTable<T: 'static> {
    name: &'static str,
    entries: &'static [Option<T>],
}

impl<T: Copy + PartialEq> EnumTable<T> {
    const fn new(name: &'static str, entries: &'static [Option<T>]) -> Self {
        Self { name, entries }
    }

    /// Human-readable table name, used in error messages.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Map a raw compiler code to its device value.
    pub fn get(&self, raw: u32) -> GraphicsResult<T> {
        self.entries
            .get(raw as usize)
            .copied()
            .flatten()
            .ok_or(GraphicsError::UnmappedEnum {
                table: self.name,
                value: raw,
            })
    }

    /// The lowest raw code mapping to `value`.
    pub fn code_of(&self, value: T) -> Option<u32> {
        self.entries
            .iter()
            .position(|entry| *entry == Some(value))
            .map(|index| index as u32)
    }

    /// Every mapped `(raw, value)` pair, in code order.
    pub fn domain(&self) -> impl Iterator<Item = (u32, T)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| entry.map(|value| (index as u32, value)))
    }
}

const SYMBOL_CLASS_ENTRIES: &[Option<ParameterClass>] = &[
    Some(ParameterClass::Scalar),
    Some(ParameterClass::Vector),
    Some(ParameterClass::Matrix),
    Some(ParameterClass::Matrix),
    Some(ParameterClass::Object),
    Some(ParameterClass::Struct),
];
const_assert_eq!(SYMBOL_CLASS_ENTRIES.len(), symbol_class::STRUCT as usize + 1);

const SYMBOL_TYPE_ENTRIES: &[Option<ParameterType>] = &[
    Some(ParameterType::Void),
    Some(ParameterType::Bool),
    Some(ParameterType::Int32),
    Some(ParameterType::Single),
    Some(ParameterType::String),
    Some(ParameterType::Texture),
    Some(ParameterType::Texture1D),
    Some(ParameterType::Texture2D),
    Some(ParameterType::Texture3D),
    Some(ParameterType::TextureCube),
    // Samplers, shaders and fragments never become parameters.
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
];
const_assert_eq!(SYMBOL_TYPE_ENTRIES.len(), symbol_type::UNSUPPORTED as usize + 1);

const BLEND_MODE_ENTRIES: &[Option<Blend>] = &[
    None,
    Some(Blend::Zero),
    Some(Blend::One),
    Some(Blend::SourceColor),
    Some(Blend::InverseSourceColor),
    Some(Blend::SourceAlpha),
    Some(Blend::InverseSourceAlpha),
    Some(Blend::DestinationAlpha),
    Some(Blend::InverseDestinationAlpha),
    Some(Blend::DestinationColor),
    Some(Blend::InverseDestinationColor),
    Some(Blend::SourceAlphaSaturation),
    // BOTHSRCALPHA, BOTHINVSRCALPHA
    None,
    None,
    Some(Blend::BlendFactor),
    Some(Blend::InverseBlendFactor),
    // SRCCOLOR2, INVSRCCOLOR2
    None,
    None,
];
const_assert_eq!(BLEND_MODE_ENTRIES.len(), 18);

const BLEND_OP_ENTRIES: &[Option<BlendFunction>] = &[
    None,
    Some(BlendFunction::Add),
    Some(BlendFunction::Subtract),
    Some(BlendFunction::ReverseSubtract),
    Some(BlendFunction::Min),
    Some(BlendFunction::Max),
];
const_assert_eq!(BLEND_OP_ENTRIES.len(), 6);

const COMPARE_FUNC_ENTRIES: &[Option<CompareFunction>] = &[
    None,
    Some(CompareFunction::Never),
    Some(CompareFunction::Less),
    Some(CompareFunction::Equal),
    Some(CompareFunction::LessEqual),
    Some(CompareFunction::Greater),
    Some(CompareFunction::NotEqual),
    Some(CompareFunction::GreaterEqual),
    Some(CompareFunction::Always),
];
const_assert_eq!(COMPARE_FUNC_ENTRIES.len(), 9);

const STENCIL_OP_ENTRIES: &[Option<StencilOperation>] = &[
    None,
    Some(StencilOperation::Keep),
    Some(StencilOperation::Zero),
    Some(StencilOperation::Replace),
    Some(StencilOperation::IncrementSaturation),
    Some(StencilOperation::DecrementSaturation),
    Some(StencilOperation::Invert),
    Some(StencilOperation::Increment),
    Some(StencilOperation::Decrement),
];
const_assert_eq!(STENCIL_OP_ENTRIES.len(), 9);

const CULL_MODE_ENTRIES: &[Option<CullMode>] = &[
    None,
    Some(CullMode::None),
    Some(CullMode::CullClockwiseFace),
    Some(CullMode::CullCounterClockwiseFace),
];
const_assert_eq!(CULL_MODE_ENTRIES.len(), 4);

const FILL_MODE_ENTRIES: &[Option<FillMode>] = &[
    None,
    // POINT
    None,
    Some(FillMode::WireFrame),
    Some(FillMode::Solid),
];
const_assert_eq!(FILL_MODE_ENTRIES.len(), 4);

const TEXTURE_ADDRESS_ENTRIES: &[Option<TextureAddressMode>] = &[
    None,
    Some(TextureAddressMode::Wrap),
    Some(TextureAddressMode::Mirror),
    Some(TextureAddressMode::Clamp),
    // BORDER, MIRRORONCE
    None,
    None,
];
const_assert_eq!(TEXTURE_ADDRESS_ENTRIES.len(), 6);

const TEXTURE_FILTER_ENTRIES: &[Option<FilterAxis>] = &[
    // NONE behaves as point sampling.
    Some(FilterAxis::Point),
    Some(FilterAxis::Point),
    Some(FilterAxis::Linear),
    Some(FilterAxis::Anisotropic),
    None,
    None,
    // PYRAMIDALQUAD, GAUSSIANQUAD, CONVOLUTIONMONO
    None,
    None,
    None,
];
const_assert_eq!(TEXTURE_FILTER_ENTRIES.len(), 9);

pub static SYMBOL_CLASS: EnumTable<ParameterClass> =
    EnumTable::new("symbol class", SYMBOL_CLASS_ENTRIES);
pub static SYMBOL_TYPE: EnumTable<ParameterType> =
    EnumTable::new("symbol type", SYMBOL_TYPE_ENTRIES);
pub static BLEND_MODE: EnumTable<Blend> = EnumTable::new("blend mode", BLEND_MODE_ENTRIES);
pub static BLEND_OP: EnumTable<BlendFunction> = EnumTable::new("blend op", BLEND_OP_ENTRIES);
pub static COMPARE_FUNC: EnumTable<CompareFunction> =
    EnumTable::new("compare function", COMPARE_FUNC_ENTRIES);
pub static STENCIL_OP: EnumTable<StencilOperation> =
    EnumTable::new("stencil op", STENCIL_OP_ENTRIES);
pub static CULL_MODE: EnumTable<CullMode> = EnumTable::new("cull mode", CULL_MODE_ENTRIES);
pub static FILL_MODE: EnumTable<FillMode> = EnumTable::new("fill mode", FILL_MODE_ENTRIES);
pub static TEXTURE_ADDRESS: EnumTable<TextureAddressMode> =
    EnumTable::new("texture address", TEXTURE_ADDRESS_ENTRIES);
pub static TEXTURE_FILTER: EnumTable<FilterAxis> =
    EnumTable::new("texture filter", TEXTURE_FILTER_ENTRIES);

/// Whether a z-enable code turns depth testing on. Only `TRUE` does; `WHR`
/// (w-buffering) has no device equivalent and disables the test.
pub fn z_buffer_enabled(raw: u32) -> GraphicsResult<bool> {
    match raw {
        z_buffer_type::TRUE => Ok(true),
        z_buffer_type::FALSE | z_buffer_type::WHR => Ok(false),
        value => Err(GraphicsError::UnmappedEnum {
            table: "z-buffer type",
            value,
        }),
    }
}
