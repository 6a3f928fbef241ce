//! Pass state-delta translation.
//!
//! Turns the render and sampler state changes reported for an applied pass
//! into whole state objects, seeded from the device's current state. The
//! translation is pure: nothing reaches the device until every entry has been
//! translated.

use std::collections::HashMap;
use std::rc::Rc;

use bitflags::bitflags;
use stamen_core::{
    Blend, BlendState, Color, ColorWriteChannels, DepthStencilState, FilterAxes, FilterAxis,
    RasterizerState, SamplerState, TextureFilter,
};

use crate::device::{PipelineSnapshot, MAX_TEXTURE_SLOTS};
use crate::error::{GraphicsError, GraphicsResult};
use crate::resources::Texture;

use super::codes::{render_state as rs, sampler_state as ss};
use super::descriptor::{EffectState, SamplerStateRegister, StateChanges};
use super::parameter::EffectParameter;
use super::tables::{
    z_buffer_enabled, BLEND_MODE, BLEND_OP, COMPARE_FUNC, CULL_MODE, FILL_MODE, STENCIL_OP,
    TEXTURE_ADDRESS, TEXTURE_FILTER,
};

bitflags! {
    /// Aggregate states touched by a pass.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChangedStates: u8 {
        const BLEND = 1 << 0;
        const DEPTH_STENCIL = 1 << 1;
        const RASTERIZER = 1 << 2;
    }
}

/// New sampler and texture for one register.
#[derive(Debug, Clone)]
pub struct SamplerSlotUpdate {
    pub register: usize,
    /// Replacement sampler state, if any sampler field was reported.
    pub sampler: Option<SamplerState>,
    /// Texture to bind, if the register reported a texture entry.
    pub texture: Option<Option<Rc<Texture>>>,
}

/// Output of [`translate`].
#[derive(Debug, Clone)]
pub struct TranslatedStates {
    pub blend: BlendState,
    pub depth_stencil: DepthStencilState,
    pub rasterizer: RasterizerState,
    pub changed: ChangedStates,
    pub samplers: Vec<SamplerSlotUpdate>,
}

/// Translate a pass's reported state changes against `current`.
///
/// # Errors
///
/// Fails on the first entry with an unknown state type or an unmapped
/// value, and when a texture entry names a sampler missing from
/// `sampler_map`.
pub fn translate(
    changes: &StateChanges,
    current: PipelineSnapshot<'_>,
    sampler_map: &HashMap<String, Rc<EffectParameter>>,
) -> GraphicsResult<TranslatedStates> {
    let mut out = TranslatedStates {
        blend: current.blend.clone(),
        depth_stencil: current.depth_stencil.clone(),
        rasterizer: current.rasterizer.clone(),
        changed: ChangedStates::empty(),
        samplers: Vec::new(),
    };

    for state in &changes.render_state_changes {
        apply_render_state(state, &mut out)?;
    }

    for register in &changes.sampler_state_changes {
        if register.states.is_empty() {
            continue;
        }
        let update = translate_sampler(register, current.sampler_states, sampler_map)?;
        out.samplers.push(update);
    }
    Ok(out)
}

fn code(state: &EffectState) -> GraphicsResult<u32> {
    Ok(state.value.read_i32()? as u32)
}

fn apply_render_state(state: &EffectState, out: &mut TranslatedStates) -> GraphicsResult<()> {
    let blend = &mut out.blend;
    let depth = &mut out.depth_stencil;
    let raster = &mut out.rasterizer;
    let value = &state.value;

    let changed = match state.state_type {
        rs::ZENABLE => {
            depth.depth_buffer_enable = z_buffer_enabled(code(state)?)?;
            ChangedStates::DEPTH_STENCIL
        }
        rs::FILLMODE => {
            raster.fill_mode = FILL_MODE.get(code(state)?)?;
            ChangedStates::RASTERIZER
        }
        rs::ZWRITEENABLE => {
            depth.depth_buffer_write_enable = value.read_bool()?;
            ChangedStates::DEPTH_STENCIL
        }
        rs::SRCBLEND => {
            blend.color_source_blend = BLEND_MODE.get(code(state)?)?;
            ChangedStates::BLEND
        }
        rs::DESTBLEND => {
            blend.color_destination_blend = BLEND_MODE.get(code(state)?)?;
            ChangedStates::BLEND
        }
        rs::SRCBLENDALPHA => {
            blend.alpha_source_blend = BLEND_MODE.get(code(state)?)?;
            ChangedStates::BLEND
        }
        rs::DESTBLENDALPHA => {
            blend.alpha_destination_blend = BLEND_MODE.get(code(state)?)?;
            ChangedStates::BLEND
        }
        rs::ALPHABLENDENABLE => {
            if !value.read_bool()? {
                blend.color_source_blend = Blend::One;
                blend.color_destination_blend = Blend::Zero;
                blend.alpha_source_blend = Blend::One;
                blend.alpha_destination_blend = Blend::Zero;
            }
            ChangedStates::BLEND
        }
        rs::SEPARATEALPHABLENDENABLE | rs::VERTEXSHADER | rs::PIXELSHADER => ChangedStates::empty(),
        rs::CULLMODE => {
            raster.cull_mode = CULL_MODE.get(code(state)?)?;
            ChangedStates::RASTERIZER
        }
        rs::ZFUNC => {
            depth.depth_buffer_function = COMPARE_FUNC.get(code(state)?)?;
            ChangedStates::DEPTH_STENCIL
        }
        rs::STENCILENABLE => {
            depth.stencil_enable = value.read_bool()?;
            ChangedStates::DEPTH_STENCIL
        }
        rs::STENCILFAIL => {
            depth.stencil_fail = STENCIL_OP.get(code(state)?)?;
            ChangedStates::DEPTH_STENCIL
        }
        rs::STENCILZFAIL => {
            depth.stencil_depth_buffer_fail = STENCIL_OP.get(code(state)?)?;
            ChangedStates::DEPTH_STENCIL
        }
        rs::STENCILPASS => {
            depth.stencil_pass = STENCIL_OP.get(code(state)?)?;
            ChangedStates::DEPTH_STENCIL
        }
        rs::STENCILFUNC => {
            depth.stencil_function = COMPARE_FUNC.get(code(state)?)?;
            ChangedStates::DEPTH_STENCIL
        }
        rs::STENCILREF => {
            depth.reference_stencil = value.read_i32()?;
            ChangedStates::DEPTH_STENCIL
        }
        rs::STENCILMASK => {
            depth.stencil_mask = value.read_i32()?;
            ChangedStates::DEPTH_STENCIL
        }
        rs::STENCILWRITEMASK => {
            depth.stencil_write_mask = value.read_i32()?;
            ChangedStates::DEPTH_STENCIL
        }
        rs::TWOSIDEDSTENCILMODE => {
            depth.two_sided_stencil_mode = value.read_bool()?;
            ChangedStates::DEPTH_STENCIL
        }
        rs::CCW_STENCILFAIL => {
            depth.counter_clockwise_stencil_fail = STENCIL_OP.get(code(state)?)?;
            ChangedStates::DEPTH_STENCIL
        }
        rs::CCW_STENCILZFAIL => {
            depth.counter_clockwise_stencil_depth_buffer_fail = STENCIL_OP.get(code(state)?)?;
            ChangedStates::DEPTH_STENCIL
        }
        rs::CCW_STENCILPASS => {
            depth.counter_clockwise_stencil_pass = STENCIL_OP.get(code(state)?)?;
            ChangedStates::DEPTH_STENCIL
        }
        rs::CCW_STENCILFUNC => {
            depth.counter_clockwise_stencil_function = COMPARE_FUNC.get(code(state)?)?;
            ChangedStates::DEPTH_STENCIL
        }
        rs::MULTISAMPLEANTIALIAS => {
            raster.multi_sample_anti_alias = value.read_bool()?;
            ChangedStates::RASTERIZER
        }
        rs::MULTISAMPLEMASK => {
            blend.multi_sample_mask = value.read_i32()?;
            ChangedStates::BLEND
        }
        rs::COLORWRITEENABLE => {
            blend.color_write_channels = ColorWriteChannels::from_bits_truncate(code(state)?);
            ChangedStates::BLEND
        }
        rs::COLORWRITEENABLE1 => {
            blend.color_write_channels1 = ColorWriteChannels::from_bits_truncate(code(state)?);
            ChangedStates::BLEND
        }
        rs::COLORWRITEENABLE2 => {
            blend.color_write_channels2 = ColorWriteChannels::from_bits_truncate(code(state)?);
            ChangedStates::BLEND
        }
        rs::COLORWRITEENABLE3 => {
            blend.color_write_channels3 = ColorWriteChannels::from_bits_truncate(code(state)?);
            ChangedStates::BLEND
        }
        rs::BLENDOP => {
            blend.color_blend_function = BLEND_OP.get(code(state)?)?;
            ChangedStates::BLEND
        }
        rs::BLENDOPALPHA => {
            blend.alpha_blend_function = BLEND_OP.get(code(state)?)?;
            ChangedStates::BLEND
        }
        rs::SCISSORTESTENABLE => {
            raster.scissor_test_enable = value.read_bool()?;
            ChangedStates::RASTERIZER
        }
        rs::DEPTHBIAS => {
            raster.depth_bias = value.read_f32()?;
            ChangedStates::RASTERIZER
        }
        rs::SLOPESCALEDEPTHBIAS => {
            raster.slope_scale_depth_bias = value.read_f32()?;
            ChangedStates::RASTERIZER
        }
        rs::BLENDFACTOR => {
            blend.blend_factor = Color::from_rgba_u32(code(state)?);
            ChangedStates::BLEND
        }
        other => return Err(GraphicsError::UnhandledRenderState(other)),
    };
    out.changed |= changed;
    Ok(())
}

#[derive(Default)]
struct PendingFilter {
    mag: Option<FilterAxis>,
    min: Option<FilterAxis>,
    mip: Option<FilterAxis>,
}

impl PendingFilter {
    fn is_set(&self) -> bool {
        self.mag.is_some() || self.min.is_some() || self.mip.is_some()
    }

    fn resolve(&self, previous: TextureFilter) -> TextureFilter {
        let axes = previous.axes();
        TextureFilter::from_axes(FilterAxes {
            mag: self.mag.unwrap_or(axes.mag),
            min: self.min.unwrap_or(axes.min),
            mip: self.mip.unwrap_or(axes.mip),
        })
    }
}

fn translate_sampler(
    register: &SamplerStateRegister,
    current: &[Rc<SamplerState>],
    sampler_map: &HashMap<String, Rc<EffectParameter>>,
) -> GraphicsResult<SamplerSlotUpdate> {
    let slot = register.sampler_register as usize;
    let seed = current
        .get(slot)
        .filter(|_| slot < MAX_TEXTURE_SLOTS)
        .ok_or_else(|| {
            GraphicsError::MalformedEffect(format!(
                "sampler {:?} uses register {slot}",
                register.sampler_name
            ))
        })?;

    let mut sampler = SamplerState::clone(seed);
    let mut sampler_changed = false;
    let mut texture = None;
    let mut filter = PendingFilter::default();

    for entry in &register.states {
        let value = &entry.value;
        match entry.state_type {
            ss::TEXTURE => {
                let parameter = sampler_map
                    .get(&register.sampler_name)
                    .ok_or_else(|| GraphicsError::SamplerLookupMiss(register.sampler_name.clone()))?;
                texture = Some(parameter.get_value_texture());
                continue;
            }
            ss::ADDRESSU => sampler.address_u = TEXTURE_ADDRESS.get(value.read_i32()? as u32)?,
            ss::ADDRESSV => sampler.address_v = TEXTURE_ADDRESS.get(value.read_i32()? as u32)?,
            ss::ADDRESSW => sampler.address_w = TEXTURE_ADDRESS.get(value.read_i32()? as u32)?,
            ss::MAGFILTER => filter.mag = Some(TEXTURE_FILTER.get(value.read_i32()? as u32)?),
            ss::MINFILTER => filter.min = Some(TEXTURE_FILTER.get(value.read_i32()? as u32)?),
            ss::MIPFILTER => filter.mip = Some(TEXTURE_FILTER.get(value.read_i32()? as u32)?),
            ss::MIPMAPLODBIAS => sampler.mip_map_level_of_detail_bias = value.read_f32()?,
            ss::MAXMIPLEVEL => sampler.max_mip_level = value.read_i32()?,
            ss::MAXANISOTROPY => sampler.max_anisotropy = value.read_i32()?,
            other => return Err(GraphicsError::UnhandledSamplerState(other)),
        }
        sampler_changed = true;
    }

    if filter.is_set() {
        sampler.filter = filter.resolve(seed.filter);
    }

    Ok(SamplerSlotUpdate {
        register: slot,
        sampler: sampler_changed.then_some(sampler),
        texture,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use stamen_core::{CompareFunction, CullMode, FillMode, StencilOperation, TextureAddressMode};

    use super::*;
    use crate::effect::descriptor::EffectSamplerState;
    use crate::effect::parameter::{ParameterClass, ParameterType};

    struct Current {
        blend: BlendState,
        depth_stencil: DepthStencilState,
        rasterizer: RasterizerState,
        samplers: Vec<Rc<SamplerState>>,
    }

    impl Current {
        fn new() -> Self {
            Self {
                blend: BlendState::opaque(),
                depth_stencil: DepthStencilState::none(),
                rasterizer: RasterizerState::cull_counter_clockwise(),
                samplers: (0..MAX_TEXTURE_SLOTS)
                    .map(|_| Rc::new(SamplerState::linear_wrap()))
                    .collect(),
            }
        }

        fn snapshot(&self) -> PipelineSnapshot<'_> {
            PipelineSnapshot {
                blend: &self.blend,
                depth_stencil: &self.depth_stencil,
                rasterizer: &self.rasterizer,
                sampler_states: &self.samplers,
            }
        }
    }

    fn texture_parameter() -> Rc<EffectParameter> {
        Rc::new(EffectParameter {
            name: "Tex".into(),
            semantic: None,
            row_count: 1,
            column_count: 1,
            element_count: 0,
            parameter_class: ParameterClass::Object,
            parameter_type: ParameterType::Texture2D,
            annotations: Vec::new(),
            data: RefCell::new(vec![0; 4]),
            texture: RefCell::new(None),
        })
    }

    fn render(states: Vec<EffectState>) -> StateChanges {
        StateChanges {
            render_state_changes: states,
            sampler_state_changes: Vec::new(),
        }
    }

    #[test]
    fn test_alpha_blend_scenario() {
        let current = Current::new();
        let changes = render(vec![
            EffectState::int(rs::SRCBLEND, 5),
            EffectState::int(rs::DESTBLEND, 6),
            EffectState::int(rs::ZENABLE, 1),
        ]);
        let out = translate(&changes, current.snapshot(), &HashMap::new()).unwrap();
        assert_eq!(out.changed, ChangedStates::BLEND | ChangedStates::DEPTH_STENCIL);
        assert_eq!(out.blend.color_source_blend, Blend::SourceAlpha);
        assert_eq!(out.blend.color_destination_blend, Blend::InverseSourceAlpha);
        assert!(out.depth_stencil.depth_buffer_enable);
        assert_eq!(out.rasterizer, current.rasterizer);
    }

    #[test]
    fn test_depth_stencil_fields() {
        let current = Current::new();
        let changes = render(vec![
            EffectState::bool(rs::STENCILENABLE, true),
            EffectState::int(rs::STENCILFUNC, 3),
            EffectState::int(rs::STENCILPASS, 3),
            EffectState::int(rs::CCW_STENCILFAIL, 8),
            EffectState::int(rs::STENCILREF, 7),
            EffectState::int(rs::ZFUNC, 8),
            EffectState::int(rs::ZENABLE, 2),
        ]);
        let out = translate(&changes, current.snapshot(), &HashMap::new()).unwrap();
        let depth = &out.depth_stencil;
        assert!(depth.stencil_enable);
        assert_eq!(depth.stencil_function, CompareFunction::Equal);
        assert_eq!(depth.stencil_pass, StencilOperation::Replace);
        assert_eq!(depth.counter_clockwise_stencil_fail, StencilOperation::Decrement);
        assert_eq!(depth.reference_stencil, 7);
        assert_eq!(depth.depth_buffer_function, CompareFunction::Always);
        assert!(!depth.depth_buffer_enable);
        assert_eq!(out.changed, ChangedStates::DEPTH_STENCIL);
    }

    #[test]
    fn test_rasterizer_fields() {
        let current = Current::new();
        let changes = render(vec![
            EffectState::int(rs::CULLMODE, 1),
            EffectState::int(rs::FILLMODE, 2),
            EffectState::float(rs::DEPTHBIAS, 0.5),
            EffectState::bool(rs::SCISSORTESTENABLE, true),
        ]);
        let out = translate(&changes, current.snapshot(), &HashMap::new()).unwrap();
        assert_eq!(out.rasterizer.cull_mode, CullMode::None);
        assert_eq!(out.rasterizer.fill_mode, FillMode::WireFrame);
        assert_eq!(out.rasterizer.depth_bias, 0.5);
        assert!(out.rasterizer.scissor_test_enable);
        assert_eq!(out.changed, ChangedStates::RASTERIZER);
    }

    #[test]
    fn test_blend_factor_and_write_mask() {
        let current = Current::new();
        let changes = render(vec![
            EffectState::int(rs::BLENDFACTOR, 0x1122_3344),
            EffectState::int(rs::COLORWRITEENABLE2, 0b0101),
        ]);
        let out = translate(&changes, current.snapshot(), &HashMap::new()).unwrap();
        assert_eq!(out.blend.blend_factor, Color::new(0x11, 0x22, 0x33, 0x44));
        assert_eq!(
            out.blend.color_write_channels2,
            ColorWriteChannels::RED | ColorWriteChannels::BLUE
        );
        assert_eq!(out.blend.color_write_channels, ColorWriteChannels::ALL);
    }

    #[test]
    fn test_alpha_blend_disable_forces_opaque() {
        let mut current = Current::new();
        current.blend = BlendState::alpha_blend();
        let changes = render(vec![EffectState::bool(rs::ALPHABLENDENABLE, false)]);
        let out = translate(&changes, current.snapshot(), &HashMap::new()).unwrap();
        assert_eq!(out.blend.color_source_blend, Blend::One);
        assert_eq!(out.blend.alpha_destination_blend, Blend::Zero);
        assert_eq!(out.changed, ChangedStates::BLEND);
    }

    #[test]
    fn test_shader_states_ignored() {
        let current = Current::new();
        let changes = render(vec![
            EffectState::int(rs::VERTEXSHADER, 0),
            EffectState::int(rs::PIXELSHADER, 1),
        ]);
        let out = translate(&changes, current.snapshot(), &HashMap::new()).unwrap();
        assert!(out.changed.is_empty());
    }

    #[test]
    fn test_unhandled_render_state() {
        let current = Current::new();
        let changes = render(vec![
            EffectState::int(rs::SRCBLEND, 5),
            EffectState::int(rs::FOGENABLE, 1),
        ]);
        assert_eq!(
            translate(&changes, current.snapshot(), &HashMap::new()).unwrap_err(),
            GraphicsError::UnhandledRenderState(rs::FOGENABLE)
        );
    }

    #[test]
    fn test_unmapped_blend_value() {
        let current = Current::new();
        let changes = render(vec![EffectState::int(rs::SRCBLEND, 12)]);
        assert!(matches!(
            translate(&changes, current.snapshot(), &HashMap::new()),
            Err(GraphicsError::UnmappedEnum { table: "blend mode", value: 12 })
        ));
    }

    #[test]
    fn test_translation_is_idempotent() {
        let current = Current::new();
        let changes = render(vec![
            EffectState::int(rs::SRCBLEND, 2),
            EffectState::int(rs::BLENDOP, 4),
            EffectState::bool(rs::ZWRITEENABLE, false),
        ]);
        let once = translate(&changes, current.snapshot(), &HashMap::new()).unwrap();
        let applied = Current {
            blend: once.blend.clone(),
            depth_stencil: once.depth_stencil.clone(),
            rasterizer: once.rasterizer.clone(),
            samplers: current.samplers.clone(),
        };
        let twice = translate(&changes, applied.snapshot(), &HashMap::new()).unwrap();
        assert_eq!(once.blend, twice.blend);
        assert_eq!(once.depth_stencil, twice.depth_stencil);
        assert_eq!(once.rasterizer, twice.rasterizer);
    }

    #[test]
    fn test_partial_filter_keeps_previous_axes() {
        let mut current = Current::new();
        current.samplers[1] = Rc::new(SamplerState::point_clamp());
        let changes = StateChanges::default().with_sampler_register(
            SamplerStateRegister::new("S", 1)
                .with_state(EffectSamplerState::int(ss::MAGFILTER, 2))
                .with_state(EffectSamplerState::int(ss::ADDRESSU, 2))
                .with_state(EffectSamplerState::float(ss::MIPMAPLODBIAS, -0.5)),
        );
        let out = translate(&changes, current.snapshot(), &HashMap::new()).unwrap();
        let update = &out.samplers[0];
        assert_eq!(update.register, 1);
        assert!(update.texture.is_none());
        let sampler = update.sampler.as_ref().unwrap();
        // Point on min and mip stays; mag becomes linear.
        assert_eq!(sampler.filter, TextureFilter::MinPointMagLinearMipPoint);
        assert_eq!(sampler.address_u, TextureAddressMode::Mirror);
        assert_eq!(sampler.address_v, TextureAddressMode::Clamp);
        assert_eq!(sampler.mip_map_level_of_detail_bias, -0.5);
    }

    #[test]
    fn test_texture_entry_binds_parameter_texture() {
        let current = Current::new();
        let mut map = HashMap::new();
        map.insert("S".to_string(), texture_parameter());
        let changes = StateChanges::default()
            .with_sampler_register(SamplerStateRegister::new("Empty", 0))
            .with_sampler_register(
                SamplerStateRegister::new("S", 3).with_state(EffectSamplerState::new(
                    ss::TEXTURE,
                    crate::effect::descriptor::EffectValue::texture("", 7, 0),
                )),
            );
        let out = translate(&changes, current.snapshot(), &map).unwrap();
        assert_eq!(out.samplers.len(), 1);
        let update = &out.samplers[0];
        assert_eq!(update.register, 3);
        assert!(update.sampler.is_none());
        assert!(matches!(update.texture, Some(None)));
    }

    #[test]
    fn test_texture_lookup_miss() {
        let current = Current::new();
        let changes = StateChanges::default().with_sampler_register(
            SamplerStateRegister::new("Unknown", 0)
                .with_state(EffectSamplerState::int(ss::TEXTURE, 0)),
        );
        assert_eq!(
            translate(&changes, current.snapshot(), &HashMap::new()).unwrap_err(),
            GraphicsError::SamplerLookupMiss("Unknown".to_string())
        );
    }

    #[test]
    fn test_sampler_errors() {
        let current = Current::new();
        let bad_register = StateChanges::default().with_sampler_register(
            SamplerStateRegister::new("S", 16).with_state(EffectSamplerState::int(ss::MAXMIPLEVEL, 1)),
        );
        assert!(matches!(
            translate(&bad_register, current.snapshot(), &HashMap::new()),
            Err(GraphicsError::MalformedEffect(_))
        ));

        let unknown = StateChanges::default().with_sampler_register(
            SamplerStateRegister::new("S", 0).with_state(EffectSamplerState::int(ss::SRGBTEXTURE, 1)),
        );
        assert_eq!(
            translate(&unknown, current.snapshot(), &HashMap::new()).unwrap_err(),
            GraphicsError::UnhandledSamplerState(ss::SRGBTEXTURE)
        );
    }
}
