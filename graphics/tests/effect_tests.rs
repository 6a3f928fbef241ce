//! Effect loading and pass application through a device.

mod common;

use std::rc::Rc;

use common::{TestContext, SPRITE_EFFECT};
use rstest::rstest;
use stamen_graphics::effect::codes::{render_state, sampler_state, symbol_type};
use stamen_graphics::effect::descriptor::{
    EffectSamplerState, EffectState, EffectValue, SamplerStateRegister, StateChanges,
};
use stamen_graphics::effect::tables;
use stamen_graphics::stamen_core::{
    Blend, BlendState, CompareFunction, DepthStencilState, RasterizerState, SamplerState,
    TextureAddressMode, TextureFilter,
};
use stamen_graphics::{
    ErrorKind, GraphicsError, GraphicsResource, NativeCall, ParameterType, PrimitiveType,
};

fn alpha_blend_changes() -> StateChanges {
    StateChanges::default()
        .with_render_state(EffectState::int(render_state::SRCBLEND, 5))
        .with_render_state(EffectState::int(render_state::DESTBLEND, 6))
        .with_render_state(EffectState::int(render_state::ZENABLE, 1))
}

fn sampler_changes() -> StateChanges {
    StateChanges::default().with_sampler_register(
        SamplerStateRegister::new("SpriteSampler", 0)
            .with_state(EffectSamplerState::new(
                sampler_state::TEXTURE,
                EffectValue::texture("", symbol_type::TEXTURE2D, 1),
            ))
            .with_state(EffectSamplerState::int(sampler_state::ADDRESSU, 3))
            .with_state(EffectSamplerState::int(sampler_state::MAGFILTER, 1)),
    )
}

#[test]
fn test_effect_graph() {
    let mut ctx = TestContext::with_sprite_effect(StateChanges::default());
    let effect = ctx.device.create_effect(SPRITE_EFFECT).unwrap();

    let names: Vec<_> = effect.parameters().iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["SpriteTexture", "Tint"]);
    assert_eq!(
        effect.parameter("SpriteTexture").unwrap().parameter_type(),
        ParameterType::Texture2D
    );
    assert!(Rc::ptr_eq(
        effect.sampler_texture("SpriteSampler").unwrap(),
        effect.parameter("SpriteTexture").unwrap()
    ));

    let tint = effect.parameter("Tint").unwrap();
    assert_eq!(
        tint.annotation("UIWidget").unwrap().get_value_string().unwrap(),
        "Color"
    );
    assert_eq!(tint.get_value_vec4().unwrap(), glam::Vec4::ONE);

    let technique = effect.current_technique();
    assert_eq!(technique.name(), "SpriteBatch");
    assert_eq!(technique.passes().len(), 1);
    assert_eq!(ctx.device.resource_count(), 1);
}

#[test]
fn test_alpha_blend_pass() {
    let mut ctx = TestContext::with_sprite_effect(alpha_blend_changes());
    ctx.device
        .set_depth_stencil_state(Rc::new(DepthStencilState::none()));
    let effect = ctx.device.create_effect(SPRITE_EFFECT).unwrap();
    let rasterizer = Rc::clone(ctx.device.rasterizer_state());
    ctx.clear_calls();

    effect.current_technique().passes()[0]
        .apply(&mut ctx.device)
        .unwrap();

    let blend = ctx.device.blend_state();
    assert_eq!(blend.color_source_blend, Blend::SourceAlpha);
    assert_eq!(blend.color_destination_blend, Blend::InverseSourceAlpha);
    assert!(ctx.device.depth_stencil_state().depth_buffer_enable);
    assert!(Rc::ptr_eq(ctx.device.rasterizer_state(), &rasterizer));

    let calls = ctx.calls();
    assert!(matches!(calls[0], NativeCall::ApplyEffect { pass: 0, .. }));
    assert!(matches!(calls[1], NativeCall::SetBlendState(_)));
    assert!(matches!(calls[2], NativeCall::SetDepthStencilState(_)));
    assert_eq!(calls.len(), 3);
}

#[test]
fn test_reapplying_pass_is_idempotent() {
    let mut ctx = TestContext::with_sprite_effect(alpha_blend_changes());
    let effect = ctx.device.create_effect(SPRITE_EFFECT).unwrap();
    let pass = &effect.current_technique().passes()[0];

    pass.apply(&mut ctx.device).unwrap();
    let blend: BlendState = (**ctx.device.blend_state()).clone();
    let depth: DepthStencilState = (**ctx.device.depth_stencil_state()).clone();
    ctx.clear_calls();

    pass.apply(&mut ctx.device).unwrap();
    assert_eq!(**ctx.device.blend_state(), blend);
    assert_eq!(**ctx.device.depth_stencil_state(), depth);
    assert_eq!(
        ctx.calls(),
        &[NativeCall::ApplyEffect {
            effect: effect.handle(),
            pass: 0
        }]
    );
}

#[test]
fn test_unknown_render_state_leaves_device_untouched() {
    let changes = StateChanges::default()
        .with_render_state(EffectState::int(render_state::SRCBLEND, 5))
        .with_render_state(EffectState::int(render_state::CULLMODE, 1))
        .with_render_state(EffectState::int(render_state::FOGENABLE, 1));
    let mut ctx = TestContext::with_sprite_effect(changes);
    let effect = ctx.device.create_effect(SPRITE_EFFECT).unwrap();
    let blend = Rc::clone(ctx.device.blend_state());
    let rasterizer = Rc::clone(ctx.device.rasterizer_state());
    ctx.clear_calls();

    let err = effect.current_technique().passes()[0]
        .apply(&mut ctx.device)
        .unwrap_err();
    assert_eq!(
        err,
        GraphicsError::UnhandledRenderState(render_state::FOGENABLE)
    );
    assert_eq!(err.kind(), ErrorKind::Compatibility);
    assert!(Rc::ptr_eq(ctx.device.blend_state(), &blend));
    assert!(Rc::ptr_eq(ctx.device.rasterizer_state(), &rasterizer));
    assert_eq!(ctx.calls().len(), 1);
}

#[test]
fn test_sampler_pass_binds_parameter_texture() {
    let mut ctx = TestContext::with_sprite_effect(sampler_changes());
    let effect = ctx.device.create_effect(SPRITE_EFFECT).unwrap();
    let texture = ctx.texture(16, 16);
    effect
        .parameter("SpriteTexture")
        .unwrap()
        .set_value_texture(Some(Rc::clone(&texture)))
        .unwrap();

    effect.current_technique().passes()[0]
        .apply(&mut ctx.device)
        .unwrap();
    assert!(Rc::ptr_eq(ctx.device.texture(0).unwrap(), &texture));
    let sampler = &ctx.device.sampler_states()[0];
    assert_eq!(sampler.address_u, TextureAddressMode::Clamp);
    assert_eq!(sampler.address_v, TextureAddressMode::Wrap);
    assert_eq!(sampler.filter, TextureFilter::MinLinearMagPointMipLinear);
    ctx.clear_calls();

    ctx.device
        .draw_primitives(PrimitiveType::TriangleList, 0, 2)
        .unwrap();
    let expected = SamplerState {
        address_u: TextureAddressMode::Clamp,
        filter: TextureFilter::MinLinearMagPointMipLinear,
        ..SamplerState::linear_wrap()
    };
    assert!(ctx.calls().contains(&NativeCall::VerifySampler {
        slot: 0,
        texture: Some(texture.handle()),
        sampler: expected,
    }));
}

#[test]
fn test_sampler_without_mapping_is_a_lookup_miss() {
    let changes = StateChanges::default().with_sampler_register(
        SamplerStateRegister::new("ShadowSampler", 1).with_state(EffectSamplerState::new(
            sampler_state::TEXTURE,
            EffectValue::texture("", symbol_type::TEXTURE2D, 0),
        )),
    );
    let mut ctx = TestContext::with_sprite_effect(changes);
    let effect = ctx.device.create_effect(SPRITE_EFFECT).unwrap();

    let err = effect.current_technique().passes()[0]
        .apply(&mut ctx.device)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LookupMiss);
    assert!(ctx.device.texture(1).is_none());
    assert_eq!(ctx.device.pending_sampler_count(), 0);
}

#[test]
fn test_translate_against_device_snapshot() {
    let ctx = TestContext::new();
    let changes = StateChanges::default()
        .with_render_state(EffectState::int(render_state::ZFUNC, 4))
        .with_render_state(EffectState::bool(render_state::ZWRITEENABLE, false));
    let out = stamen_graphics::effect::translate(
        &changes,
        ctx.device.pipeline_snapshot(),
        &Default::default(),
    )
    .unwrap();
    assert_eq!(out.depth_stencil.depth_buffer_function, CompareFunction::LessEqual);
    assert!(!out.depth_stencil.depth_buffer_write_enable);
    assert_eq!(out.rasterizer, RasterizerState::cull_counter_clockwise());
    assert!(out.samplers.is_empty());
}

#[test]
fn test_disposed_effect_rejects_passes() {
    let mut ctx = TestContext::with_sprite_effect(alpha_blend_changes());
    let effect = ctx.device.create_effect(SPRITE_EFFECT).unwrap();
    ctx.device.dispose();

    assert!(effect.is_disposed());
    assert!(matches!(
        effect.current_technique().passes()[0].apply(&mut ctx.device),
        Err(GraphicsError::Disposed(_))
    ));
}

#[test]
fn test_unknown_blob_is_rejected() {
    let mut ctx = TestContext::new();
    assert!(ctx.device.create_effect(b"not an effect").is_err());
    assert_eq!(ctx.device.resource_count(), 0);
}

#[rstest]
#[case::blend(tables::BLEND_MODE.domain().map(|(raw, v)| (raw, tables::BLEND_MODE.code_of(v))).collect())]
#[case::compare(tables::COMPARE_FUNC.domain().map(|(raw, v)| (raw, tables::COMPARE_FUNC.code_of(v))).collect())]
#[case::stencil(tables::STENCIL_OP.domain().map(|(raw, v)| (raw, tables::STENCIL_OP.code_of(v))).collect())]
#[case::address(tables::TEXTURE_ADDRESS.domain().map(|(raw, v)| (raw, tables::TEXTURE_ADDRESS.code_of(v))).collect())]
fn test_tables_round_trip(#[case] pairs: Vec<(u32, Option<u32>)>) {
    assert!(!pairs.is_empty());
    for (raw, code) in pairs {
        assert_eq!(code, Some(raw));
    }
}
