//! Common utilities for integration tests.
//!
//! Every test runs against the recording [`DummyBackend`], so assertions are
//! made on the exact sequence of native calls the device issued.

#![allow(dead_code)]

use std::rc::Rc;

use stamen_graphics::effect::codes::{sampler_state, symbol_type};
use stamen_graphics::effect::descriptor::{
    DescriptorParameter, DescriptorTechnique, EffectDescriptor, EffectSamplerState, EffectValue,
    StateChanges,
};
use stamen_graphics::{
    DepthFormat, DeviceCapabilities, DummyBackend, GraphicsDevice, NativeCall,
    PresentationParameters, RenderTargetUsage, SurfaceFormat, Texture, TextureDescriptor,
};

/// Blob registered for [`sprite_effect`].
pub const SPRITE_EFFECT: &[u8] = b"sprite-effect";

/// Install a test logger once per test binary.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Device over a fresh dummy backend with the call log cleared.
pub struct TestContext {
    pub device: GraphicsDevice<DummyBackend>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_backend(DummyBackend::new(), PresentationParameters::new(800, 600))
    }

    pub fn without_instancing() -> Self {
        let backend = DummyBackend::new().with_capabilities(DeviceCapabilities {
            supports_hardware_instancing: false,
            ..DeviceCapabilities::default()
        });
        Self::with_backend(backend, PresentationParameters::new(800, 600))
    }

    /// Device whose backend serves [`sprite_effect`] for [`SPRITE_EFFECT`],
    /// with `changes` reported for pass 0 of the first technique.
    pub fn with_sprite_effect(changes: StateChanges) -> Self {
        let mut backend = DummyBackend::new();
        backend.register_effect(SPRITE_EFFECT, sprite_effect());
        backend.set_pass_state_changes(SPRITE_EFFECT, 0, 0, changes);
        Self::with_backend(backend, PresentationParameters::new(800, 600))
    }

    pub fn with_backend(backend: DummyBackend, presentation: PresentationParameters) -> Self {
        init_logger();
        let mut device = GraphicsDevice::new(backend, presentation);
        device.context_mut().clear_calls();
        Self { device }
    }

    /// Recorded calls since the last [`clear_calls`](Self::clear_calls).
    pub fn calls(&self) -> &[NativeCall] {
        self.device.context().calls()
    }

    pub fn clear_calls(&mut self) {
        self.device.context_mut().clear_calls();
    }

    pub fn count(&self, predicate: impl Fn(&NativeCall) -> bool) -> usize {
        self.device.context().count_calls(predicate)
    }

    /// Create a 2D render target.
    pub fn render_target(
        &mut self,
        width: u32,
        height: u32,
        usage: RenderTargetUsage,
        mipmaps: bool,
    ) -> Rc<Texture> {
        let mut descriptor = TextureDescriptor::new_2d(width, height, SurfaceFormat::Color)
            .with_render_target(DepthFormat::Depth24Stencil8, usage);
        if mipmaps {
            descriptor = descriptor.with_mipmaps();
        }
        self.device.create_texture(&descriptor).unwrap()
    }

    /// Create a plain 2D texture.
    pub fn texture(&mut self, width: u32, height: u32) -> Rc<Texture> {
        self.device
            .create_texture(&TextureDescriptor::new_2d(width, height, SurfaceFormat::Color))
            .unwrap()
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.device.dispose();
    }
}

/// A sprite effect: a texture, a sampler reading it, a tint and one technique.
pub fn sprite_effect() -> EffectDescriptor {
    EffectDescriptor::new()
        .with_parameter(DescriptorParameter::new(EffectValue::texture(
            "SpriteTexture",
            symbol_type::TEXTURE2D,
            0,
        )))
        .with_parameter(DescriptorParameter::new(EffectValue::sampler(
            "SpriteSampler",
            vec![
                EffectSamplerState::int(sampler_state::MINFILTER, 1),
                EffectSamplerState::new(
                    sampler_state::TEXTURE,
                    EffectValue::texture("", symbol_type::TEXTURE2D, 1),
                ),
            ],
        )))
        .with_parameter(
            DescriptorParameter::new(EffectValue::floats("Tint", 1, 4, &[1.0, 1.0, 1.0, 1.0]))
                .with_annotation(EffectValue::string("UIWidget", "Color")),
        )
        .with_technique(DescriptorTechnique::new("SpriteBatch").with_pass("P0"))
        .with_object(symbol_type::TEXTURE2D, None)
        .with_object(symbol_type::TEXTURE2D, Some("SpriteTexture"))
}
